//! Identifier allocation
//!
//! Every generated FIBEX element carries an `ID` of the form
//! `{Category}_{n}`, numbered per category from 1. One allocator is created
//! per serialization run, so two runs over the same network produce the same
//! id sequence.

use std::fmt;

/// Closed set of entity categories that receive generated ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdCategory {
    Ecu,
    Frame,
    Signal,
    FrameTriggering,
    Controller,
    Connector,
    OutputPort,
    SignalInstance,
    Coding,
    CompuMethod,
}

impl IdCategory {
    /// All categories, in counter-slot order
    pub const ALL: [IdCategory; 10] = [
        IdCategory::Ecu,
        IdCategory::Frame,
        IdCategory::Signal,
        IdCategory::FrameTriggering,
        IdCategory::Controller,
        IdCategory::Connector,
        IdCategory::OutputPort,
        IdCategory::SignalInstance,
        IdCategory::Coding,
        IdCategory::CompuMethod,
    ];

    /// Prefix used in the generated id
    pub fn as_str(&self) -> &'static str {
        match self {
            IdCategory::Ecu => "ECU",
            IdCategory::Frame => "Frame",
            IdCategory::Signal => "Signal",
            IdCategory::FrameTriggering => "FrameTriggering",
            IdCategory::Controller => "Controller",
            IdCategory::Connector => "Connector",
            IdCategory::OutputPort => "OutputPort",
            IdCategory::SignalInstance => "SignalInstance",
            IdCategory::Coding => "Coding",
            IdCategory::CompuMethod => "CompuMethod",
        }
    }

    /// Recover the category from a generated id (`"Coding_3"` -> `Coding`)
    pub fn of_id(id: &str) -> Option<IdCategory> {
        let (prefix, counter) = id.rsplit_once('_')?;
        if counter.is_empty() || !counter.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Self::ALL.into_iter().find(|c| c.as_str() == prefix)
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for IdCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-run id allocator
///
/// Counters start at zero on construction; there is no way to reset an
/// allocator in place, a new run takes a new allocator.
#[derive(Debug, Default)]
pub struct IdAllocator {
    counters: [u32; IdCategory::ALL.len()],
}

impl IdAllocator {
    /// Create an allocator with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next id of `category`
    pub fn allocate(&mut self, category: IdCategory) -> String {
        let counter = &mut self.counters[category.slot()];
        *counter += 1;
        let id = format!("{}_{}", category, counter);
        log::trace!("Allocated id {}", id);
        id
    }

    /// Number of ids issued so far for `category`
    pub fn issued(&self, category: IdCategory) -> u32 {
        self.counters[category.slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_numbered_per_category() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(IdCategory::Frame), "Frame_1");
        assert_eq!(ids.allocate(IdCategory::FrameTriggering), "FrameTriggering_1");
        assert_eq!(ids.allocate(IdCategory::Frame), "Frame_2");
        assert_eq!(ids.allocate(IdCategory::Ecu), "ECU_1");
        assert_eq!(ids.issued(IdCategory::Frame), 2);
        assert_eq!(ids.issued(IdCategory::Coding), 0);
    }

    #[test]
    fn test_ids_are_unique_across_categories() {
        let mut ids = IdAllocator::new();
        let mut seen = HashSet::new();
        for _ in 0..5 {
            for category in IdCategory::ALL {
                assert!(seen.insert(ids.allocate(category)));
            }
        }
        assert_eq!(seen.len(), 50);
    }

    #[test]
    fn test_fresh_allocator_repeats_sequence() {
        let run = || {
            let mut ids = IdAllocator::new();
            vec![
                ids.allocate(IdCategory::Signal),
                ids.allocate(IdCategory::Coding),
                ids.allocate(IdCategory::Signal),
            ]
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_category_of_id() {
        assert_eq!(IdCategory::of_id("FrameTriggering_12"), Some(IdCategory::FrameTriggering));
        assert_eq!(IdCategory::of_id("ECU_1"), Some(IdCategory::Ecu));
        assert_eq!(IdCategory::of_id("Channel_1"), None);
        assert_eq!(IdCategory::of_id("Frame_"), None);
        assert_eq!(IdCategory::of_id("Frame"), None);
    }
}
