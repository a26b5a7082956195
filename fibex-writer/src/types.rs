//! Core types for the FIBEX writer library
//!
//! This module defines the error taxonomy shared by every encoder and the
//! statistics reported after a serialization run.

use crate::ids::IdCategory;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for writer operations
pub type Result<T> = std::result::Result<T, FibexError>;

/// Errors that can occur while producing a FIBEX document
///
/// Every variant is fatal for the current run: no partial document is emitted.
#[derive(Debug, thiserror::Error)]
pub enum FibexError {
    #[error("Malformed template: {0}")]
    MalformedTemplate(String),

    #[error("Malformed text table on signal '{signal}'{}: {reason}", location(.ecu, .frame))]
    MalformedTextTable {
        ecu: Option<String>,
        frame: Option<String>,
        signal: String,
        reason: String,
    },

    #[error("Unresolved reference: {category} id '{id}' was never emitted")]
    UnresolvedReference { category: String, id: String },

    #[error("Invalid network description: {0}")]
    InvalidNetwork(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FibexError {
    pub(crate) fn text_table(signal: &str, reason: impl Into<String>) -> Self {
        FibexError::MalformedTextTable {
            ecu: None,
            frame: None,
            signal: signal.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach the frame a text-table error was found in
    pub(crate) fn in_frame(mut self, name: &str) -> Self {
        if let FibexError::MalformedTextTable { frame, .. } = &mut self {
            frame.get_or_insert_with(|| name.to_string());
        }
        self
    }

    /// Attach the ECU a text-table error was found in
    pub(crate) fn in_ecu(mut self, name: &str) -> Self {
        if let FibexError::MalformedTextTable { ecu, .. } = &mut self {
            ecu.get_or_insert_with(|| name.to_string());
        }
        self
    }

    pub(crate) fn unresolved(category: impl fmt::Display, id: &str) -> Self {
        FibexError::UnresolvedReference {
            category: category.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<quick_xml::Error> for FibexError {
    fn from(e: quick_xml::Error) -> Self {
        FibexError::Xml(e.to_string())
    }
}

fn location(ecu: &Option<String>, frame: &Option<String>) -> String {
    match (ecu, frame) {
        (Some(ecu), Some(frame)) => format!(" in frame '{}' of ECU '{}'", frame, ecu),
        (None, Some(frame)) => format!(" in frame '{}'", frame),
        (Some(ecu), None) => format!(" of ECU '{}'", ecu),
        (None, None) => String::new(),
    }
}

/// Statistics about one serialization run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteStats {
    /// Number of ECU entries written
    pub num_ecus: usize,
    /// Number of FRAMES entries written
    pub num_frames: usize,
    /// Number of SIGNALS entries written
    pub num_signals: usize,
    /// Number of FRAME-TRIGGERING fragments placed across both channels
    pub num_triggerings: usize,
    /// Number of CompuMethods attached to codings
    pub num_compu_methods: usize,
}

impl WriteStats {
    /// Build stats from the per-category counts issued by an allocator
    pub(crate) fn from_issued(issued: impl Fn(IdCategory) -> u32, num_triggerings: usize) -> Self {
        Self {
            num_ecus: issued(IdCategory::Ecu) as usize,
            num_frames: issued(IdCategory::Frame) as usize,
            num_signals: issued(IdCategory::Signal) as usize,
            num_triggerings,
            num_compu_methods: issued(IdCategory::CompuMethod) as usize,
        }
    }
}

impl fmt::Display for WriteStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ECUs, {} frames, {} signals, {} frame triggerings, {} compu methods",
            self.num_ecus, self.num_frames, self.num_signals, self.num_triggerings, self.num_compu_methods
        )
    }
}
