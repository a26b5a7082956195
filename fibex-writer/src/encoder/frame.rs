//! Frame encoder
//!
//! Produces the FRAMES entry of a frame with one SIGNAL-INSTANCE per signal,
//! and the FRAME-TRIGGERING that schedules it on a channel.

use crate::config::DocumentOrder;
use crate::encoder::signal::{encode_signal, SignalFragments};
use crate::ids::{IdAllocator, IdCategory};
use crate::model::Frame;
use crate::schema::{self, flexray, fx, ho, text_element};
use crate::types::Result;
use crate::xml::Element;

/// Ids of a frame, allocated once before any of its fragments is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameIds {
    pub frame: String,
    pub triggering: String,
}

impl FrameIds {
    pub fn allocate(ids: &mut IdAllocator) -> Self {
        Self {
            frame: ids.allocate(IdCategory::Frame),
            triggering: ids.allocate(IdCategory::FrameTriggering),
        }
    }
}

/// Fragments generated for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameFragments {
    /// Entry for the FRAMES container
    pub frame: Element,
    /// Signal and coding entries, in signal order
    pub signals: Vec<SignalFragments>,
}

/// Build the FRAME-TRIGGERING of a frame
///
/// The same fragment is placed into every channel the frame is a member of.
pub fn encode_triggering(frame: &Frame, frame_ids: &FrameIds) -> Element {
    let typed = |name: &str, value: String, xsi_type: &str| {
        Element::new(name).with_attr(schema::XSI_TYPE, xsi_type).with_text(value)
    };

    Element::new(fx::FRAME_TRIGGERING)
        .with_attr(schema::ID, &frame_ids.triggering)
        .with_child(
            Element::new(fx::TIMINGS).with_child(
                Element::new(fx::ABSOLUTELY_SCHEDULED_TIMING)
                    .with_child(typed(fx::SLOT_ID, frame.slot.to_string(), flexray::SLOT_ID_TYPE))
                    .with_child(typed(fx::BASE_CYCLE, frame.base_cycle.to_string(), flexray::BASE_CYCLE_TYPE))
                    .with_child(typed(
                        fx::CYCLE_REPETITION,
                        frame.cycle_repetition.to_string(),
                        flexray::CYCLE_REPETITION_TYPE,
                    )),
            ),
        )
        .with_child(schema::ref_element(fx::FRAME_REF, &frame_ids.frame))
}

/// Build the FRAMES entry and encode every signal of the frame
pub fn encode_frame(
    frame: &Frame,
    frame_ids: &FrameIds,
    ids: &mut IdAllocator,
    order: DocumentOrder,
) -> Result<FrameFragments> {
    log::debug!(
        "Encoding frame {} ({} signals) as {}",
        frame.name,
        frame.signals.len(),
        frame_ids.frame
    );

    let mut instances = Element::new(fx::SIGNAL_INSTANCES);
    let mut signals = Vec::with_capacity(frame.signals.len());

    for signal in &frame.signals {
        let signal_id = ids.allocate(IdCategory::Signal);
        let instance = Element::new(fx::SIGNAL_INSTANCE)
            .with_attr(schema::ID, ids.allocate(IdCategory::SignalInstance))
            .with_child(text_element(fx::BIT_POSITION, signal.start_bit.to_string()))
            .with_child(text_element(fx::IS_HIGH_LOW_BYTE_ORDER, "true"))
            .with_child(schema::ref_element(fx::SIGNAL_REF, &signal_id));
        instances.place(instance, order);

        let encoded = encode_signal(signal, &signal_id, ids, order).map_err(|e| e.in_frame(&frame.name))?;
        signals.push(encoded);
    }

    let frame_node = Element::new(fx::FRAME)
        .with_attr(schema::ID, &frame_ids.frame)
        .with_child(text_element(ho::SHORT_NAME, &frame.name))
        .with_child(text_element(ho::DESC, &frame.description))
        .with_child(text_element(fx::BYTE_LENGTH, frame.byte_length.to_string()))
        .with_child(text_element(fx::FRAME_TYPE, schema::FRAME_TYPE_APPLICATION))
        .with_child(instances);

    Ok(FrameFragments {
        frame: frame_node,
        signals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Signal, TextTable};
    use crate::types::FibexError;

    fn sample_frame() -> Frame {
        Frame::new("BCM_Status", 12)
            .with_description("body status")
            .with_byte_length(16)
            .with_timing(1, 4)
            .with_signal(Signal::new("Door", "uint8", 21, 4))
            .with_signal(Signal::new("Speed", "uint16", 24, 16))
    }

    #[test]
    fn test_frame_ids_allocated_together() {
        let mut ids = IdAllocator::new();
        let first = FrameIds::allocate(&mut ids);
        let second = FrameIds::allocate(&mut ids);
        assert_eq!(first.frame, "Frame_1");
        assert_eq!(first.triggering, "FrameTriggering_1");
        assert_eq!(second.frame, "Frame_2");
        assert_eq!(second.triggering, "FrameTriggering_2");
    }

    #[test]
    fn test_triggering_timing() {
        let mut ids = IdAllocator::new();
        let frame_ids = FrameIds::allocate(&mut ids);
        let ft = encode_triggering(&sample_frame(), &frame_ids);

        assert_eq!(ft.attr("ID"), Some("FrameTriggering_1"));
        let slot = ft.find(fx::SLOT_ID).unwrap();
        assert_eq!(slot.text(), "12");
        assert_eq!(slot.attr("xsi:type"), Some("flexray:SLOT-ID-TYPE"));
        let base = ft.find(fx::BASE_CYCLE).unwrap();
        assert_eq!(base.text(), "1");
        assert_eq!(base.attr("xsi:type"), Some("flexray:BASE-CYCLE-TYPE"));
        let rep = ft.find(fx::CYCLE_REPETITION).unwrap();
        assert_eq!(rep.text(), "4");
        assert_eq!(rep.attr("xsi:type"), Some("flexray:CYCLE-REPETITION-TYPE"));
        assert_eq!(ft.find(fx::FRAME_REF).unwrap().attr("ID-REF"), Some("Frame_1"));
    }

    #[test]
    fn test_frame_fragment() {
        let mut ids = IdAllocator::new();
        let frame_ids = FrameIds::allocate(&mut ids);
        let fragments = encode_frame(&sample_frame(), &frame_ids, &mut ids, DocumentOrder::Append).unwrap();

        let frame = &fragments.frame;
        assert_eq!(frame.attr("ID"), Some("Frame_1"));
        assert_eq!(frame.find(ho::SHORT_NAME).unwrap().text(), "BCM_Status");
        assert_eq!(frame.find(fx::BYTE_LENGTH).unwrap().text(), "16");
        assert_eq!(frame.find(fx::FRAME_TYPE).unwrap().text(), "APPLICATION");

        let instances = frame.find_all(fx::SIGNAL_INSTANCE);
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].attr("ID"), Some("SignalInstance_1"));
        assert_eq!(instances[0].find(fx::BIT_POSITION).unwrap().text(), "21");
        assert_eq!(instances[0].find(fx::IS_HIGH_LOW_BYTE_ORDER).unwrap().text(), "true");
        assert_eq!(instances[0].find(fx::SIGNAL_REF).unwrap().attr("ID-REF"), Some("Signal_1"));
        assert_eq!(instances[1].find(fx::SIGNAL_REF).unwrap().attr("ID-REF"), Some("Signal_2"));

        assert_eq!(fragments.signals.len(), 2);
        assert_eq!(fragments.signals[1].signal.attr("ID"), Some("Signal_2"));
        assert_eq!(fragments.signals[1].coding_id, "Coding_2");
    }

    #[test]
    fn test_prepend_reverses_instances() {
        let mut ids = IdAllocator::new();
        let frame_ids = FrameIds::allocate(&mut ids);
        let fragments = encode_frame(&sample_frame(), &frame_ids, &mut ids, DocumentOrder::Prepend).unwrap();

        let refs: Vec<_> = fragments
            .frame
            .find_all(fx::SIGNAL_REF)
            .iter()
            .filter_map(|r| r.attr("ID-REF"))
            .collect();
        assert_eq!(refs, vec!["Signal_2", "Signal_1"]);
    }

    #[test]
    fn test_text_table_error_names_the_frame() {
        let frame = Frame::new("BCM_Lamp", 4).with_signal(
            Signal::new("Status", "uint8", 0, 2)
                .with_text_table(TextTable::new().with_entry(0, "OFF").with_entry(0, "DIM")),
        );
        let mut ids = IdAllocator::new();
        let frame_ids = FrameIds::allocate(&mut ids);

        match encode_frame(&frame, &frame_ids, &mut ids, DocumentOrder::Append).unwrap_err() {
            FibexError::MalformedTextTable { frame, signal, ecu, .. } => {
                assert_eq!(frame.as_deref(), Some("BCM_Lamp"));
                assert_eq!(signal, "Status");
                assert!(ecu.is_none());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
