//! ECU encoder
//!
//! Produces the ECUS entry of an ECU: its controller (seeded with the template
//! defaults and the startup-slot declaration) and one connector per channel
//! the ECU is attached to.

use crate::config::DocumentOrder;
use crate::encoder::frame::FrameIds;
use crate::ids::{IdAllocator, IdCategory};
use crate::model::{Channel, ChannelSet, Ecu};
use crate::schema::{self, flexray, fx, ho, text_element};
use crate::template::{ChannelIds, ControllerDefaults};
use crate::types::{FibexError, Result};
use crate::xml::Element;

/// Channel the ECU uses to wake the cluster
///
/// With both channels attached, B is the wake-up channel.
pub fn wakeup_channel(channels: ChannelSet) -> Option<Channel> {
    if channels.b {
        Some(Channel::B)
    } else if channels.a {
        Some(Channel::A)
    } else {
        None
    }
}

/// `KEY-SLOT-USAGE` listing the ECU's startup slots in frame order
pub fn key_slot_usage(ecu: &Ecu) -> Element {
    let slots = ecu.startup_slots();
    let mut usage = Element::new(flexray::KEY_SLOT_USAGE);
    if slots.is_empty() {
        usage.push(Element::new(flexray::NONE));
    }
    for slot in slots {
        usage.push(text_element(flexray::STARTUP_SYNC, slot.to_string()));
    }
    usage
}

/// Build the ECUS entry of an ECU
///
/// `frame_ids` holds the ids of `ecu.frames`, index for index; output ports
/// reference the frame triggerings through it.
pub fn encode_ecu(
    ecu: &Ecu,
    frame_ids: &[FrameIds],
    defaults: &ControllerDefaults,
    channel_ids: &ChannelIds,
    ids: &mut IdAllocator,
    order: DocumentOrder,
) -> Result<Element> {
    if frame_ids.len() != ecu.frames.len() {
        let missing = ecu.frames.get(frame_ids.len()).map_or("?", |f| f.name.as_str());
        return Err(FibexError::unresolved(
            IdCategory::FrameTriggering,
            &format!("{}/{}", ecu.name, missing),
        ));
    }

    let ecu_id = ids.allocate(IdCategory::Ecu);
    let controller_id = ids.allocate(IdCategory::Controller);
    log::debug!(
        "Encoding ECU {} as {} on channels {}",
        ecu.name,
        ecu_id,
        String::from(ecu.channels)
    );

    let mut controller = Element::new(fx::CONTROLLER)
        .with_attr(schema::ID, &controller_id)
        .with_child(text_element(ho::SHORT_NAME, &ecu.name));
    for param in defaults.params() {
        controller.push(param.clone());
    }
    controller.push(key_slot_usage(ecu));

    let wakeup = wakeup_channel(ecu.channels);
    let mut connectors = Element::new(fx::CONNECTORS);
    for channel in ecu.channels.channels() {
        let connector_id = ids.allocate(IdCategory::Connector);

        let mut outputs = Element::new(fx::OUTPUTS);
        for (frame, frame_ids) in ecu.frames.iter().zip(frame_ids) {
            if !frame.channels.contains(channel) {
                continue;
            }
            let port = Element::new(fx::OUTPUT_PORT)
                .with_attr(schema::ID, ids.allocate(IdCategory::OutputPort))
                .with_child(schema::ref_element(fx::FRAME_TRIGGERING_REF, &frame_ids.triggering));
            outputs.place(port, order);
        }

        let connector = Element::new(fx::CONNECTOR)
            .with_attr(schema::ID, connector_id)
            .with_child(schema::ref_element(fx::CHANNEL_REF, channel_ids.get(channel)))
            .with_child(schema::ref_element(fx::CONTROLLER_REF, &controller_id))
            .with_child(outputs)
            .with_child(text_element(
                flexray::WAKE_UP_CHANNEL,
                (wakeup == Some(channel)).to_string(),
            ));
        connectors.place(connector, order);
    }

    Ok(Element::new(fx::ECU)
        .with_attr(schema::ID, ecu_id)
        .with_child(text_element(ho::SHORT_NAME, &ecu.name))
        .with_child(text_element(ho::DESC, &ecu.description))
        .with_child(Element::new(fx::CONTROLLERS).with_child(controller))
        .with_child(connectors))
}
