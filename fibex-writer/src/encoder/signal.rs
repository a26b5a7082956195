//! Signal encoder
//!
//! Produces the SIGNALS entry of a signal and its CODING, including the
//! optional LINEAR and TEXTTABLE CompuMethods.

use crate::config::DocumentOrder;
use crate::ids::{IdAllocator, IdCategory};
use crate::model::{LinearScaling, Signal, TextTable};
use crate::schema::{self, fx, ho, text_element};
use crate::types::{FibexError, Result};
use crate::xml::Element;

/// Fragments generated for one signal
#[derive(Debug, Clone, PartialEq)]
pub struct SignalFragments {
    /// Entry for the SIGNALS container
    pub signal: Element,
    /// Entry for the CODINGS container
    pub coding: Element,
    /// Id of the coding referenced by the signal
    pub coding_id: String,
}

/// Encode a signal whose id has already been allocated by its frame
pub fn encode_signal(
    signal: &Signal,
    signal_id: &str,
    ids: &mut IdAllocator,
    order: DocumentOrder,
) -> Result<SignalFragments> {
    if let Some(table) = &signal.text_table {
        table
            .check_unique()
            .map_err(|value| FibexError::text_table(&signal.name, format!("duplicate value {}", value)))?;
    }

    let coding_id = ids.allocate(IdCategory::Coding);
    log::trace!("Encoding signal {} as {} / {}", signal.name, signal_id, coding_id);

    let signal_node = Element::new(fx::SIGNAL)
        .with_attr(schema::ID, signal_id)
        .with_child(text_element(ho::SHORT_NAME, &signal.name))
        .with_child(text_element(ho::DESC, &signal.description))
        .with_child(schema::ref_element(fx::CODING_REF, &coding_id));

    let mut compu_methods = Element::new(ho::COMPU_METHODS);
    if let Some(scaling) = signal.scaling.filter(|s| !s.is_identity()) {
        compu_methods.place(linear_compu_method(&scaling, ids), order);
    }
    if let Some(table) = signal.text_table.as_ref().filter(|t| !t.is_empty()) {
        compu_methods.place(text_table_compu_method(table, ids, order), order);
    }

    let coding = Element::new(fx::CODING)
        .with_attr(schema::ID, &coding_id)
        .with_child(text_element(ho::SHORT_NAME, &coding_id))
        .with_child(
            Element::new(ho::CODED_TYPE)
                .with_attr(schema::CATEGORY, schema::CODED_TYPE_CATEGORY)
                .with_attr(ho::BASE_DATA_TYPE, base_data_type(&signal.data_type))
                .with_child(text_element(ho::BIT_LENGTH, signal.bit_length.to_string())),
        )
        .with_child(compu_methods);

    Ok(SignalFragments {
        signal: signal_node,
        coding,
        coding_id,
    })
}

/// `uint8` -> `A_UINT8`
pub fn base_data_type(data_type: &str) -> String {
    format!("{}{}", schema::BASE_DATA_TYPE_PREFIX, data_type.trim().to_uppercase())
}

/// Linear conversion as rational coefficients `[offset, factor]`
fn linear_compu_method(scaling: &LinearScaling, ids: &mut IdAllocator) -> Element {
    let numerator = Element::new(ho::COMPU_NUMERATOR)
        .with_child(text_element(ho::V, scaling.offset.to_string()))
        .with_child(text_element(ho::V, scaling.factor.to_string()));

    compu_method(ids, schema::COMPU_CATEGORY_LINEAR).with_child(
        Element::new(ho::COMPU_INTERNAL_TO_PHYS).with_child(
            Element::new(ho::COMPU_SCALES).with_child(
                Element::new(ho::COMPU_SCALE)
                    .with_child(Element::new(ho::COMPU_RATIONAL_COEFFS).with_child(numerator)),
            ),
        ),
    )
}

/// One scale per entry, lower and upper limit both equal to the value
fn text_table_compu_method(table: &TextTable, ids: &mut IdAllocator, order: DocumentOrder) -> Element {
    let mut scales = Element::new(ho::COMPU_SCALES);
    for entry in table.entries() {
        let scale = Element::new(ho::COMPU_SCALE)
            .with_child(text_element(ho::LOWER_LIMIT, entry.value.to_string()))
            .with_child(text_element(ho::UPPER_LIMIT, entry.value.to_string()))
            .with_child(Element::new(ho::COMPU_CONST).with_child(text_element(ho::VT, &entry.label)));
        scales.place(scale, order);
    }

    compu_method(ids, schema::COMPU_CATEGORY_TEXTTABLE)
        .with_child(Element::new(ho::COMPU_INTERNAL_TO_PHYS).with_child(scales))
}

fn compu_method(ids: &mut IdAllocator, category: &str) -> Element {
    Element::new(ho::COMPU_METHOD)
        .with_child(text_element(ho::SHORT_NAME, ids.allocate(IdCategory::CompuMethod)))
        .with_child(text_element(ho::CATEGORY, category))
}
