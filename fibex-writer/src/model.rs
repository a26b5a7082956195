//! FlexRay network model
//!
//! ECUs own frames, frames own signals. The model is consumed read-only by the
//! encoders; generated ids are returned by the encoders instead of being
//! written back onto these types.
//!
//! All types deserialize with serde using the same defaults the spreadsheet
//! layout implies, so a network can be described in JSON or TOML.

use crate::types::{FibexError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One of the two FlexRay channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    A,
    B,
}

impl Channel {
    /// Both channels, A first
    pub const BOTH: [Channel; 2] = [Channel::A, Channel::B];

    /// Position of the channel in the template (A = 0, B = 1)
    pub fn index(self) -> usize {
        match self {
            Channel::A => 0,
            Channel::B => 1,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::A => write!(f, "A"),
            Channel::B => write!(f, "B"),
        }
    }
}

/// Channel membership of an ECU or frame
///
/// Deserializes from the spreadsheet notation: any string containing `A`
/// and/or `B` (e.g. `"A"`, `"B"`, `"A/B"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ChannelSet {
    pub a: bool,
    pub b: bool,
}

impl ChannelSet {
    pub const NONE: ChannelSet = ChannelSet { a: false, b: false };
    pub const A: ChannelSet = ChannelSet { a: true, b: false };
    pub const B: ChannelSet = ChannelSet { a: false, b: true };
    pub const AB: ChannelSet = ChannelSet { a: true, b: true };

    /// Parse spreadsheet notation
    pub fn parse(s: &str) -> Self {
        Self {
            a: s.contains('A'),
            b: s.contains('B'),
        }
    }

    pub fn contains(&self, channel: Channel) -> bool {
        match channel {
            Channel::A => self.a,
            Channel::B => self.b,
        }
    }

    /// Member channels, A first
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::BOTH.into_iter().filter(move |ch| self.contains(*ch))
    }

    pub fn len(&self) -> usize {
        self.a as usize + self.b as usize
    }

    pub fn is_empty(&self) -> bool {
        !self.a && !self.b
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        ChannelSet::AB
    }
}

impl From<String> for ChannelSet {
    fn from(s: String) -> Self {
        ChannelSet::parse(&s)
    }
}

impl From<ChannelSet> for String {
    fn from(set: ChannelSet) -> Self {
        set.channels().map(|ch| ch.to_string()).collect::<Vec<_>>().join("/")
    }
}

/// Frame segment type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameType {
    #[default]
    Static,
    Dynamic,
}

/// The whole FlexRay network, in spreadsheet order
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Network {
    #[serde(default)]
    pub ecus: Vec<Ecu>,
}

impl Network {
    pub fn new(ecus: Vec<Ecu>) -> Self {
        Self { ecus }
    }

    pub fn find_ecu(&self, name: &str) -> Option<&Ecu> {
        self.ecus.iter().find(|ecu| ecu.name == name)
    }
}

/// A network node
#[derive(Debug, Clone, Deserialize)]
pub struct Ecu {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channels: ChannelSet,
    #[serde(default)]
    pub frames: Vec<Frame>,
}

impl Ecu {
    pub fn new(name: impl Into<String>, channels: ChannelSet) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            channels,
            frames: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frames.push(frame);
        self
    }

    /// Slots of the startup frames, in frame order
    pub fn startup_slots(&self) -> Vec<u16> {
        self.frames
            .iter()
            .filter(|frame| frame.is_startup)
            .map(|frame| frame.slot)
            .collect()
    }
}

fn default_byte_length() -> u16 {
    32
}

fn default_slot() -> u16 {
    1
}

fn default_cycle_repetition() -> u8 {
    1
}

/// A FlexRay frame owned by one ECU
#[derive(Debug, Clone, Deserialize)]
pub struct Frame {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_byte_length")]
    pub byte_length: u16,
    #[serde(default)]
    pub frame_type: FrameType,
    #[serde(default = "default_slot")]
    pub slot: u16,
    #[serde(default)]
    pub base_cycle: u8,
    #[serde(default = "default_cycle_repetition")]
    pub cycle_repetition: u8,
    #[serde(default)]
    pub is_startup: bool,
    #[serde(default)]
    pub channels: ChannelSet,
    #[serde(default)]
    pub signals: Vec<Signal>,
}

impl Frame {
    pub fn new(name: impl Into<String>, slot: u16) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            byte_length: default_byte_length(),
            frame_type: FrameType::Static,
            slot,
            base_cycle: 0,
            cycle_repetition: default_cycle_repetition(),
            is_startup: false,
            channels: ChannelSet::AB,
            signals: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_byte_length(mut self, byte_length: u16) -> Self {
        self.byte_length = byte_length;
        self
    }

    pub fn with_timing(mut self, base_cycle: u8, cycle_repetition: u8) -> Self {
        self.base_cycle = base_cycle;
        self.cycle_repetition = cycle_repetition;
        self
    }

    pub fn with_channels(mut self, channels: ChannelSet) -> Self {
        self.channels = channels;
        self
    }

    pub fn startup(mut self, is_startup: bool) -> Self {
        self.is_startup = is_startup;
        self
    }

    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signals.push(signal);
        self
    }
}

/// Linear scaling: physical = internal * factor + offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScaling {
    pub factor: f64,
    pub offset: f64,
}

impl LinearScaling {
    pub fn new(factor: f64, offset: f64) -> Self {
        Self { factor, offset }
    }

    /// Build from the two optional spreadsheet cells
    ///
    /// A missing factor defaults to 1 and a missing offset to 0, as long as
    /// at least one of them is present.
    pub fn from_parts(factor: Option<f64>, offset: Option<f64>) -> Option<Self> {
        if factor.is_none() && offset.is_none() {
            return None;
        }
        Some(Self {
            factor: factor.unwrap_or(1.0),
            offset: offset.unwrap_or(0.0),
        })
    }

    pub fn is_identity(&self) -> bool {
        self.factor == 1.0 && self.offset == 0.0
    }
}

/// One value-to-label entry of a text table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextTableEntry {
    pub value: i64,
    pub label: String,
}

/// Discrete value-to-label mapping, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextTable {
    entries: Vec<TextTableEntry>,
}

impl TextTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; uniqueness is checked by [`TextTable::check_unique`]
    pub fn push(&mut self, value: i64, label: impl Into<String>) {
        self.entries.push(TextTableEntry {
            value,
            label: label.into(),
        });
    }

    pub fn with_entry(mut self, value: i64, label: impl Into<String>) -> Self {
        self.push(value, label);
        self
    }

    /// Parse spreadsheet cell text: one `value:label` pair per line
    ///
    /// Both the ASCII colon and the full-width colon separate value from
    /// label. Values use integer literal prefix rules (`0x`, `0o`, `0b`,
    /// decimal, optional sign). Blank lines are skipped.
    pub fn parse(signal: &str, text: &str) -> Result<Self> {
        let mut table = TextTable::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (value, label) = line
                .split_once(|c: char| c == ':' || c == '：')
                .ok_or_else(|| FibexError::text_table(signal, format!("missing separator in '{}'", line)))?;
            let value = parse_int_literal(value.trim())
                .ok_or_else(|| FibexError::text_table(signal, format!("invalid value '{}'", value.trim())))?;
            table.push(value, label.trim());
        }
        Ok(table)
    }

    pub fn entries(&self) -> &[TextTableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first value that appears more than once
    pub fn check_unique(&self) -> std::result::Result<(), i64> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.value) {
                return Err(entry.value);
            }
        }
        Ok(())
    }
}

/// Parse an integer literal with base prefix (`0x1F`, `-0o17`, `0b101`, `42`)
pub fn parse_int_literal(s: &str) -> Option<i64> {
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };

    let lower = body.to_ascii_lowercase();
    let (radix, digits) = if let Some(d) = lower.strip_prefix("0x") {
        (16, d)
    } else if let Some(d) = lower.strip_prefix("0o") {
        (8, d)
    } else if let Some(d) = lower.strip_prefix("0b") {
        (2, d)
    } else {
        // leading zeros are ambiguous without a prefix
        if lower.len() > 1 && lower.starts_with('0') && lower.bytes().any(|b| b != b'0' && b != b'_') {
            return None;
        }
        (10, lower.as_str())
    };

    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    let magnitude = i128::from_str_radix(&digits, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

/// Resolve a spreadsheet `byte.bit` position into an absolute bit position
///
/// Signals wider than one byte are always byte aligned: their position is
/// rounded up to the next multiple of 8.
pub fn resolve_bit_position(position: f64, bit_length: u16) -> Option<u16> {
    if !position.is_finite() || position < 0.0 {
        return None;
    }
    let byte = position.trunc();
    let bit = ((position - byte) * 10.0).round();
    let mut start_bit = byte * 8.0 + bit;
    if bit_length > 8 {
        start_bit = (start_bit / 8.0).ceil() * 8.0;
    }
    if start_bit > u16::MAX as f64 {
        return None;
    }
    Some(start_bit as u16)
}

/// A signal mapped into one frame
#[derive(Debug, Clone)]
pub struct Signal {
    pub name: String,
    pub description: String,
    /// Data type tag, e.g. `uint8`; uppercased into the coding base type
    pub data_type: String,
    pub start_bit: u16,
    pub bit_length: u16,
    pub scaling: Option<LinearScaling>,
    pub text_table: Option<TextTable>,
}

impl Signal {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, start_bit: u16, bit_length: u16) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            data_type: data_type.into(),
            start_bit,
            bit_length,
            scaling: None,
            text_table: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_scaling(mut self, factor: f64, offset: f64) -> Self {
        self.scaling = Some(LinearScaling::new(factor, offset));
        self
    }

    pub fn with_text_table(mut self, table: TextTable) -> Self {
        self.text_table = Some(table);
        self
    }

    /// Trailing `_`-separated token of the name (`Door_COUNT` -> `COUNT`)
    pub fn name_suffix(&self) -> &str {
        self.name.rsplit('_').next().unwrap_or(&self.name)
    }
}

/// Text table as written in a network description file
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TextTableRecord {
    Text(String),
    Entries(Vec<TextTableEntry>),
}

/// Signal as written in a network description file
#[derive(Debug, Clone, Deserialize)]
struct SignalRecord {
    name: String,
    #[serde(default)]
    description: String,
    data_type: String,
    start_bit: Option<u16>,
    /// Spreadsheet `byte.bit` position, used when `start_bit` is absent
    position: Option<f64>,
    bit_length: u16,
    factor: Option<f64>,
    offset: Option<f64>,
    text_table: Option<TextTableRecord>,
}

impl TryFrom<SignalRecord> for Signal {
    type Error = FibexError;

    fn try_from(record: SignalRecord) -> Result<Self> {
        let start_bit = match (record.start_bit, record.position) {
            (Some(start_bit), _) => start_bit,
            (None, Some(position)) => resolve_bit_position(position, record.bit_length).ok_or_else(|| {
                FibexError::InvalidNetwork(format!("signal '{}' has invalid position {}", record.name, position))
            })?,
            (None, None) => {
                return Err(FibexError::InvalidNetwork(format!(
                    "signal '{}' needs either start_bit or position",
                    record.name
                )))
            }
        };

        let text_table = match record.text_table {
            Some(TextTableRecord::Text(text)) => Some(TextTable::parse(&record.name, &text)?),
            Some(TextTableRecord::Entries(entries)) => Some(TextTable { entries }),
            None => None,
        }
        .filter(|table| !table.is_empty());

        Ok(Signal {
            scaling: LinearScaling::from_parts(record.factor, record.offset),
            name: record.name,
            description: record.description,
            data_type: record.data_type,
            start_bit,
            bit_length: record.bit_length,
            text_table,
        })
    }
}

impl<'de> Deserialize<'de> for Signal {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let record = SignalRecord::deserialize(deserializer)?;
        Signal::try_from(record).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_position_within_byte() {
        assert_eq!(resolve_bit_position(2.5, 4), Some(21));
        assert_eq!(resolve_bit_position(0.0, 1), Some(0));
        assert_eq!(resolve_bit_position(3.7, 8), Some(31));
        assert_eq!(resolve_bit_position(1.3, 2), Some(11));
    }

    #[test]
    fn test_bit_position_multi_byte_is_byte_aligned() {
        assert_eq!(resolve_bit_position(2.5, 16), Some(24));
        assert_eq!(resolve_bit_position(2.0, 16), Some(16));
        assert_eq!(resolve_bit_position(4.1, 12), Some(40));
    }

    #[test]
    fn test_bit_position_rejects_garbage() {
        assert_eq!(resolve_bit_position(-1.0, 8), None);
        assert_eq!(resolve_bit_position(f64::NAN, 8), None);
    }

    #[test]
    fn test_int_literals() {
        assert_eq!(parse_int_literal("0"), Some(0));
        assert_eq!(parse_int_literal("42"), Some(42));
        assert_eq!(parse_int_literal("-3"), Some(-3));
        assert_eq!(parse_int_literal("0x1F"), Some(31));
        assert_eq!(parse_int_literal("0XfF"), Some(255));
        assert_eq!(parse_int_literal("0o17"), Some(15));
        assert_eq!(parse_int_literal("0b101"), Some(5));
        assert_eq!(parse_int_literal("1_000"), Some(1000));
        assert_eq!(parse_int_literal("00"), Some(0));
        assert_eq!(parse_int_literal("010"), None);
        assert_eq!(parse_int_literal("0x"), None);
        assert_eq!(parse_int_literal("ON"), None);
        assert_eq!(parse_int_literal(""), None);
    }

    #[test]
    fn test_text_table_parse() {
        let table = TextTable::parse("Lamp", "0:OFF\n1：ON\n\n0x2 : ERROR").unwrap();
        let values: Vec<_> = table.entries().iter().map(|e| (e.value, e.label.as_str())).collect();
        assert_eq!(values, vec![(0, "OFF"), (1, "ON"), (2, "ERROR")]);
        assert!(table.check_unique().is_ok());
    }

    #[test]
    fn test_text_table_parse_errors_name_signal() {
        let err = TextTable::parse("Lamp", "0 OFF").unwrap_err();
        assert!(matches!(err, FibexError::MalformedTextTable { ref signal, .. } if signal == "Lamp"));

        let err = TextTable::parse("Lamp", "zero:OFF").unwrap_err();
        assert!(matches!(err, FibexError::MalformedTextTable { .. }));
    }

    #[test]
    fn test_text_table_duplicates() {
        let table = TextTable::new().with_entry(0, "OFF").with_entry(0, "ON");
        assert_eq!(table.check_unique(), Err(0));
    }

    #[test]
    fn test_linear_scaling_defaults() {
        assert_eq!(LinearScaling::from_parts(None, None), None);
        assert_eq!(LinearScaling::from_parts(Some(0.5), None), Some(LinearScaling::new(0.5, 0.0)));
        assert_eq!(LinearScaling::from_parts(None, Some(-40.0)), Some(LinearScaling::new(1.0, -40.0)));
        assert!(LinearScaling::new(1.0, 0.0).is_identity());
        assert!(!LinearScaling::new(2.0, 0.0).is_identity());
    }

    #[test]
    fn test_channel_set_notation() {
        assert_eq!(ChannelSet::parse("A/B"), ChannelSet::AB);
        assert_eq!(ChannelSet::parse("B"), ChannelSet::B);
        assert_eq!(ChannelSet::parse(""), ChannelSet::NONE);
        assert_eq!(String::from(ChannelSet::AB), "A/B");
        assert_eq!(ChannelSet::A.channels().collect::<Vec<_>>(), vec![Channel::A]);
        assert_eq!(ChannelSet::AB.len(), 2);
    }

    #[test]
    fn test_startup_slots_follow_frame_order() {
        let ecu = Ecu::new("BCM", ChannelSet::AB)
            .with_frame(Frame::new("F9", 9).startup(true))
            .with_frame(Frame::new("F7", 7))
            .with_frame(Frame::new("F3", 3).startup(true));
        assert_eq!(ecu.startup_slots(), vec![9, 3]);
    }

    #[test]
    fn test_signal_name_suffix() {
        assert_eq!(Signal::new("Door_COUNT", "uint8", 0, 8).name_suffix(), "COUNT");
        assert_eq!(Signal::new("Speed", "uint16", 0, 16).name_suffix(), "Speed");
    }
}
