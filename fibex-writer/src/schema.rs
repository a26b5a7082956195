//! FIBEX names used by the encoders
//!
//! Elements are written with the conventional prefixes; the template root
//! must bind those prefixes to the ASAM namespaces below.

/// Prefix/URI pairs every template root must declare
pub const NAMESPACES: [(&str, &str); 4] = [
    ("fx", "http://www.asam.net/xml/fbx"),
    ("ho", "http://www.asam.net/xml"),
    ("flexray", "http://www.asam.net/xml/fbx/flexray"),
    ("xsi", "http://www.w3.org/2001/XMLSchema-instance"),
];

pub const ID: &str = "ID";
pub const ID_REF: &str = "ID-REF";
pub const CATEGORY: &str = "CATEGORY";
pub const XSI_TYPE: &str = "xsi:type";

/// Elements in the `fx` namespace
pub mod fx {
    pub const ECUS: &str = "fx:ECUS";
    pub const ECU: &str = "fx:ECU";
    pub const CONTROLLERS: &str = "fx:CONTROLLERS";
    pub const CONTROLLER: &str = "fx:CONTROLLER";
    pub const CONNECTORS: &str = "fx:CONNECTORS";
    pub const CONNECTOR: &str = "fx:CONNECTOR";
    pub const CHANNEL_REF: &str = "fx:CHANNEL-REF";
    pub const CONTROLLER_REF: &str = "fx:CONTROLLER-REF";
    pub const OUTPUTS: &str = "fx:OUTPUTS";
    pub const OUTPUT_PORT: &str = "fx:OUTPUT-PORT";
    pub const FRAME_TRIGGERING_REF: &str = "fx:FRAME-TRIGGERING-REF";

    pub const FRAMES: &str = "fx:FRAMES";
    pub const FRAME: &str = "fx:FRAME";
    pub const BYTE_LENGTH: &str = "fx:BYTE-LENGTH";
    pub const FRAME_TYPE: &str = "fx:FRAME-TYPE";
    pub const SIGNAL_INSTANCES: &str = "fx:SIGNAL-INSTANCES";
    pub const SIGNAL_INSTANCE: &str = "fx:SIGNAL-INSTANCE";
    pub const BIT_POSITION: &str = "fx:BIT-POSITION";
    pub const IS_HIGH_LOW_BYTE_ORDER: &str = "fx:IS-HIGH-LOW-BYTE-ORDER";
    pub const SIGNAL_REF: &str = "fx:SIGNAL-REF";

    pub const FRAME_TRIGGERINGS: &str = "fx:FRAME-TRIGGERINGS";
    pub const FRAME_TRIGGERING: &str = "fx:FRAME-TRIGGERING";
    pub const TIMINGS: &str = "fx:TIMINGS";
    pub const ABSOLUTELY_SCHEDULED_TIMING: &str = "fx:ABSOLUTELY-SCHEDULED-TIMING";
    pub const SLOT_ID: &str = "fx:SLOT-ID";
    pub const BASE_CYCLE: &str = "fx:BASE-CYCLE";
    pub const CYCLE_REPETITION: &str = "fx:CYCLE-REPETITION";
    pub const FRAME_REF: &str = "fx:FRAME-REF";

    pub const SIGNALS: &str = "fx:SIGNALS";
    pub const SIGNAL: &str = "fx:SIGNAL";
    pub const CODING_REF: &str = "fx:CODING-REF";

    pub const CODINGS: &str = "fx:CODINGS";
    pub const CODING: &str = "fx:CODING";
}

/// Elements and attributes in the `ho` namespace
pub mod ho {
    pub const SHORT_NAME: &str = "ho:SHORT-NAME";
    pub const DESC: &str = "ho:DESC";
    pub const CATEGORY: &str = "ho:CATEGORY";
    pub const CODED_TYPE: &str = "ho:CODED-TYPE";
    pub const BIT_LENGTH: &str = "ho:BIT-LENGTH";
    pub const BASE_DATA_TYPE: &str = "ho:BASE-DATA-TYPE";
    pub const COMPU_METHODS: &str = "ho:COMPU-METHODS";
    pub const COMPU_METHOD: &str = "ho:COMPU-METHOD";
    pub const COMPU_INTERNAL_TO_PHYS: &str = "ho:COMPU-INTERNAL-TO-PHYS";
    pub const COMPU_SCALES: &str = "ho:COMPU-SCALES";
    pub const COMPU_SCALE: &str = "ho:COMPU-SCALE";
    pub const COMPU_RATIONAL_COEFFS: &str = "ho:COMPU-RATIONAL-COEFFS";
    pub const COMPU_NUMERATOR: &str = "ho:COMPU-NUMERATOR";
    pub const V: &str = "ho:V";
    pub const VT: &str = "ho:VT";
    pub const LOWER_LIMIT: &str = "ho:LOWER-LIMIT";
    pub const UPPER_LIMIT: &str = "ho:UPPER-LIMIT";
    pub const COMPU_CONST: &str = "ho:COMPU-CONST";
}

/// Elements and type names in the `flexray` namespace
pub mod flexray {
    pub const KEY_SLOT_USAGE: &str = "flexray:KEY-SLOT-USAGE";
    pub const STARTUP_SYNC: &str = "flexray:STARTUP-SYNC";
    pub const NONE: &str = "flexray:NONE";
    pub const WAKE_UP_CHANNEL: &str = "flexray:WAKE-UP-CHANNEL";

    pub const SLOT_ID_TYPE: &str = "flexray:SLOT-ID-TYPE";
    pub const BASE_CYCLE_TYPE: &str = "flexray:BASE-CYCLE-TYPE";
    pub const CYCLE_REPETITION_TYPE: &str = "flexray:CYCLE-REPETITION-TYPE";
}

/// Fixed values written by the encoders
pub const FRAME_TYPE_APPLICATION: &str = "APPLICATION";
pub const CODED_TYPE_CATEGORY: &str = "STANDARD-LENGTH-TYPE";
pub const BASE_DATA_TYPE_PREFIX: &str = "A_";
pub const COMPU_CATEGORY_LINEAR: &str = "LINEAR";
pub const COMPU_CATEGORY_TEXTTABLE: &str = "TEXTTABLE";

/// Scaffold children
pub const SCAFFOLD_CONTROLLER_VALUES: &str = "ControllerValues";
pub const SCAFFOLD_CHANNEL_A: &str = "ChannelA";
pub const SCAFFOLD_CHANNEL_B: &str = "ChannelB";
pub const DEFAULT_CHANNEL_IDS: [&str; 2] = ["Channel_1", "Channel_2"];

/// Build a simple `<name>text</name>` element
pub(crate) fn text_element(name: &str, text: impl Into<String>) -> crate::xml::Element {
    crate::xml::Element::new(name).with_text(text)
}

/// Build a `<name ID-REF="id"/>` reference element
pub(crate) fn ref_element(name: &str, id: &str) -> crate::xml::Element {
    crate::xml::Element::new(name).with_attr(ID_REF, id)
}
