//! Fragment encoders
//!
//! Each encoder turns one model entity into detached XML fragments; the
//! writer decides which container they land in. Ids flow explicitly: the
//! frame ids are allocated first and handed to both the ECU encoder (output
//! ports) and the frame encoder (frame, triggering, signal instances).

pub mod ecu;
pub mod frame;
pub mod signal;

// Re-export key types for convenience
pub use ecu::{encode_ecu, key_slot_usage, wakeup_channel};
pub use frame::{encode_frame, encode_triggering, FrameFragments, FrameIds};
pub use signal::{base_data_type, encode_signal, SignalFragments};
