//! FIBEX Writer Library
//!
//! Serializes a FlexRay network model (ECUs, frames, signals) into a FIBEX
//! XML database built on a template document, and generates the CAPL scripts
//! that mirror channel A traffic onto channel B.
//!
//! # Architecture
//!
//! - `ids`: per-run identifier allocator (`{Category}_{n}`)
//! - `encoder`: ECU, frame and signal encoders producing detached fragments
//! - `template`: template validation, controller defaults, container access
//! - `writer`: drives the encoders and assembles the final document
//!
//! The library does NOT:
//! - Read spreadsheets (the network model is built by the caller)
//! - Validate against the FIBEX XSD
//! - Parse FIBEX back into a network model
//!
//! # Example Usage
//!
//! ```no_run
//! use fibex_writer::{ChannelSet, Ecu, FibexWriter, Frame, Network, Signal, WriterConfig};
//! use std::path::Path;
//!
//! let network = Network::new(vec![Ecu::new("BCM", ChannelSet::AB).with_frame(
//!     Frame::new("BCM_Status", 3)
//!         .startup(true)
//!         .with_signal(Signal::new("DoorOpen", "uint8", 0, 1)),
//! )]);
//!
//! let writer = FibexWriter::with_config(WriterConfig::new());
//! let stats = writer
//!     .write_file(Path::new("template.xml"), &network, Path::new("network.xml"))
//!     .unwrap();
//! println!("Wrote {}", stats);
//! ```

// Public modules
pub mod capl;
pub mod config;
pub mod encoder;
pub mod ids;
pub mod model;
pub mod template;
pub mod types;
pub mod writer;
pub mod xml;

// Re-export main types for convenience
pub use config::{DocumentOrder, WriterConfig};
pub use ids::{IdAllocator, IdCategory};
pub use model::{
    resolve_bit_position, Channel, ChannelSet, Ecu, Frame, FrameType, LinearScaling, Network, Signal,
    TextTable, TextTableEntry,
};
pub use types::{FibexError, Result, WriteStats};
pub use writer::{assemble, check_references, Assembled, FibexWriter};

// Internal modules (not exposed in public API)
mod schema;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
