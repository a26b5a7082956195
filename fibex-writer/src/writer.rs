//! Main writer API
//!
//! The FibexWriter drives the encoders over a network, splices their
//! fragments into the template and serializes the result. Nothing is written
//! to disk unless the whole run succeeds.

use crate::config::WriterConfig;
use crate::encoder::{encode_ecu, encode_frame, encode_triggering, FrameIds};
use crate::ids::{IdAllocator, IdCategory};
use crate::model::{Channel, Network};
use crate::schema;
use crate::template::{Container, Template};
use crate::types::{FibexError, Result, WriteStats};
use crate::xml::{Document, Element};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Result of one serialization run
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    /// The serialized FIBEX document
    pub xml: String,
    /// What the run emitted
    pub stats: WriteStats,
}

/// Fragments collected during a run, in generation order
#[derive(Debug, Default)]
struct Fragments {
    ecus: Vec<Element>,
    frames: Vec<Element>,
    signals: Vec<Element>,
    codings: Vec<Element>,
    triggerings: [Vec<Element>; 2],
}

/// The main writer struct - entry point for all serialization
pub struct FibexWriter {
    config: WriterConfig,
}

impl FibexWriter {
    /// Create a writer with default settings
    pub fn new() -> Self {
        Self::with_config(WriterConfig::default())
    }

    pub fn with_config(config: WriterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Serialize `network` into the FIBEX `template`
    ///
    /// Every call uses a fresh id allocator, so identical inputs give
    /// byte-identical output.
    ///
    /// # Example
    /// ```no_run
    /// use fibex_writer::{FibexWriter, Network};
    ///
    /// let template = std::fs::read_to_string("template.xml").unwrap();
    /// let network = Network::default();
    /// let assembled = FibexWriter::new().assemble(&template, &network).unwrap();
    /// println!("{}", assembled.xml);
    /// ```
    pub fn assemble(&self, template: &str, network: &Network) -> Result<Assembled> {
        let order = self.config.document_order;
        let mut template = Template::parse(template, &self.config.scaffold_element)?;
        let mut ids = IdAllocator::new();
        let mut fragments = Fragments::default();

        log::info!("Serializing {} ECUs ({:?} order)", network.ecus.len(), order);

        let mut seen = HashSet::new();
        for ecu in &network.ecus {
            if !seen.insert(ecu.name.as_str()) {
                log::warn!("ECU name {} appears more than once", ecu.name);
            }

            let frame_ids: Vec<FrameIds> = ecu.frames.iter().map(|_| FrameIds::allocate(&mut ids)).collect();

            for (frame, frame_ids) in ecu.frames.iter().zip(&frame_ids) {
                let triggering = encode_triggering(frame, frame_ids);
                for channel in frame.channels.channels() {
                    fragments.triggerings[channel.index()].push(triggering.clone());
                }
                if frame.channels.is_empty() {
                    log::warn!("Frame {} of ECU {} is on no channel", frame.name, ecu.name);
                }
            }

            fragments.ecus.push(encode_ecu(
                ecu,
                &frame_ids,
                template.controller_defaults(),
                template.channel_ids(),
                &mut ids,
                order,
            )?);

            for (frame, frame_ids) in ecu.frames.iter().zip(&frame_ids) {
                let encoded = encode_frame(frame, frame_ids, &mut ids, order).map_err(|e| e.in_ecu(&ecu.name))?;
                fragments.frames.push(encoded.frame);
                for signal in encoded.signals {
                    fragments.signals.push(signal.signal);
                    fragments.codings.push(signal.coding);
                }
            }
        }

        let num_triggerings = fragments.triggerings.iter().map(Vec::len).sum();
        let stats = WriteStats::from_issued(|category| ids.issued(category), num_triggerings);

        template.insert(Container::Ecus, fragments.ecus, order)?;
        template.insert(Container::Frames, fragments.frames, order)?;
        template.insert(Container::Signals, fragments.signals, order)?;
        template.insert(Container::Codings, fragments.codings, order)?;
        let [channel_a, channel_b] = fragments.triggerings;
        template.insert_triggerings(Channel::A, channel_a, order)?;
        template.insert_triggerings(Channel::B, channel_b, order)?;

        let document = template.finish()?;
        if self.config.verify_references {
            check_references(&document)?;
        }

        let xml = document.to_xml_string()?;
        log::info!("Serialization complete: {}", stats);
        Ok(Assembled { xml, stats })
    }

    /// Read the template from disk, serialize, and write the output file
    ///
    /// The output file is only created once the whole document is ready.
    pub fn write_file(&self, template_path: &Path, network: &Network, output_path: &Path) -> Result<WriteStats> {
        log::info!("Loading template: {:?}", template_path);
        let template = fs::read_to_string(template_path)?;

        let assembled = self.assemble(&template, network)?;

        fs::write(output_path, assembled.xml.as_bytes())?;
        log::info!("FIBEX database written to {:?}", output_path);
        Ok(assembled.stats)
    }
}

impl Default for FibexWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize `network` into `template` with the default configuration
pub fn assemble(template: &str, network: &Network) -> Result<String> {
    FibexWriter::new().assemble(template, network).map(|a| a.xml)
}

/// Check that every `ID-REF` in the document names an element `ID`
pub fn check_references(document: &Document) -> Result<()> {
    let mut declared: HashSet<String> = HashSet::new();
    document.root.walk(&mut |e: &Element| {
        if let Some(id) = e.attr(schema::ID) {
            declared.insert(id.to_string());
        }
    });

    let mut unresolved: Option<(String, String)> = None;
    document.root.walk(&mut |e: &Element| {
        if unresolved.is_some() {
            return;
        }
        if let Some(id) = e.attr(schema::ID_REF) {
            if !declared.contains(id) {
                unresolved = Some((e.local_name().to_string(), id.to_string()));
            }
        }
    });

    match unresolved {
        Some((element, id)) => {
            let category = IdCategory::of_id(&id).map_or(element, |c| c.to_string());
            Err(FibexError::unresolved(category, &id))
        }
        None => Ok(()),
    }
}
