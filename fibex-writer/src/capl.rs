//! Channel synchronization scripts
//!
//! Generates one CAPL node script per ECU that mirrors every signal received
//! on channel A onto the same frame on channel B. Signals whose name ends in
//! `_COUNT` also get a rolling counter incremented on each channel A frame.
//!
//! Scripts are written as UTF-8 and carry the matching CANoe encoding marker.

use crate::model::{Ecu, Network};
use crate::types::Result;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const ENCODING_MARKER: &str = "/*@!Encoding:65001*/";
const COUNTER_SUFFIX: &str = "COUNT";

/// A generated script for one ECU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaplScript {
    pub ecu: String,
    pub source: String,
}

impl CaplScript {
    /// File name of the script (`{ecu}.can`)
    pub fn file_name(&self) -> String {
        format!("{}.can", self.ecu)
    }
}

/// Generate the scripts for every ECU, in network order
pub fn generate(network: &Network) -> Vec<CaplScript> {
    network.ecus.iter().map(generate_ecu).collect()
}

fn generate_ecu(ecu: &Ecu) -> CaplScript {
    CaplScript {
        ecu: ecu.name.clone(),
        source: EcuScript(ecu).to_string(),
    }
}

/// Script body of one ECU, rendered through `Display`
struct EcuScript<'a>(&'a Ecu);

impl fmt::Display for EcuScript<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", ENCODING_MARKER)?;
        f.write_str("includes\n{\n  \n}\n\nvariables\n{\n  byte count = 0;\n}\n")?;

        for frame in &self.0.frames {
            write!(f, "\n/****** {} ******/\n", frame.name)?;
            for signal in &frame.signals {
                write!(
                    f,
                    "\non signal {frame}_Ch_A::{signal} {{\n  ${frame}_Ch_B::{signal} = this;\n}}\n",
                    frame = frame.name,
                    signal = signal.name
                )?;
                if signal.name_suffix() == COUNTER_SUFFIX {
                    write!(
                        f,
                        "\non frFrame {frame}_Ch_A {{\n  count = ${frame}_Ch_A::{signal};\n  count++;\n  ${frame}_Ch_A::{signal} = count;\n}}\n",
                        frame = frame.name,
                        signal = signal.name
                    )?;
                }
            }
        }
        Ok(())
    }
}

/// Generate and write all scripts into `dir`, returning the written paths
pub fn write_scripts(network: &Network, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for script in generate(network) {
        let path = dir.join(script.file_name());
        fs::write(&path, script.source.as_bytes())?;
        log::debug!("Wrote channel sync script {:?}", path);
        written.push(path);
    }
    log::info!("Wrote {} channel sync scripts to {:?}", written.len(), dir);
    Ok(written)
}
