//! Configuration and network file loading

use anyhow::{bail, Context, Result};
use fibex_writer::{Network, WriterConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// FIBEX template the network is spliced into
    pub template: Option<PathBuf>,
    /// Output FIBEX file
    pub output: Option<PathBuf>,
    /// Directory for the channel sync scripts; none are written if unset
    pub capl_dir: Option<PathBuf>,
    #[serde(default)]
    pub writer: WriterConfig,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

/// Load a network description, JSON or TOML depending on the file extension
pub fn load_network(path: &Path) -> Result<Network> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read network file: {:?}", path))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let network: Network = match extension.as_deref() {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse network file: {:?}", path))?,
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Failed to parse network file: {:?}", path))?,
        _ => bail!("Unsupported network file {:?} (expected .json or .toml)", path),
    };

    Ok(network)
}
