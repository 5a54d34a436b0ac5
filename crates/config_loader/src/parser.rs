//! Manifest parsing
//!
//! Supports TOML (primary) and JSON (optional) formats.

use contracts::{ScheduleError, SimulationManifest};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a TOML manifest
pub fn parse_toml(content: &str) -> Result<SimulationManifest, ScheduleError> {
    toml::from_str(content).map_err(|e| ScheduleError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a JSON manifest
pub fn parse_json(content: &str) -> Result<SimulationManifest, ScheduleError> {
    serde_json::from_str(content).map_err(|e| ScheduleError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse a manifest in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<SimulationManifest, ScheduleError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}
