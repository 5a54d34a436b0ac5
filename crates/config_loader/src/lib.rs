//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON manifest files
//! - Validate manifest legality
//! - Produce a `SimulationManifest`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let manifest = ConfigLoader::load_from_path(Path::new("sensors.toml")).unwrap();
//! println!("Sensors: {}", manifest.sensors.len());
//! ```

mod parser;
mod validator;

pub use contracts::SimulationManifest;
pub use parser::ConfigFormat;

use contracts::ScheduleError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load a manifest from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a manifest from a file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<SimulationManifest, ScheduleError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a manifest from a string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<SimulationManifest, ScheduleError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize a manifest to a TOML string
    pub fn to_toml(manifest: &SimulationManifest) -> Result<String, ScheduleError> {
        toml::to_string_pretty(manifest)
            .map_err(|e| ScheduleError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a manifest to a JSON string
    pub fn to_json(manifest: &SimulationManifest) -> Result<String, ScheduleError> {
        serde_json::to_string_pretty(manifest)
            .map_err(|e| ScheduleError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ScheduleError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ScheduleError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ScheduleError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read manifest file content
    fn read_file(path: &Path) -> Result<String, ScheduleError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate manifest content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<SimulationManifest, ScheduleError> {
        let manifest = parser::parse(content, format)?;
        validator::validate(&manifest)?;
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
[simulation]
step_s = 0.01
steps = 100

[[sensors]]
name = "front_camera"
kind = "camera"
rate_hz = 20.0
image_width = 640
image_height = 480

[[sensors]]
name = "imu0"
kind = "imu"
rate_hz = 100.0
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let manifest = result.unwrap();
        assert_eq!(manifest.sensors.len(), 2);
        assert_eq!(manifest.sensors[0].name, "front_camera");
    }

    #[test]
    fn test_round_trip_toml() {
        let manifest = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&manifest).unwrap();
        let manifest2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(manifest.sensors.len(), manifest2.sensors.len());
        assert_eq!(manifest.sensors[0].name, manifest2.sensors[0].name);
        assert_eq!(manifest.simulation.steps, manifest2.simulation.steps);
    }

    #[test]
    fn test_round_trip_json() {
        let manifest = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&manifest).unwrap();
        let manifest2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(manifest.sensors[0].name, manifest2.sensors[0].name);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        // Duplicate sensor name should fail validation
        let content = r#"
[simulation]
step_s = 0.01

[[sensors]]
name = "cam"
kind = "camera"
rate_hz = 10.0

[[sensors]]
name = "cam"
kind = "imu"
rate_hz = 10.0
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }
}
