//! SimulationManifest - Config Loader output
//!
//! Describes a complete sensor setup: step size, pacing, and the sensor
//! roster with per-sensor rates and parameters.

use serde::{Deserialize, Serialize};

use crate::SensorCategory;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete simulation sensor manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationManifest {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Simulation loop settings
    pub simulation: SimulationConfig,

    /// Sensor roster
    #[serde(default)]
    pub sensors: Vec<SensorSpec>,
}

/// Simulation loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Fixed sim-time increment per step (seconds), must be > 0
    #[serde(default = "default_step_s")]
    pub step_s: f64,

    /// Number of steps to run (None = until interrupted)
    #[serde(default)]
    pub steps: Option<u64>,

    /// Pace steps against wall clock (sleep `step_s` between steps)
    #[serde(default)]
    pub real_time: bool,
}

fn default_step_s() -> f64 {
    0.01
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step_s: default_step_s(),
            steps: None,
            real_time: false,
        }
    }
}

/// Kind of built-in simulated sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// RGB camera (rendering-dependent)
    Camera,
    /// Depth camera (rendering-dependent)
    DepthCamera,
    /// Single-beam range finder
    RangeFinder,
    /// Inertial measurement unit
    Imu,
    /// Contact/bumper sensor
    Contact,
}

impl SensorKind {
    /// Scheduling category implied by the kind.
    pub fn category(&self) -> SensorCategory {
        match self {
            Self::Camera | Self::DepthCamera => SensorCategory::Rendering,
            Self::RangeFinder | Self::Imu | Self::Contact => SensorCategory::General,
        }
    }
}

/// One sensor entry in the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSpec {
    /// Globally unique sensor name
    pub name: String,

    /// Sensor kind
    pub kind: SensorKind,

    /// Update rate in Hz; 0 means "update every pass"
    #[serde(default)]
    pub rate_hz: f64,

    /// Whether the sensor starts enabled; disabled sensors stay registered
    /// but are skipped by the due check until re-enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Image width in pixels (camera kinds)
    #[serde(default = "default_image_width")]
    pub image_width: u32,

    /// Image height in pixels (camera kinds)
    #[serde(default = "default_image_height")]
    pub image_height: u32,

    /// Maximum range in meters (range finder)
    #[serde(default = "default_max_range_m")]
    pub max_range_m: f64,
}

fn default_enabled() -> bool {
    true
}

fn default_image_width() -> u32 {
    320
}

fn default_image_height() -> u32 {
    240
}

fn default_max_range_m() -> f64 {
    10.0
}

impl SensorSpec {
    /// Update period in sim seconds implied by `rate_hz` (0 Hz = period 0).
    pub fn period_s(&self) -> f64 {
        if self.rate_hz > 0.0 {
            1.0 / self.rate_hz
        } else {
            0.0
        }
    }
}
