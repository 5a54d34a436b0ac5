//! Sensor trait - simulated sensor abstraction
//!
//! Defines the capability interface every schedulable sensor implements,
//! decoupling the scheduling core from concrete sensor implementations.

use serde::{Deserialize, Serialize};

use crate::SensorError;

/// Scheduling category of a sensor.
///
/// Rendering sensors read the shared, non-re-entrant rendering context while
/// updating and therefore run under the system-wide render lock. General
/// sensors have no cross-sensor exclusion requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorCategory {
    /// Requires exclusive access to the rendering context per update
    Rendering,
    /// No shared-resource requirement; may update concurrently with others
    General,
}

impl SensorCategory {
    /// Short lowercase label, used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rendering => "rendering",
            Self::General => "general",
        }
    }
}

/// Simulated sensor capability trait.
///
/// Anything exposing a globally unique name, a scheduling category, an
/// update period and an update entry point qualifies as a sensor; the
/// scheduling core never depends on concrete sensor types.
///
/// # Scheduling contract
///
/// - `update` is invoked at most once per scheduling pass, and only when
///   the elapsed sim time since the last successful update reaches
///   `update_period`.
/// - `update` is assumed non-blocking/bounded; blocking inside it stalls
///   only the rest of the owning container's pass.
/// - An `Err` from `update` is isolated by the scheduler: it is logged,
///   the sensor's last-update stamp stays stale (so it retries at the next
///   due time) and the pass continues with the remaining sensors.
pub trait Sensor: Send + 'static {
    /// Globally unique sensor name.
    fn name(&self) -> &str;

    /// Scheduling category (fixed for the sensor's lifetime).
    fn category(&self) -> SensorCategory;

    /// Desired update period in sim seconds.
    ///
    /// A period of `0.0` means the sensor is due on every pass.
    fn update_period(&self) -> f64;

    /// Produce a new measurement for sim time `now`.
    ///
    /// The sensor mutates its own output state; publishing that output is
    /// the concern of external consumers, not of the scheduler.
    fn update(&mut self, now: f64) -> Result<(), SensorError>;
}
