//! PassReport / StepReport - scheduler output
//!
//! One `PassReport` per container pass; `run_one_step` bundles the
//! per-container reports into a `StepReport`.

use serde::{Deserialize, Serialize};

use crate::{SensorCategory, SensorId};

/// A sensor update that failed during a pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateFailure {
    /// The failing sensor
    pub id: SensorId,
    /// Rendered error message from the sensor
    pub message: String,
}

/// Outcome of one container scheduling pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassReport {
    /// Category of the container that ran the pass
    pub container: SensorCategory,

    /// Sim time the pass was evaluated at
    pub sim_time: f64,

    /// Sensors updated successfully, in invocation (insertion) order
    pub updated: Vec<SensorId>,

    /// Sensors whose `update` returned an error this pass
    pub failed: Vec<UpdateFailure>,

    /// Sensors that were not due (or disabled) this pass
    pub skipped: usize,

    /// Removals applied at pass boundaries since the previous pass
    pub removed: usize,

    /// True when this pass detected a sim-time rewind and updated nothing
    pub rewound: bool,
}

impl PassReport {
    /// Empty report for a pass at `sim_time`.
    pub fn empty(container: SensorCategory, sim_time: f64) -> Self {
        Self {
            container,
            sim_time,
            updated: Vec::new(),
            failed: Vec::new(),
            skipped: 0,
            removed: 0,
            rewound: false,
        }
    }

    /// Number of sensors the pass evaluated.
    pub fn evaluated(&self) -> usize {
        self.updated.len() + self.failed.len() + self.skipped
    }
}

/// Outcome of one `run_one_step` call across all containers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    /// Sim time the step was driven at (read once from the clock)
    pub sim_time: f64,

    /// Pass outcome of the rendering container
    pub rendering: PassReport,

    /// Pass outcome of the general container
    pub general: PassReport,
}

impl StepReport {
    /// Total successful updates across both containers.
    pub fn updates(&self) -> usize {
        self.rendering.updated.len() + self.general.updated.len()
    }

    /// Total failed updates across both containers.
    pub fn failures(&self) -> usize {
        self.rendering.failed.len() + self.general.failed.len()
    }
}
