//! SensorRecord - registry metadata view
//!
//! Non-owning description of a registered sensor. Sensor objects themselves
//! are owned by exactly one container worker; lookups hand out this record.

use serde::{Deserialize, Serialize};

use crate::{SensorCategory, SensorId};

/// Registry entry describing one registered sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorRecord {
    /// Allocated id, unique within the manager
    pub id: SensorId,

    /// Globally unique sensor name
    pub name: String,

    /// Scheduling category (decides the owning container)
    pub category: SensorCategory,

    /// Update period in sim seconds (0.0 = every pass)
    pub period_s: f64,
}
