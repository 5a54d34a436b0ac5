//! SensorId - opaque handle for a registered sensor
//!
//! Allocated by the registry at registration time; never reused within a
//! manager's lifetime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a registered sensor.
///
/// Ids are allocated sequentially by the registry and stay valid until the
/// sensor is removed. They are `Copy`, so they can be handed across task
/// boundaries freely.
///
/// # Examples
/// ```
/// use contracts::SensorId;
///
/// let id = SensorId::from_raw(7);
/// assert_eq!(id.raw(), 7);
/// assert_eq!(id.to_string(), "sensor#7");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(u64);

impl SensorId {
    /// Construct an id from its raw value.
    ///
    /// Intended for registries and tests; ordinary callers receive ids from
    /// `add_sensor` and should treat them as opaque.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw numeric value.
    #[inline]
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sensor#{}", self.0)
    }
}

impl fmt::Debug for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SensorId({})", self.0)
    }
}
