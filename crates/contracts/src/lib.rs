//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Uses simulation time (seconds, f64) as the primary clock, decoupled from wall clock
//! - Sim time is monotonic non-decreasing except on an explicit simulation reset

mod clock;
mod error;
mod manifest;
mod record;
mod report;
mod sensor;
mod sensor_id;

pub use clock::{ManualClock, SimClock};
pub use error::{ScheduleError, SensorError};
pub use manifest::*;
pub use record::SensorRecord;
pub use report::{PassReport, StepReport, UpdateFailure};
pub use sensor::{Sensor, SensorCategory};
pub use sensor_id::SensorId;
