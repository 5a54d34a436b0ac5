//! Scheduling loop orchestration module.

mod driver;
mod stats;

pub use driver::{Driver, DriverConfig};
pub use stats::RunStats;
