//! # Scheduler
//!
//! Sensor update scheduling core for the simulator.
//!
//! Responsibilities:
//! - `SensorRegistry`: id/name-indexed store of active sensors
//!   (shared-access reads, exclusive-access writes)
//! - Container workers: one independent scheduling loop per category,
//!   owning its sensors and running rate-limited passes in deterministic
//!   insertion order
//! - `RenderContext`: the system-wide exclusive lock rendering sensors
//!   hold while updating
//! - `SensorManager`: Init/Run/Fini lifecycle over the containers and the
//!   registry
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use contracts::ManualClock;
//! use scheduler::SensorManager;
//!
//! let clock = Arc::new(ManualClock::new());
//! let manager = SensorManager::new(clock.clone());
//! manager.add_sensor(Box::new(my_sensor)).await?;
//! manager.init().await?;
//! manager.run().await?;
//! loop {
//!     clock.advance(0.01);
//!     manager.run_one_step().await?;
//! }
//! ```

mod container;
mod manager;
mod registry;
mod render;
mod slot;

pub use container::ContainerHandle;
pub use manager::{LifecycleState, ManagerConfig, SensorManager};
pub use registry::SensorRegistry;
pub use render::{RenderContext, RenderGuard};
