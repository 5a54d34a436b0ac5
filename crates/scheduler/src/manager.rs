//! SensorManager - lifecycle controller over the registry and containers
//!
//! Explicitly constructed instance (no process-wide singleton): the main
//! loop owns it and drives `init` / `run` / `run_one_step` / `fini`.
//! Sensors may be added in any state except Finalized; additions before
//! `init` are staged and handed to their container when containers come up.

use std::sync::Arc;
use std::time::Duration;

use contracts::{
    ScheduleError, Sensor, SensorCategory, SensorId, SensorRecord, SimClock, StepReport,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::container::ContainerHandle;
use crate::registry::SensorRegistry;
use crate::render::RenderContext;

/// Lifecycle state of the manager. Finalized is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    Running,
    Finalized,
}

impl LifecycleState {
    /// Lowercase label for logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Running => "running",
            Self::Finalized => "finalized",
        }
    }
}

/// Manager tuning knobs.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Capacity of each container's command channel
    pub queue_capacity: usize,

    /// How long `fini` waits for a container worker to join
    pub shutdown_timeout: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 32,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

struct StagedSensor {
    id: SensorId,
    sensor: Box<dyn Sensor>,
    enabled: bool,
}

struct ManagerInner {
    state: LifecycleState,
    /// Sensors added before `init`, waiting for their container
    staged: Vec<StagedSensor>,
    rendering: Option<ContainerHandle>,
    general: Option<ContainerHandle>,
}

/// Coordinates sensor registration and scheduling across both containers.
///
/// All mutating operations serialize on one internal lock, which also
/// guarantees that `fini` waits for any in-flight step before tearing the
/// containers down. Read-only lookups go straight to the registry's shared
/// lock and run concurrently with steps.
pub struct SensorManager {
    clock: Arc<dyn SimClock>,
    registry: SensorRegistry,
    config: ManagerConfig,
    inner: Mutex<ManagerInner>,
}

impl SensorManager {
    /// Create a manager with default configuration.
    pub fn new(clock: Arc<dyn SimClock>) -> Self {
        Self::with_config(clock, ManagerConfig::default())
    }

    /// Create a manager with custom configuration.
    pub fn with_config(clock: Arc<dyn SimClock>, config: ManagerConfig) -> Self {
        Self {
            clock,
            registry: SensorRegistry::new(),
            config,
            inner: Mutex::new(ManagerInner {
                state: LifecycleState::Uninitialized,
                staged: Vec::new(),
                rendering: None,
                general: None,
            }),
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> LifecycleState {
        self.inner.lock().await.state
    }

    /// Register a sensor and hand it to the container matching its
    /// category (or stage it until `init`).
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::DuplicateName`] when the name is taken; nothing
    ///   is mutated.
    /// - [`ScheduleError::InvalidState`] after `fini`.
    #[instrument(name = "manager_add_sensor", skip(self, sensor), fields(sensor = sensor.name()))]
    pub async fn add_sensor(&self, sensor: Box<dyn Sensor>) -> Result<SensorId, ScheduleError> {
        let mut inner = self.inner.lock().await;
        if inner.state == LifecycleState::Finalized {
            return Err(ScheduleError::invalid_state("finalized", "add_sensor"));
        }

        let record = self
            .registry
            .register(sensor.name(), sensor.category(), sensor.update_period())
            .await?;

        let container = match record.category {
            SensorCategory::Rendering => inner.rendering.as_ref(),
            SensorCategory::General => inner.general.as_ref(),
        };

        match container {
            Some(handle) => {
                if let Err(e) = handle.add(record.id, sensor).await {
                    // Keep registry and container contents consistent
                    let _ = self.registry.unregister(record.id).await;
                    return Err(e);
                }
            }
            None => inner.staged.push(StagedSensor {
                id: record.id,
                sensor,
                enabled: true,
            }),
        }

        Ok(record.id)
    }

    /// Remove a sensor. The owning container applies the removal at a pass
    /// boundary; a pass already in flight never observes a half-removed
    /// sensor.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::NotFound`] for an unknown id.
    /// - [`ScheduleError::InvalidState`] after `fini`.
    #[instrument(name = "manager_remove_sensor", skip(self), fields(sensor_id = %id))]
    pub async fn remove_sensor(&self, id: SensorId) -> Result<(), ScheduleError> {
        let mut inner = self.inner.lock().await;
        if inner.state == LifecycleState::Finalized {
            return Err(ScheduleError::invalid_state("finalized", "remove_sensor"));
        }

        let record = self.registry.unregister(id).await?;

        if let Some(pos) = inner.staged.iter().position(|s| s.id == id) {
            inner.staged.remove(pos);
            return Ok(());
        }

        match self.container_for(&inner, record.category) {
            Some(handle) => {
                handle.remove(id).await?;
                Ok(())
            }
            // Not staged and no container: nothing owns it (already drained)
            None => Ok(()),
        }
    }

    /// Enable or disable a sensor without removing it. Disabled sensors
    /// are skipped by the due check.
    pub async fn set_sensor_enabled(
        &self,
        id: SensorId,
        enabled: bool,
    ) -> Result<(), ScheduleError> {
        let mut inner = self.inner.lock().await;
        if inner.state == LifecycleState::Finalized {
            return Err(ScheduleError::invalid_state("finalized", "set_sensor_enabled"));
        }

        let record = self.registry.get(id).await?;

        if let Some(staged) = inner.staged.iter_mut().find(|s| s.id == id) {
            staged.enabled = enabled;
            return Ok(());
        }

        match self.container_for(&inner, record.category) {
            Some(handle) => {
                if handle.set_enabled(id, enabled).await? {
                    Ok(())
                } else {
                    Err(ScheduleError::not_found(id.to_string()))
                }
            }
            None => Err(ScheduleError::not_found(id.to_string())),
        }
    }

    /// Number of registered sensors.
    pub async fn sensor_count(&self) -> usize {
        self.registry.len().await
    }

    /// Resolve a sensor id from its unique name.
    pub async fn find_sensor_by_name(&self, name: &str) -> Result<SensorId, ScheduleError> {
        self.registry.find_by_name(name).await
    }

    /// Non-owning metadata view of a registered sensor.
    pub async fn get_sensor(&self, id: SensorId) -> Result<SensorRecord, ScheduleError> {
        self.registry.get(id).await
    }

    /// Construct the containers and hand them the staged sensor set.
    /// Scheduling does not start until `run`.
    #[instrument(name = "manager_init", skip(self))]
    pub async fn init(&self) -> Result<(), ScheduleError> {
        let mut inner = self.inner.lock().await;
        if inner.state != LifecycleState::Uninitialized {
            return Err(ScheduleError::invalid_state(inner.state.as_str(), "init"));
        }

        let render_ctx = RenderContext::new();
        let rendering = ContainerHandle::spawn(
            SensorCategory::Rendering,
            Some(render_ctx),
            self.config.queue_capacity,
        );
        let general =
            ContainerHandle::spawn(SensorCategory::General, None, self.config.queue_capacity);

        let staged = std::mem::take(&mut inner.staged);
        let staged_count = staged.len();
        for entry in staged {
            let handle = match entry.sensor.category() {
                SensorCategory::Rendering => &rendering,
                SensorCategory::General => &general,
            };
            handle.add(entry.id, entry.sensor).await?;
            if !entry.enabled {
                handle.set_enabled(entry.id, false).await?;
            }
        }

        inner.rendering = Some(rendering);
        inner.general = Some(general);
        inner.state = LifecycleState::Initialized;

        info!(sensors = staged_count, "sensor manager initialized");
        Ok(())
    }

    /// Start scheduling: `run_one_step` becomes effective.
    pub async fn run(&self) -> Result<(), ScheduleError> {
        let mut inner = self.inner.lock().await;
        if inner.state != LifecycleState::Initialized {
            return Err(ScheduleError::invalid_state(inner.state.as_str(), "run"));
        }
        inner.state = LifecycleState::Running;
        info!("sensor manager running");
        Ok(())
    }

    /// Drive exactly one pass on every container, concurrently.
    ///
    /// Reads the sim clock once so both containers see the same time.
    /// No-op (returns `Ok(None)`) unless the manager is Running.
    #[instrument(name = "manager_run_one_step", skip(self))]
    pub async fn run_one_step(&self) -> Result<Option<StepReport>, ScheduleError> {
        let inner = self.inner.lock().await;
        if inner.state != LifecycleState::Running {
            return Ok(None);
        }

        let now = self.clock.now();
        let (Some(rendering), Some(general)) = (inner.rendering.as_ref(), inner.general.as_ref())
        else {
            return Ok(None);
        };

        let (render_pass, general_pass) =
            tokio::join!(rendering.run_pass(now), general.run_pass(now));

        let report = StepReport {
            sim_time: now,
            rendering: render_pass?,
            general: general_pass?,
        };

        debug!(
            sim_time = now,
            updates = report.updates(),
            failures = report.failures(),
            "step complete"
        );

        Ok(Some(report))
    }

    /// Finalize: stop both container loops at their next pass boundary,
    /// wait for in-flight passes to finish, release all sensors and clear
    /// the registry.
    ///
    /// Idempotent: repeated (or concurrent) calls after the first are
    /// no-ops. A container worker that fails to join within the configured
    /// timeout yields [`ScheduleError::ShutdownTimeout`] instead of
    /// hanging.
    #[instrument(name = "manager_fini", skip(self))]
    pub async fn fini(&self) -> Result<(), ScheduleError> {
        let mut inner = self.inner.lock().await;
        if inner.state == LifecycleState::Finalized {
            return Ok(());
        }
        inner.state = LifecycleState::Finalized;

        inner.staged.clear();
        let rendering = inner.rendering.take();
        let general = inner.general.take();
        // State is Finalized and containers are detached; the lock can be
        // released while workers drain
        drop(inner);

        let mut first_error = None;
        for handle in [rendering, general].into_iter().flatten() {
            if let Err(e) = handle.shutdown(self.config.shutdown_timeout).await {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        self.registry.clear().await;
        info!("sensor manager finalized");

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn container_for<'a>(
        &self,
        inner: &'a ManagerInner,
        category: SensorCategory,
    ) -> Option<&'a ContainerHandle> {
        match category {
            SensorCategory::Rendering => inner.rendering.as_ref(),
            SensorCategory::General => inner.general.as_ref(),
        }
    }
}
