//! ContainerHandle - manages a sensor container with its own worker task
//!
//! Each container owns one category of sensors and runs their scheduling
//! passes on an independent worker. All structural mutation (add/remove/
//! enable) travels over the same command channel as passes, so a mutation
//! can never land mid-iteration: every command is processed at a pass
//! boundary by construction.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use contracts::{PassReport, ScheduleError, Sensor, SensorCategory, SensorId, UpdateFailure};
use metrics::{counter, gauge, histogram};
use slab::Slab;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, trace, warn};

use crate::render::RenderContext;
use crate::slot::SensorSlot;

enum ContainerCommand {
    /// Run one scheduling pass at the given sim time
    Pass {
        now: f64,
        done: oneshot::Sender<PassReport>,
    },
    /// Take ownership of a sensor
    Add {
        id: SensorId,
        sensor: Box<dyn Sensor>,
        done: oneshot::Sender<()>,
    },
    /// Release a sensor; acknowledged with whether the id was owned here
    Remove {
        id: SensorId,
        done: oneshot::Sender<bool>,
    },
    /// Toggle a sensor's enabled flag; acknowledged with whether it was found
    SetEnabled {
        id: SensorId,
        enabled: bool,
        done: oneshot::Sender<bool>,
    },
}

/// Handle to a running container worker.
pub struct ContainerHandle {
    kind: SensorCategory,
    tx: mpsc::Sender<ContainerCommand>,
    worker_handle: JoinHandle<()>,
}

impl ContainerHandle {
    /// Spawn a container worker for the given category.
    ///
    /// Rendering containers receive the shared [`RenderContext`]; they
    /// acquire it around every sensor update. General containers pass
    /// `None` and update without cross-sensor exclusion.
    pub fn spawn(
        kind: SensorCategory,
        render_ctx: Option<RenderContext>,
        queue_capacity: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel(queue_capacity);

        let worker_handle = tokio::spawn(async move {
            container_worker(ContainerState::new(kind, render_ctx), rx).await;
        });

        Self {
            kind,
            tx,
            worker_handle,
        }
    }

    /// Container category.
    pub fn kind(&self) -> SensorCategory {
        self.kind
    }

    /// Run exactly one scheduling pass at sim time `now`.
    pub async fn run_pass(&self, now: f64) -> Result<PassReport, ScheduleError> {
        let (done, ack) = oneshot::channel();
        self.send(ContainerCommand::Pass { now, done }).await?;
        ack.await.map_err(|_| self.closed())
    }

    /// Hand a sensor to the container. Takes effect before the next pass.
    pub async fn add(&self, id: SensorId, sensor: Box<dyn Sensor>) -> Result<(), ScheduleError> {
        let (done, ack) = oneshot::channel();
        self.send(ContainerCommand::Add { id, sensor, done }).await?;
        ack.await.map_err(|_| self.closed())
    }

    /// Release a sensor. Takes effect by the next pass at latest; a pass
    /// already in flight completes with the sensor intact.
    pub async fn remove(&self, id: SensorId) -> Result<bool, ScheduleError> {
        let (done, ack) = oneshot::channel();
        self.send(ContainerCommand::Remove { id, done }).await?;
        ack.await.map_err(|_| self.closed())
    }

    /// Enable or disable a sensor without removing it.
    pub async fn set_enabled(&self, id: SensorId, enabled: bool) -> Result<bool, ScheduleError> {
        let (done, ack) = oneshot::channel();
        self.send(ContainerCommand::SetEnabled { id, enabled, done })
            .await?;
        ack.await.map_err(|_| self.closed())
    }

    /// Stop the worker at the next pass boundary and wait for it to join.
    ///
    /// An in-flight pass always completes first; no sensor is left
    /// mid-update. A worker that does not join within `timeout` is
    /// reported as a shutdown failure instead of hanging the caller.
    #[instrument(name = "container_shutdown", skip(self), fields(container = self.kind.as_str()))]
    pub async fn shutdown(self, timeout: Duration) -> Result<(), ScheduleError> {
        let container = self.kind.as_str();

        // Dropping the sender signals the worker to stop once the queue drains
        drop(self.tx);

        match tokio::time::timeout(timeout, self.worker_handle).await {
            Ok(Ok(())) => {
                debug!(container, "container shutdown complete");
                Ok(())
            }
            Ok(Err(e)) => {
                // The worker is gone either way; its sensors are released
                error!(container, error = ?e, "container worker panicked");
                Ok(())
            }
            Err(_) => Err(ScheduleError::ShutdownTimeout {
                container,
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    async fn send(&self, cmd: ContainerCommand) -> Result<(), ScheduleError> {
        self.tx.send(cmd).await.map_err(|_| self.closed())
    }

    fn closed(&self) -> ScheduleError {
        ScheduleError::ContainerClosed {
            container: self.kind.as_str(),
        }
    }
}

/// Worker-side container state: the owned sensor arena plus scheduling
/// bookkeeping.
struct ContainerState {
    kind: SensorCategory,
    render_ctx: Option<RenderContext>,
    /// Stable-handle arena for owned sensors
    slots: Slab<SensorSlot>,
    /// Slab keys in insertion order; passes iterate this for determinism
    order: Vec<usize>,
    /// Sensor id -> slab key
    index: HashMap<SensorId, usize>,
    /// Sim time of the previous pass, for rewind detection
    last_pass_time: Option<f64>,
    /// Removals applied since the previous pass (reported on the next one)
    removed_since_pass: usize,
}

impl ContainerState {
    fn new(kind: SensorCategory, render_ctx: Option<RenderContext>) -> Self {
        Self {
            kind,
            render_ctx,
            slots: Slab::new(),
            order: Vec::new(),
            index: HashMap::new(),
            last_pass_time: None,
            removed_since_pass: 0,
        }
    }

    fn insert(&mut self, id: SensorId, sensor: Box<dyn Sensor>) {
        let name = sensor.name().to_string();
        let key = self.slots.insert(SensorSlot::new(id, sensor));
        self.order.push(key);
        self.index.insert(id, key);
        gauge!("scheduler_container_sensors", "container" => self.kind.as_str())
            .set(self.order.len() as f64);
        debug!(
            container = self.kind.as_str(),
            sensor_id = %id,
            sensor = %name,
            "sensor added to container"
        );
    }

    fn remove(&mut self, id: SensorId) -> bool {
        let Some(key) = self.index.remove(&id) else {
            warn!(
                container = self.kind.as_str(),
                sensor_id = %id,
                "remove for sensor not owned by this container"
            );
            return false;
        };
        self.slots.remove(key);
        self.order.retain(|&k| k != key);
        self.removed_since_pass += 1;
        gauge!("scheduler_container_sensors", "container" => self.kind.as_str())
            .set(self.order.len() as f64);
        debug!(container = self.kind.as_str(), sensor_id = %id, "sensor removed from container");
        true
    }

    fn set_enabled(&mut self, id: SensorId, enabled: bool) -> bool {
        match self.index.get(&id).and_then(|&key| self.slots.get_mut(key)) {
            Some(slot) => {
                slot.enabled = enabled;
                debug!(
                    container = self.kind.as_str(),
                    sensor_id = %id,
                    enabled,
                    "sensor enabled flag changed"
                );
                true
            }
            None => false,
        }
    }

    /// Evaluate every owned sensor once, in insertion order.
    async fn execute_pass(&mut self, now: f64) -> PassReport {
        let started = Instant::now();
        let container = self.kind.as_str();

        let mut report = PassReport::empty(self.kind, now);
        report.removed = std::mem::take(&mut self.removed_since_pass);

        // A sim-time rewind (explicit reset) invalidates every stamp: this
        // pass updates nothing and the next one starts the timeline fresh.
        if self.last_pass_time.is_some_and(|prev| now < prev) {
            warn!(
                container,
                sim_time = now,
                previous = self.last_pass_time,
                "sim time rewind detected, resetting update stamps"
            );
            for (_, slot) in self.slots.iter_mut() {
                slot.last_update = None;
            }
            self.last_pass_time = Some(now);
            report.rewound = true;
            report.skipped = self.order.len();
            return report;
        }
        self.last_pass_time = Some(now);

        let keys = self.order.clone();
        for key in keys {
            let Some(slot) = self.slots.get_mut(key) else {
                continue;
            };
            if !slot.is_due(now) {
                report.skipped += 1;
                continue;
            }

            // Rendering sensors hold the context lock only for the duration
            // of their own update
            let result = match &self.render_ctx {
                Some(ctx) => {
                    let _guard = ctx.acquire_exclusive().await;
                    slot.sensor.update(now)
                }
                None => slot.sensor.update(now),
            };

            match result {
                Ok(()) => {
                    slot.last_update = Some(now);
                    report.updated.push(slot.id);
                    counter!("scheduler_sensor_updates_total", "container" => container)
                        .increment(1);
                    trace!(
                        container,
                        sensor_id = %slot.id,
                        sim_time = now,
                        "sensor updated"
                    );
                }
                Err(e) => {
                    // Stale last_update means the sensor is retried at its
                    // next due time; the pass continues regardless
                    error!(
                        container,
                        sensor_id = %slot.id,
                        sensor = slot.sensor.name(),
                        sim_time = now,
                        error = %e,
                        "sensor update failed"
                    );
                    counter!(
                        "scheduler_sensor_update_failures_total",
                        "container" => container
                    )
                    .increment(1);
                    report.failed.push(UpdateFailure {
                        id: slot.id,
                        message: e.to_string(),
                    });
                }
            }
        }

        histogram!("scheduler_pass_duration_seconds", "container" => container)
            .record(started.elapsed().as_secs_f64());

        report
    }
}

/// Worker task: processes commands until the handle is dropped.
///
/// Commands are strictly serialized, so a pass in flight always completes
/// before any add/remove/shutdown is observed.
#[instrument(name = "container_worker_loop", skip(state, rx), fields(container = state.kind.as_str()))]
async fn container_worker(mut state: ContainerState, mut rx: mpsc::Receiver<ContainerCommand>) {
    debug!(container = state.kind.as_str(), "container worker started");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            ContainerCommand::Pass { now, done } => {
                let report = state.execute_pass(now).await;
                let _ = done.send(report);
            }
            ContainerCommand::Add { id, sensor, done } => {
                state.insert(id, sensor);
                let _ = done.send(());
            }
            ContainerCommand::Remove { id, done } => {
                let found = state.remove(id);
                let _ = done.send(found);
            }
            ContainerCommand::SetEnabled { id, enabled, done } => {
                let found = state.set_enabled(id, enabled);
                let _ = done.send(found);
            }
        }
    }

    debug!(
        container = state.kind.as_str(),
        sensors = state.order.len(),
        "container worker stopped, releasing sensors"
    );
}
