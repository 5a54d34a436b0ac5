//! Scheduling loop driver.
//!
//! Owns the full run lifecycle: build sensors from the manifest, bring the
//! manager up, drive fixed-step updates against the manual sim clock, and
//! shut everything down again.

use std::pin::pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{ManualClock, SimClock, SimulationManifest, StepReport};
use observability::{record_step_metrics, StepMetricsAggregator};
use scheduler::{ManagerConfig, SensorManager};
use tracing::{info, instrument, warn};

use super::stats::RunStats;

/// Driver configuration
pub struct DriverConfig {
    /// Loaded and validated manifest
    pub manifest: SimulationManifest,

    /// Capacity of each container's command channel
    pub queue_capacity: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Scheduling loop driver
pub struct Driver {
    config: DriverConfig,
}

impl Driver {
    /// Create a new driver
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// Run the full scheduling loop until the step budget is spent or a
    /// shutdown signal arrives.
    #[instrument(name = "driver_run", skip(self))]
    pub async fn run(self) -> Result<RunStats> {
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
        }

        let sim = self.config.manifest.simulation.clone();
        let clock = Arc::new(ManualClock::new());
        let sim_clock: Arc<dyn SimClock> = clock.clone();
        let manager = SensorManager::with_config(
            sim_clock,
            ManagerConfig {
                queue_capacity: self.config.queue_capacity,
                ..Default::default()
            },
        );

        // Build and register the roster before init so every sensor joins
        // its container in manifest order
        let sensors =
            sensor_factory::build_all(&self.config.manifest).context("Failed to build sensors")?;
        for (spec, sensor) in self.config.manifest.sensors.iter().zip(sensors) {
            let id = manager.add_sensor(sensor).await?;
            if !spec.enabled {
                manager.set_sensor_enabled(id, false).await?;
            }
        }

        manager.init().await?;
        manager.run().await?;

        let sensor_count = manager.sensor_count().await;
        info!(
            sensors = sensor_count,
            step_s = sim.step_s,
            steps = ?sim.steps,
            real_time = sim.real_time,
            "scheduling loop started"
        );

        let started = Instant::now();
        let mut aggregator = StepMetricsAggregator::new();
        let mut steps_run: u64 = 0;
        let mut shutdown = pin!(shutdown_signal());

        loop {
            if let Some(limit) = sim.steps {
                if steps_run >= limit {
                    break;
                }
            }

            tokio::select! {
                _ = &mut shutdown => {
                    warn!(steps_run, "Received shutdown signal, stopping scheduling loop");
                    break;
                }
                result = drive_step(&clock, &manager, sim.step_s, sim.real_time) => {
                    match result? {
                        Some(report) => {
                            record_step_metrics(&report);
                            aggregator.update(&report);
                            steps_run += 1;
                        }
                        // Manager left the running state
                        None => break,
                    }
                }
            }
        }

        manager.fini().await?;

        Ok(RunStats {
            steps_run,
            final_sim_time: clock.now(),
            sensor_count,
            duration: started.elapsed(),
            step_metrics: aggregator,
        })
    }
}

/// Advance the sim clock by one step and run all container passes.
async fn drive_step(
    clock: &ManualClock,
    manager: &SensorManager,
    step_s: f64,
    real_time: bool,
) -> Result<Option<StepReport>> {
    clock.advance(step_s);
    let report = manager.run_one_step().await?;

    if real_time {
        tokio::time::sleep(Duration::from_secs_f64(step_s)).await;
    }

    Ok(report)
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ConfigVersion, SensorKind, SensorSpec, SimulationConfig};

    fn test_manifest(steps: u64) -> SimulationManifest {
        SimulationManifest {
            version: ConfigVersion::V1,
            simulation: SimulationConfig {
                step_s: 0.01,
                steps: Some(steps),
                real_time: false,
            },
            sensors: vec![
                SensorSpec {
                    name: "cam".to_string(),
                    kind: SensorKind::Camera,
                    rate_hz: 50.0,
                    enabled: true,
                    image_width: 8,
                    image_height: 8,
                    max_range_m: 10.0,
                },
                SensorSpec {
                    name: "imu0".to_string(),
                    kind: SensorKind::Imu,
                    rate_hz: 0.0,
                    enabled: true,
                    image_width: 320,
                    image_height: 240,
                    max_range_m: 10.0,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_driver_runs_step_budget() {
        let driver = Driver::new(DriverConfig {
            manifest: test_manifest(10),
            queue_capacity: 32,
            metrics_port: None,
        });

        let stats = driver.run().await.unwrap();

        assert_eq!(stats.steps_run, 10);
        assert_eq!(stats.sensor_count, 2);
        assert!((stats.final_sim_time - 0.1).abs() < 1e-9);
        // imu0 has period 0 so it updates on every step
        assert!(stats.step_metrics.total_updates >= 10);
        assert_eq!(stats.step_metrics.total_failures, 0);
    }

    #[tokio::test]
    async fn test_driver_skips_disabled_sensor() {
        let mut manifest = test_manifest(5);
        manifest.sensors[0].enabled = false;

        let driver = Driver::new(DriverConfig {
            manifest,
            queue_capacity: 32,
            metrics_port: None,
        });

        let stats = driver.run().await.unwrap();
        assert_eq!(stats.steps_run, 5);
        assert_eq!(stats.sensor_count, 2);
        // Only imu0 (period 0) runs; the disabled camera never updates
        assert_eq!(stats.step_metrics.total_updates, 5);
    }

    #[tokio::test]
    async fn test_driver_empty_roster() {
        let mut manifest = test_manifest(5);
        manifest.sensors.clear();

        let driver = Driver::new(DriverConfig {
            manifest,
            queue_capacity: 32,
            metrics_port: None,
        });

        let stats = driver.run().await.unwrap();
        assert_eq!(stats.steps_run, 5);
        assert_eq!(stats.sensor_count, 0);
        assert_eq!(stats.step_metrics.total_updates, 0);
    }
}
