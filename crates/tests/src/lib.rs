//! # Integration Tests
//!
//! Integration and end-to-end tests.
//!
//! Covers:
//! - Scheduling semantics across the full manager surface
//! - Lifecycle and shutdown behavior
//! - Manifest-to-scheduler end-to-end flow (no GUI, no real renderer)

#[cfg(test)]
mod support {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    use contracts::{Sensor, SensorCategory, SensorError};

    /// Shared invocation log: (sensor name, sim time) per successful update.
    pub type UpdateLog = Arc<Mutex<Vec<(String, f64)>>>;

    pub fn new_log() -> UpdateLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    /// Test sensor that records its successful updates into a shared log.
    pub struct ProbeSensor {
        name: String,
        category: SensorCategory,
        period: f64,
        log: UpdateLog,
        fail_remaining: Arc<AtomicU64>,
    }

    impl ProbeSensor {
        pub fn new(name: &str, category: SensorCategory, period: f64, log: UpdateLog) -> Self {
            Self {
                name: name.to_string(),
                category,
                period,
                log,
                fail_remaining: Arc::new(AtomicU64::new(0)),
            }
        }

        /// Make the next `count` update calls fail.
        pub fn failing(mut self, count: u64) -> Self {
            self.fail_remaining = Arc::new(AtomicU64::new(count));
            self
        }
    }

    impl Sensor for ProbeSensor {
        fn name(&self) -> &str {
            &self.name
        }

        fn category(&self) -> SensorCategory {
            self.category
        }

        fn update_period(&self) -> f64 {
            self.period
        }

        fn update(&mut self, now: f64) -> Result<(), SensorError> {
            let remaining = self.fail_remaining.load(Ordering::Relaxed);
            if remaining > 0 {
                self.fail_remaining.store(remaining - 1, Ordering::Relaxed);
                return Err(SensorError::measurement("injected fault"));
            }

            self.log.lock().unwrap().push((self.name.clone(), now));
            Ok(())
        }
    }

    /// Names in log order, for sequence assertions.
    pub fn names(log: &UpdateLog) -> Vec<String> {
        log.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    /// Entries for one sensor: the sim times it updated at.
    pub fn times_of(log: &UpdateLog, name: &str) -> Vec<f64> {
        log.lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, t)| *t)
            .collect()
    }
}

#[cfg(test)]
mod scheduling_tests {
    use std::sync::Arc;

    use contracts::{ManualClock, SensorCategory, SimClock};
    use scheduler::SensorManager;

    use crate::support::{names, new_log, times_of, ProbeSensor};

    fn manager_with_clock(clock: &Arc<ManualClock>) -> SensorManager {
        let sim_clock: Arc<dyn SimClock> = clock.clone();
        SensorManager::new(sim_clock)
    }

    /// Mixed-rate scenario: a 10 Hz general sensor and an every-pass
    /// rendering sensor stepped at 0.0 / 0.05 / 0.10 / 0.15.
    #[tokio::test]
    async fn test_mixed_rate_scenario() {
        let clock = Arc::new(ManualClock::new());
        let manager = manager_with_clock(&clock);
        let log = new_log();

        manager
            .add_sensor(Box::new(ProbeSensor::new(
                "a",
                SensorCategory::General,
                0.1,
                log.clone(),
            )))
            .await
            .unwrap();
        manager
            .add_sensor(Box::new(ProbeSensor::new(
                "b",
                SensorCategory::Rendering,
                0.0,
                log.clone(),
            )))
            .await
            .unwrap();

        manager.init().await.unwrap();
        manager.run().await.unwrap();

        for t in [0.0, 0.05, 0.10, 0.15] {
            clock.set(t);
            manager.run_one_step().await.unwrap().unwrap();
        }
        manager.fini().await.unwrap();

        // b has period 0: due on every pass
        assert_eq!(times_of(&log, "b"), vec![0.0, 0.05, 0.10, 0.15]);
        // a has period 0.1: first pass plus t=0.10
        assert_eq!(times_of(&log, "a"), vec![0.0, 0.10]);
    }

    /// A sensor is never updated more than once within its period window.
    #[tokio::test]
    async fn test_rate_limiting() {
        let clock = Arc::new(ManualClock::new());
        let manager = manager_with_clock(&clock);
        let log = new_log();

        manager
            .add_sensor(Box::new(ProbeSensor::new(
                "slow",
                SensorCategory::General,
                0.5,
                log.clone(),
            )))
            .await
            .unwrap();

        manager.init().await.unwrap();
        manager.run().await.unwrap();

        // 100 steps of 0.01s = 1.0s of sim time
        for _ in 0..100 {
            clock.advance(0.01);
            manager.run_one_step().await.unwrap().unwrap();
        }
        manager.fini().await.unwrap();

        // The clock accumulates 100 additions of 0.01, so compare within
        // an epsilon instead of against exact literals
        let times = times_of(&log, "slow");
        let expected = [0.01, 0.51];
        assert_eq!(times.len(), expected.len(), "update times: {times:?}");
        for (got, want) in times.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
        }
    }

    /// Two managers with identical rosters produce identical update
    /// sequences when driven identically.
    #[tokio::test]
    async fn test_deterministic_invocation_order() {
        let mut sequences = Vec::new();

        for _ in 0..2 {
            let clock = Arc::new(ManualClock::new());
            let manager = manager_with_clock(&clock);
            let log = new_log();

            for name in ["first", "second", "third"] {
                manager
                    .add_sensor(Box::new(ProbeSensor::new(
                        name,
                        SensorCategory::General,
                        0.0,
                        log.clone(),
                    )))
                    .await
                    .unwrap();
            }

            manager.init().await.unwrap();
            manager.run().await.unwrap();

            for _ in 0..3 {
                clock.advance(0.01);
                manager.run_one_step().await.unwrap().unwrap();
            }
            manager.fini().await.unwrap();

            sequences.push(names(&log));
        }

        assert_eq!(sequences[0], sequences[1]);
        // Insertion order within each pass
        assert_eq!(sequences[0][..3], ["first", "second", "third"]);
    }

    /// Duplicate names are rejected and do not disturb the existing sensor.
    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let clock = Arc::new(ManualClock::new());
        let manager = manager_with_clock(&clock);
        let log = new_log();

        manager
            .add_sensor(Box::new(ProbeSensor::new(
                "cam",
                SensorCategory::Rendering,
                0.0,
                log.clone(),
            )))
            .await
            .unwrap();

        let err = manager
            .add_sensor(Box::new(ProbeSensor::new(
                "cam",
                SensorCategory::General,
                0.0,
                log.clone(),
            )))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
        assert_eq!(manager.sensor_count().await, 1);

        manager.init().await.unwrap();
        manager.run().await.unwrap();
        clock.advance(0.01);
        manager.run_one_step().await.unwrap().unwrap();
        manager.fini().await.unwrap();

        assert_eq!(names(&log), vec!["cam"]);
    }

    /// A removal is effective by the next pass at the latest.
    #[tokio::test]
    async fn test_remove_effective_next_pass() {
        let clock = Arc::new(ManualClock::new());
        let manager = manager_with_clock(&clock);
        let log = new_log();

        let keep = manager
            .add_sensor(Box::new(ProbeSensor::new(
                "keep",
                SensorCategory::General,
                0.0,
                log.clone(),
            )))
            .await
            .unwrap();
        let drop_id = manager
            .add_sensor(Box::new(ProbeSensor::new(
                "drop",
                SensorCategory::General,
                0.0,
                log.clone(),
            )))
            .await
            .unwrap();

        manager.init().await.unwrap();
        manager.run().await.unwrap();

        clock.advance(0.01);
        manager.run_one_step().await.unwrap().unwrap();

        manager.remove_sensor(drop_id).await.unwrap();
        assert!(manager.get_sensor(drop_id).await.is_err());
        assert!(manager.get_sensor(keep).await.is_ok());

        clock.advance(0.01);
        let report = manager.run_one_step().await.unwrap().unwrap();
        assert_eq!(report.general.removed, 1);

        manager.fini().await.unwrap();

        assert_eq!(times_of(&log, "drop").len(), 1);
        assert_eq!(times_of(&log, "keep").len(), 2);
    }

    /// A disabled sensor is skipped until re-enabled.
    #[tokio::test]
    async fn test_disable_and_reenable() {
        let clock = Arc::new(ManualClock::new());
        let manager = manager_with_clock(&clock);
        let log = new_log();

        let id = manager
            .add_sensor(Box::new(ProbeSensor::new(
                "imu",
                SensorCategory::General,
                0.0,
                log.clone(),
            )))
            .await
            .unwrap();

        manager.init().await.unwrap();
        manager.run().await.unwrap();

        clock.advance(0.01);
        manager.run_one_step().await.unwrap().unwrap();

        manager.set_sensor_enabled(id, false).await.unwrap();
        clock.advance(0.01);
        let report = manager.run_one_step().await.unwrap().unwrap();
        assert!(report.general.updated.is_empty());
        assert_eq!(report.general.skipped, 1);

        manager.set_sensor_enabled(id, true).await.unwrap();
        clock.advance(0.01);
        manager.run_one_step().await.unwrap().unwrap();

        manager.fini().await.unwrap();
        assert_eq!(times_of(&log, "imu").len(), 2);
    }

    /// Sim-time rewind: the step updates nothing and clears stamps, so the
    /// next forward step updates fresh.
    #[tokio::test]
    async fn test_time_rewind() {
        let clock = Arc::new(ManualClock::new());
        let manager = manager_with_clock(&clock);
        let log = new_log();

        manager
            .add_sensor(Box::new(ProbeSensor::new(
                "scan",
                SensorCategory::General,
                0.5,
                log.clone(),
            )))
            .await
            .unwrap();

        manager.init().await.unwrap();
        manager.run().await.unwrap();

        clock.set(1.0);
        manager.run_one_step().await.unwrap().unwrap();

        clock.set(0.5);
        let report = manager.run_one_step().await.unwrap().unwrap();
        assert!(report.general.rewound);
        assert!(report.general.updated.is_empty());

        // Stamps were cleared: the sensor is due immediately after the rewind
        clock.set(0.6);
        manager.run_one_step().await.unwrap().unwrap();

        manager.fini().await.unwrap();
        assert_eq!(times_of(&log, "scan"), vec![1.0, 0.6]);
    }
}

#[cfg(test)]
mod failure_tests {
    use std::sync::Arc;

    use contracts::{ManualClock, SensorCategory, SimClock};
    use scheduler::SensorManager;

    use crate::support::{new_log, times_of, ProbeSensor};

    /// A failing sensor is isolated: siblings keep updating, the failure is
    /// reported, and the sensor retries until it succeeds.
    #[tokio::test]
    async fn test_failure_isolation_and_retry() {
        let clock = Arc::new(ManualClock::new());
        let sim_clock: Arc<dyn SimClock> = clock.clone();
        let manager = SensorManager::new(sim_clock);
        let log = new_log();

        let flaky_id = manager
            .add_sensor(Box::new(
                ProbeSensor::new("flaky", SensorCategory::General, 0.1, log.clone()).failing(2),
            ))
            .await
            .unwrap();
        manager
            .add_sensor(Box::new(ProbeSensor::new(
                "steady",
                SensorCategory::General,
                0.1,
                log.clone(),
            )))
            .await
            .unwrap();

        manager.init().await.unwrap();
        manager.run().await.unwrap();

        // t=0.1: flaky fails, steady updates
        clock.set(0.1);
        let report = manager.run_one_step().await.unwrap().unwrap();
        assert_eq!(report.general.failed.len(), 1);
        assert_eq!(report.general.failed[0].id, flaky_id);
        assert_eq!(report.general.updated.len(), 1);

        // t=0.15: flaky has no stamp so it retries (and fails again);
        // steady is inside its period window and is skipped
        clock.set(0.15);
        let report = manager.run_one_step().await.unwrap().unwrap();
        assert_eq!(report.general.failed.len(), 1);
        assert!(report.general.updated.is_empty());

        // t=0.2: flaky finally succeeds, steady is due again
        clock.set(0.2);
        let report = manager.run_one_step().await.unwrap().unwrap();
        assert!(report.general.failed.is_empty());
        assert_eq!(report.general.updated.len(), 2);

        manager.fini().await.unwrap();

        assert_eq!(times_of(&log, "flaky"), vec![0.2]);
        assert_eq!(times_of(&log, "steady"), vec![0.1, 0.2]);
    }
}

#[cfg(test)]
mod lifecycle_tests {
    use std::sync::Arc;

    use contracts::{ManualClock, ScheduleError, SensorCategory, SimClock};
    use scheduler::{LifecycleState, SensorManager};

    use crate::support::{new_log, ProbeSensor};

    fn manager_with_clock(clock: &Arc<ManualClock>) -> SensorManager {
        let sim_clock: Arc<dyn SimClock> = clock.clone();
        SensorManager::new(sim_clock)
    }

    #[tokio::test]
    async fn test_lifecycle_transitions() {
        let clock = Arc::new(ManualClock::new());
        let manager = manager_with_clock(&clock);

        assert_eq!(manager.state().await, LifecycleState::Uninitialized);

        // Steps before running are no-ops
        assert!(manager.run_one_step().await.unwrap().is_none());

        manager.init().await.unwrap();
        assert_eq!(manager.state().await, LifecycleState::Initialized);
        assert!(manager.run_one_step().await.unwrap().is_none());

        manager.run().await.unwrap();
        assert_eq!(manager.state().await, LifecycleState::Running);
        assert!(manager.run_one_step().await.unwrap().is_some());

        manager.fini().await.unwrap();
        assert_eq!(manager.state().await, LifecycleState::Finalized);
    }

    #[tokio::test]
    async fn test_fini_idempotent_and_terminal() {
        let clock = Arc::new(ManualClock::new());
        let manager = manager_with_clock(&clock);
        let log = new_log();

        manager
            .add_sensor(Box::new(ProbeSensor::new(
                "cam",
                SensorCategory::Rendering,
                0.0,
                log.clone(),
            )))
            .await
            .unwrap();

        manager.init().await.unwrap();
        manager.run().await.unwrap();
        clock.advance(0.01);
        manager.run_one_step().await.unwrap().unwrap();

        manager.fini().await.unwrap();
        // Second fini is a no-op
        manager.fini().await.unwrap();

        // No more updates after fini
        let before = log.lock().unwrap().len();
        clock.advance(0.01);
        assert!(manager.run_one_step().await.unwrap().is_none());
        assert_eq!(log.lock().unwrap().len(), before);

        // Mutations after fini are rejected
        let err = manager
            .add_sensor(Box::new(ProbeSensor::new(
                "late",
                SensorCategory::General,
                0.0,
                log,
            )))
            .await
            .unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidState { .. }));

        // Registry is emptied on fini
        assert_eq!(manager.sensor_count().await, 0);
    }

    #[tokio::test]
    async fn test_add_while_running() {
        let clock = Arc::new(ManualClock::new());
        let manager = manager_with_clock(&clock);
        let log = new_log();

        manager.init().await.unwrap();
        manager.run().await.unwrap();

        clock.advance(0.01);
        let report = manager.run_one_step().await.unwrap().unwrap();
        assert_eq!(report.updates(), 0);

        manager
            .add_sensor(Box::new(ProbeSensor::new(
                "late",
                SensorCategory::General,
                0.0,
                log,
            )))
            .await
            .unwrap();

        clock.advance(0.01);
        let report = manager.run_one_step().await.unwrap().unwrap();
        assert_eq!(report.updates(), 1);

        manager.fini().await.unwrap();
    }
}

#[cfg(test)]
mod render_tests {
    use std::time::Duration;

    use contracts::{SensorCategory, SensorId};
    use scheduler::{ContainerHandle, RenderContext};
    use tokio::time::timeout;

    use crate::support::{new_log, ProbeSensor};

    /// While the rendering context is held externally, the rendering pass
    /// blocks; it completes once the holder releases.
    #[tokio::test]
    async fn test_render_pass_waits_for_context() {
        let ctx = RenderContext::new();
        let container = ContainerHandle::spawn(SensorCategory::Rendering, Some(ctx.clone()), 8);
        let log = new_log();

        container
            .add(
                SensorId::from_raw(1),
                Box::new(ProbeSensor::new(
                    "cam",
                    SensorCategory::Rendering,
                    0.0,
                    log.clone(),
                )),
            )
            .await
            .unwrap();

        let guard = ctx.acquire_exclusive().await;

        // Inner scope: the pinned pass borrows the container, and the
        // borrow must end before shutdown takes it by value
        {
            let pass = container.run_pass(0.1);
            tokio::pin!(pass);

            // The pass cannot finish while the context is held
            assert!(timeout(Duration::from_millis(50), &mut pass).await.is_err());
            assert!(log.lock().unwrap().is_empty());

            drop(guard);

            let report = timeout(Duration::from_secs(1), &mut pass)
                .await
                .expect("pass should finish once the context is released")
                .unwrap();
            assert_eq!(report.updated.len(), 1);
            assert_eq!(log.lock().unwrap().len(), 1);
        }

        container.shutdown(Duration::from_secs(1)).await.unwrap();
    }
}

#[cfg(test)]
mod manifest_tests {
    use std::sync::Arc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ManualClock, SimClock};
    use observability::StepMetricsAggregator;
    use scheduler::SensorManager;

    const MANIFEST: &str = r#"
[simulation]
step_s = 0.01
steps = 20

[[sensors]]
name = "front_camera"
kind = "camera"
rate_hz = 25.0
image_width = 16
image_height = 16

[[sensors]]
name = "imu0"
kind = "imu"
rate_hz = 0.0

[[sensors]]
name = "scan"
kind = "range_finder"
rate_hz = 10.0
max_range_m = 30.0
"#;

    /// Manifest -> factory -> manager, driven for the manifest's step budget.
    #[tokio::test]
    async fn test_manifest_end_to_end() {
        let manifest = ConfigLoader::load_from_str(MANIFEST, ConfigFormat::Toml).unwrap();

        let clock = Arc::new(ManualClock::new());
        let sim_clock: Arc<dyn SimClock> = clock.clone();
        let manager = SensorManager::new(sim_clock);

        for sensor in sensor_factory::build_all(&manifest).unwrap() {
            manager.add_sensor(sensor).await.unwrap();
        }

        manager.init().await.unwrap();
        manager.run().await.unwrap();

        let mut aggregator = StepMetricsAggregator::new();
        let steps = manifest.simulation.steps.unwrap();
        for _ in 0..steps {
            clock.advance(manifest.simulation.step_s);
            let report = manager.run_one_step().await.unwrap().unwrap();
            aggregator.update(&report);
        }
        manager.fini().await.unwrap();

        let summary = aggregator.summary();
        assert_eq!(summary.total_steps, 20);
        assert_eq!(summary.total_failures, 0);

        // Over 0.2s of sim time: imu (every step) 20 updates,
        // camera (25 Hz -> 0.04s) 5 updates, scan (10 Hz -> 0.1s) 2 updates
        assert_eq!(summary.total_updates, 20 + 5 + 2);
    }

    #[tokio::test]
    async fn test_find_by_name_after_manifest_load() {
        let manifest = ConfigLoader::load_from_str(MANIFEST, ConfigFormat::Toml).unwrap();

        let clock = Arc::new(ManualClock::new());
        let sim_clock: Arc<dyn SimClock> = clock.clone();
        let manager = SensorManager::new(sim_clock);

        for sensor in sensor_factory::build_all(&manifest).unwrap() {
            manager.add_sensor(sensor).await.unwrap();
        }

        let id = manager.find_sensor_by_name("front_camera").await.unwrap();
        let record = manager.get_sensor(id).await.unwrap();
        assert_eq!(record.name, "front_camera");
        assert_eq!(
            record.category,
            contracts::SensorCategory::Rendering
        );
        assert!((record.period_s - 0.04).abs() < 1e-12);

        assert!(manager.find_sensor_by_name("missing").await.is_err());

        manager.fini().await.unwrap();
    }
}
