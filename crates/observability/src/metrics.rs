//! Scheduler metrics collection
//!
//! Records per-pass and per-step metrics from scheduler reports and
//! aggregates them in memory for run summaries.

use contracts::{PassReport, StepReport};
use metrics::{counter, gauge, histogram};

/// Record metrics from a single container pass.
///
/// Call this for each `PassReport` the scheduler produces.
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_pass_metrics;
///
/// if let Some(report) = manager.run_one_step().await? {
///     record_pass_metrics(&report.rendering);
///     record_pass_metrics(&report.general);
/// }
/// ```
pub fn record_pass_metrics(report: &PassReport) {
    let container = report.container.as_str();

    counter!("scheduler_passes_total", "container" => container).increment(1);
    gauge!("scheduler_last_pass_sim_time", "container" => container).set(report.sim_time);

    if !report.updated.is_empty() {
        counter!("scheduler_pass_updates_total", "container" => container)
            .increment(report.updated.len() as u64);
    }

    if !report.failed.is_empty() {
        counter!("scheduler_pass_failures_total", "container" => container)
            .increment(report.failed.len() as u64);
        for failure in &report.failed {
            counter!(
                "scheduler_sensor_failures_total",
                "sensor_id" => failure.id.to_string()
            )
            .increment(1);
        }
    }

    gauge!("scheduler_pass_skipped_current", "container" => container)
        .set(report.skipped as f64);

    if report.removed > 0 {
        counter!("scheduler_pass_removals_total", "container" => container)
            .increment(report.removed as u64);
    }

    if report.rewound {
        counter!("scheduler_time_rewinds_total", "container" => container).increment(1);
    }

    histogram!("scheduler_pass_updated_hist", "container" => container)
        .record(report.updated.len() as f64);
}

/// Record metrics from one complete step across both containers.
pub fn record_step_metrics(report: &StepReport) {
    counter!("scheduler_steps_total").increment(1);
    gauge!("scheduler_sim_time").set(report.sim_time);

    record_pass_metrics(&report.rendering);
    record_pass_metrics(&report.general);
}

/// Record wall-clock duration of one step.
pub fn record_step_duration_ms(duration_ms: f64) {
    histogram!("scheduler_step_duration_ms").record(duration_ms);
}

/// Step metrics aggregator
///
/// Aggregates step reports in memory for end-of-run summaries.
#[derive(Debug, Clone, Default)]
pub struct StepMetricsAggregator {
    /// Total steps driven
    pub total_steps: u64,

    /// Total successful sensor updates
    pub total_updates: u64,

    /// Total failed sensor updates
    pub total_failures: u64,

    /// Total skipped (not-due or disabled) evaluations
    pub total_skipped: u64,

    /// Total removals applied at pass boundaries
    pub total_removed: u64,

    /// Steps in which a sim-time rewind was detected
    pub steps_with_rewind: u64,

    /// Updates-per-step statistics
    pub update_stats: RunningStats,

    /// Per-sensor failure counts, keyed by sensor id rendering
    pub failure_counts: std::collections::HashMap<String, u64>,
}

impl StepMetricsAggregator {
    /// Create a new aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one step report into the aggregate.
    pub fn update(&mut self, report: &StepReport) {
        self.total_steps += 1;

        let updates = report.updates() as u64;
        self.total_updates += updates;
        self.total_failures += report.failures() as u64;
        self.total_skipped += (report.rendering.skipped + report.general.skipped) as u64;
        self.total_removed += (report.rendering.removed + report.general.removed) as u64;

        if report.rendering.rewound || report.general.rewound {
            self.steps_with_rewind += 1;
        }

        self.update_stats.push(updates as f64);

        for failure in report.rendering.failed.iter().chain(&report.general.failed) {
            *self
                .failure_counts
                .entry(failure.id.to_string())
                .or_insert(0) += 1;
        }
    }

    /// Produce a summary report.
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_steps: self.total_steps,
            total_updates: self.total_updates,
            total_failures: self.total_failures,
            total_skipped: self.total_skipped,
            total_removed: self.total_removed,
            steps_with_rewind: self.steps_with_rewind,
            failure_rate: if self.total_updates + self.total_failures > 0 {
                self.total_failures as f64 / (self.total_updates + self.total_failures) as f64
                    * 100.0
            } else {
                0.0
            },
            updates_per_step: StatsSummary::from(&self.update_stats),
            sensor_failure_counts: self.failure_counts.clone(),
        }
    }

    /// Reset the aggregate.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Aggregated run summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_steps: u64,
    pub total_updates: u64,
    pub total_failures: u64,
    pub total_skipped: u64,
    pub total_removed: u64,
    pub steps_with_rewind: u64,
    pub failure_rate: f64,
    pub updates_per_step: StatsSummary,
    pub sensor_failure_counts: std::collections::HashMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Scheduler Metrics Summary ===")?;
        writeln!(f, "Total steps: {}", self.total_steps)?;
        writeln!(f, "Sensor updates: {}", self.total_updates)?;
        writeln!(
            f,
            "Failed updates: {} ({:.2}%)",
            self.total_failures, self.failure_rate
        )?;
        writeln!(f, "Skipped evaluations: {}", self.total_skipped)?;
        writeln!(f, "Removals applied: {}", self.total_removed)?;
        writeln!(f, "Steps with time rewind: {}", self.steps_with_rewind)?;
        writeln!(f, "Updates per step: {}", self.updates_per_step)?;

        if !self.sensor_failure_counts.is_empty() {
            writeln!(f, "Failure counts:")?;
            for (sensor, count) in &self.sensor_failure_counts {
                writeln!(f, "  {}: {}", sensor, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Push a new sample.
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sample mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Sample standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum sample
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum sample
    pub fn max(&self) -> f64 {
        self.max
    }
}
