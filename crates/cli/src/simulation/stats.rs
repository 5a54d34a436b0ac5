//! Run statistics.

use std::time::Duration;

use observability::StepMetricsAggregator;

/// Statistics from a scheduling run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Total steps driven
    pub steps_run: u64,

    /// Sim time the clock ended at
    pub final_sim_time: f64,

    /// Number of sensors that were registered
    pub sensor_count: usize,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Aggregated step metrics
    pub step_metrics: StepMetricsAggregator,
}

impl RunStats {
    /// Steps driven per wall-clock second
    pub fn steps_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.steps_run as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Run Statistics                           ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Steps: {}", self.steps_run);
        println!("   ├─ Final sim time: {:.3}s", self.final_sim_time);
        println!("   ├─ Steps/sec: {:.2}", self.steps_per_sec());
        println!("   └─ Sensors: {}", self.sensor_count);

        let summary = self.step_metrics.summary();

        println!("\n📈 Scheduler Metrics");
        println!("   ├─ Sensor updates: {}", summary.total_updates);
        println!(
            "   ├─ Failed updates: {} ({:.2}%)",
            summary.total_failures, summary.failure_rate
        );
        println!("   ├─ Skipped evaluations: {}", summary.total_skipped);
        println!("   ├─ Removals applied: {}", summary.total_removed);
        println!("   ├─ Steps with time rewind: {}", summary.steps_with_rewind);
        println!("   └─ Updates per step: {}", summary.updates_per_step);

        if !summary.sensor_failure_counts.is_empty() {
            println!("\n⚠️  Failure Counts");
            for (sensor, count) in &summary.sensor_failure_counts {
                println!("   ├─ {}: {}", sensor, count);
            }
        }

        println!();
    }
}
