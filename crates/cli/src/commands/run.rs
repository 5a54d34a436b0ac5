//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::RunArgs;
use crate::simulation::{Driver, DriverConfig};

/// Execute the `run` command
pub async fn run_simulation(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading manifest");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Manifest file not found: {}", args.config.display());
    }

    // Load and parse manifest
    let mut manifest = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load manifest from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(steps) = args.steps {
        info!(steps, "Overriding step budget from CLI");
        manifest.simulation.steps = if steps == 0 { None } else { Some(steps) };
    }
    if let Some(step_s) = args.step_s {
        if !step_s.is_finite() || step_s <= 0.0 {
            anyhow::bail!("--step-s must be a finite value > 0, got {step_s}");
        }
        info!(step_s, "Overriding step size from CLI");
        manifest.simulation.step_s = step_s;
    }
    if args.real_time {
        manifest.simulation.real_time = true;
    }

    info!(
        sensors = manifest.sensors.len(),
        step_s = manifest.simulation.step_s,
        steps = ?manifest.simulation.steps,
        "Manifest loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - manifest is valid, exiting");
        print_manifest_summary(&manifest);
        return Ok(());
    }

    let driver = Driver::new(DriverConfig {
        manifest,
        queue_capacity: args.queue_capacity,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    });

    info!("Starting scheduling loop...");

    let stats = driver.run().await.context("Scheduling loop failed")?;

    info!(
        steps = stats.steps_run,
        updates = stats.step_metrics.total_updates,
        failures = stats.step_metrics.total_failures,
        duration_secs = stats.duration.as_secs_f64(),
        "Scheduling loop completed"
    );

    stats.print_summary();

    info!("Sim Sensors finished");
    Ok(())
}

/// Print manifest summary for dry-run mode
fn print_manifest_summary(manifest: &contracts::SimulationManifest) {
    println!("\n=== Manifest Summary ===\n");
    println!("Simulation:");
    println!("  Step size: {}s", manifest.simulation.step_s);
    match manifest.simulation.steps {
        Some(steps) => println!("  Steps: {}", steps),
        None => println!("  Steps: until interrupted"),
    }

    println!("\nSensors ({}):", manifest.sensors.len());
    for sensor in &manifest.sensors {
        let rate = if sensor.rate_hz > 0.0 {
            format!("{} Hz", sensor.rate_hz)
        } else {
            "every step".to_string()
        };
        println!(
            "  - {} ({:?}, {}, {})",
            sensor.name,
            sensor.kind,
            sensor.kind.category().as_str(),
            rate
        );
    }

    println!();
}
