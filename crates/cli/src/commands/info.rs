//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Manifest info for JSON output
#[derive(Serialize)]
struct ManifestInfo {
    version: String,
    simulation: SimulationInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sensors: Vec<SensorInfo>,
    sensor_count: usize,
}

#[derive(Serialize)]
struct SimulationInfo {
    step_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<u64>,
    real_time: bool,
}

#[derive(Serialize)]
struct SensorInfo {
    name: String,
    kind: String,
    category: String,
    rate_hz: f64,
    period_s: f64,
    enabled: bool,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading manifest info");

    if !args.config.exists() {
        anyhow::bail!("Manifest file not found: {}", args.config.display());
    }

    let manifest = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load manifest from {}", args.config.display()))?;

    if args.json {
        let info = build_manifest_info(&manifest, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize manifest info")?;
        println!("{}", json);
    } else {
        print_manifest_info(&manifest, args);
    }

    Ok(())
}

fn build_manifest_info(manifest: &contracts::SimulationManifest, args: &InfoArgs) -> ManifestInfo {
    let sensors = if args.sensors {
        manifest
            .sensors
            .iter()
            .map(|s| SensorInfo {
                name: s.name.clone(),
                kind: format!("{:?}", s.kind),
                category: s.kind.category().as_str().to_string(),
                rate_hz: s.rate_hz,
                period_s: s.period_s(),
                enabled: s.enabled,
            })
            .collect()
    } else {
        Vec::new()
    };

    ManifestInfo {
        version: format!("{:?}", manifest.version),
        simulation: SimulationInfo {
            step_s: manifest.simulation.step_s,
            steps: manifest.simulation.steps,
            real_time: manifest.simulation.real_time,
        },
        sensors,
        sensor_count: manifest.sensors.len(),
    }
}

fn print_manifest_info(manifest: &contracts::SimulationManifest, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                Sim Sensors Manifest                           ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Simulation loop settings
    println!("⏱  Simulation");
    println!("   ├─ Version: {:?}", manifest.version);
    println!("   ├─ Step size: {}s", manifest.simulation.step_s);
    match manifest.simulation.steps {
        Some(steps) => println!("   ├─ Steps: {}", steps),
        None => println!("   ├─ Steps: until interrupted"),
    }
    println!(
        "   └─ Pacing: {}",
        if manifest.simulation.real_time {
            "real-time"
        } else {
            "as fast as possible"
        }
    );

    // Sensors
    println!("\n📡 Sensors ({})", manifest.sensors.len());
    for (i, sensor) in manifest.sensors.iter().enumerate() {
        let is_last = i == manifest.sensors.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };

        if args.sensors {
            let rate = if sensor.rate_hz > 0.0 {
                format!("{} Hz", sensor.rate_hz)
            } else {
                "every step".to_string()
            };
            let state = if sensor.enabled { "" } else { ", disabled" };
            println!(
                "   {} {} ({:?}, {}, {}{})",
                prefix,
                sensor.name,
                sensor.kind,
                sensor.kind.category().as_str(),
                rate,
                state
            );
        } else {
            println!("   {} {} ({:?})", prefix, sensor.name, sensor.kind);
        }
    }

    println!();
}
