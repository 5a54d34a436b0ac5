//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ManifestSummary>,
}

#[derive(Serialize)]
struct ManifestSummary {
    version: String,
    step_s: f64,
    steps: Option<u64>,
    sensor_count: usize,
    rendering_count: usize,
    general_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating manifest");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Manifest validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(manifest) => {
            let warnings = collect_warnings(&manifest);
            let rendering_count = manifest
                .sensors
                .iter()
                .filter(|s| s.kind.category() == contracts::SensorCategory::Rendering)
                .count();

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ManifestSummary {
                    version: format!("{:?}", manifest.version),
                    step_s: manifest.simulation.step_s,
                    steps: manifest.simulation.steps,
                    sensor_count: manifest.sensors.len(),
                    rendering_count,
                    general_count: manifest.sensors.len() - rendering_count,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect manifest warnings (non-fatal issues)
fn collect_warnings(manifest: &contracts::SimulationManifest) -> Vec<String> {
    let mut warnings = Vec::new();

    if manifest.sensors.is_empty() {
        warnings.push("No sensors configured - the scheduling loop will be idle".to_string());
    }

    let step_rate = 1.0 / manifest.simulation.step_s;
    for sensor in &manifest.sensors {
        if sensor.rate_hz == 0.0 {
            warnings.push(format!(
                "Sensor '{}' has rate 0 - it will update on every step",
                sensor.name
            ));
        } else if sensor.rate_hz > step_rate {
            warnings.push(format!(
                "Sensor '{}' rate {} Hz exceeds the step rate {:.1} Hz - effective rate is capped",
                sensor.name, sensor.rate_hz, step_rate
            ));
        }
    }

    if manifest.simulation.steps.is_none() {
        warnings.push("simulation.steps not set - the run continues until interrupted".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Manifest is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Step size: {}s", summary.step_s);
            match summary.steps {
                Some(steps) => println!("  Steps: {}", steps),
                None => println!("  Steps: until interrupted"),
            }
            println!("  Sensors: {}", summary.sensor_count);
            println!("  Rendering: {}", summary.rendering_count);
            println!("  General: {}", summary.general_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Manifest is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
