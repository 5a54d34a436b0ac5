//! Manifest validation
//!
//! Validation rules:
//! - sensor names unique and non-empty
//! - rate_hz >= 0 and finite (0 means "every pass")
//! - step_s > 0 and finite
//! - camera image dimensions > 0
//! - range finder max_range_m > 0

use std::collections::HashSet;

use contracts::{ScheduleError, SensorKind, SimulationManifest};

/// Validate a SimulationManifest
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(manifest: &SimulationManifest) -> Result<(), ScheduleError> {
    validate_simulation(manifest)?;
    validate_sensor_names(manifest)?;
    validate_sensor_rates(manifest)?;
    validate_sensor_params(manifest)?;
    Ok(())
}

/// Validate simulation loop settings
fn validate_simulation(manifest: &SimulationManifest) -> Result<(), ScheduleError> {
    let step = manifest.simulation.step_s;
    if !step.is_finite() || step <= 0.0 {
        return Err(ScheduleError::config_validation(
            "simulation.step_s",
            format!("step_s must be a finite value > 0, got {step}"),
        ));
    }
    Ok(())
}

/// Validate sensor name uniqueness
fn validate_sensor_names(manifest: &SimulationManifest) -> Result<(), ScheduleError> {
    let mut seen = HashSet::new();
    for (idx, sensor) in manifest.sensors.iter().enumerate() {
        if sensor.name.is_empty() {
            return Err(ScheduleError::config_validation(
                format!("sensors[{idx}].name"),
                "sensor name cannot be empty",
            ));
        }
        if !seen.insert(&sensor.name) {
            return Err(ScheduleError::config_validation(
                format!("sensors[name={}]", sensor.name),
                "duplicate sensor name",
            ));
        }
    }
    Ok(())
}

/// Validate sensor update rates
fn validate_sensor_rates(manifest: &SimulationManifest) -> Result<(), ScheduleError> {
    for sensor in &manifest.sensors {
        if !sensor.rate_hz.is_finite() || sensor.rate_hz < 0.0 {
            return Err(ScheduleError::config_validation(
                format!("sensors[{}].rate_hz", sensor.name),
                format!("rate_hz must be a finite value >= 0, got {}", sensor.rate_hz),
            ));
        }
    }
    Ok(())
}

/// Validate kind-specific sensor parameters
fn validate_sensor_params(manifest: &SimulationManifest) -> Result<(), ScheduleError> {
    for sensor in &manifest.sensors {
        match sensor.kind {
            SensorKind::Camera | SensorKind::DepthCamera => {
                if sensor.image_width == 0 || sensor.image_height == 0 {
                    return Err(ScheduleError::config_validation(
                        format!("sensors[{}].image_width/image_height", sensor.name),
                        format!(
                            "image dimensions must be > 0, got {}x{}",
                            sensor.image_width, sensor.image_height
                        ),
                    ));
                }
            }
            SensorKind::RangeFinder => {
                if !sensor.max_range_m.is_finite() || sensor.max_range_m <= 0.0 {
                    return Err(ScheduleError::config_validation(
                        format!("sensors[{}].max_range_m", sensor.name),
                        format!("max_range_m must be > 0, got {}", sensor.max_range_m),
                    ));
                }
            }
            SensorKind::Imu | SensorKind::Contact => {}
        }
    }
    Ok(())
}
