//! # Sensor Factory
//!
//! Builds boxed `Sensor` implementations from manifest entries.
//!
//! # Example
//!
//! ```
//! use contracts::{SensorKind, SensorSpec};
//! use sensor_factory::build_sensor;
//!
//! let spec = SensorSpec {
//!     name: "front_camera".to_string(),
//!     kind: SensorKind::Camera,
//!     rate_hz: 20.0,
//!     enabled: true,
//!     image_width: 320,
//!     image_height: 240,
//!     max_range_m: 10.0,
//! };
//! let sensor = build_sensor(&spec).unwrap();
//! assert_eq!(sensor.name(), "front_camera");
//! ```

mod error;
mod sensors;

pub use error::{FactoryError, Result};
pub use sensors::{
    CameraSensor, ContactSensor, DepthCameraSensor, ImuReading, ImuSensor, RangeFinderSensor,
};

use contracts::{Sensor, SensorKind, SensorSpec, SimulationManifest};
use tracing::{debug, instrument};

/// Build one sensor from its manifest entry.
pub fn build_sensor(spec: &SensorSpec) -> Result<Box<dyn Sensor>> {
    let period = spec.period_s();

    let sensor: Box<dyn Sensor> = match spec.kind {
        SensorKind::Camera => {
            check_image_dims(spec)?;
            Box::new(CameraSensor::new(
                spec.name.clone(),
                period,
                spec.image_width,
                spec.image_height,
            ))
        }
        SensorKind::DepthCamera => {
            check_image_dims(spec)?;
            Box::new(DepthCameraSensor::new(
                spec.name.clone(),
                period,
                spec.image_width,
                spec.image_height,
            ))
        }
        SensorKind::RangeFinder => {
            if !spec.max_range_m.is_finite() || spec.max_range_m <= 0.0 {
                return Err(FactoryError::invalid_spec(
                    &spec.name,
                    format!("max_range_m must be > 0, got {}", spec.max_range_m),
                ));
            }
            Box::new(RangeFinderSensor::new(
                spec.name.clone(),
                period,
                spec.max_range_m,
            ))
        }
        SensorKind::Imu => Box::new(ImuSensor::new(spec.name.clone(), period)),
        SensorKind::Contact => Box::new(ContactSensor::new(spec.name.clone(), period)),
    };

    debug!(
        name = %spec.name,
        kind = ?spec.kind,
        category = sensor.category().as_str(),
        period_s = period,
        "sensor built"
    );

    Ok(sensor)
}

/// Build the full sensor roster of a manifest, in manifest order.
#[instrument(name = "sensor_factory_build_all", skip(manifest), fields(count = manifest.sensors.len()))]
pub fn build_all(manifest: &SimulationManifest) -> Result<Vec<Box<dyn Sensor>>> {
    manifest.sensors.iter().map(build_sensor).collect()
}

fn check_image_dims(spec: &SensorSpec) -> Result<()> {
    if spec.image_width == 0 || spec.image_height == 0 {
        return Err(FactoryError::invalid_spec(
            &spec.name,
            format!(
                "image dimensions must be > 0, got {}x{}",
                spec.image_width, spec.image_height
            ),
        ));
    }
    Ok(())
}
