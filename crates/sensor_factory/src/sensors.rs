//! Built-in simulated sensors
//!
//! Synthetic implementations of the `Sensor` trait, one per manifest kind.
//! Each sensor holds its latest output; publishing it is left to consumers.

use bytes::Bytes;
use contracts::{Sensor, SensorCategory, SensorError};
use rand::Rng;
use tracing::trace;

/// RGB camera. Renders a synthetic frame into an owned buffer.
pub struct CameraSensor {
    name: String,
    period_s: f64,
    width: u32,
    height: u32,
    frame_count: u64,
    latest_frame: Option<Bytes>,
}

impl CameraSensor {
    pub fn new(name: String, period_s: f64, width: u32, height: u32) -> Self {
        Self {
            name,
            period_s,
            width,
            height,
            frame_count: 0,
            latest_frame: None,
        }
    }

    /// Most recent rendered frame (BGRA8), if any.
    pub fn latest_frame(&self) -> Option<&Bytes> {
        self.latest_frame.as_ref()
    }

    /// Number of frames rendered so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Sensor for CameraSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> SensorCategory {
        SensorCategory::Rendering
    }

    fn update_period(&self) -> f64 {
        self.period_s
    }

    fn update(&mut self, now: f64) -> Result<(), SensorError> {
        let size = (self.width * self.height * 4) as usize;
        // Scene brightness drifts with sim time so frames are distinguishable
        let shade = ((now * 64.0) as u64 % 256) as u8;
        self.latest_frame = Some(Bytes::from(vec![shade; size]));
        self.frame_count += 1;

        trace!(
            sensor = %self.name,
            frame = self.frame_count,
            sim_time = now,
            "camera frame rendered"
        );
        Ok(())
    }
}

/// Depth camera. Renders a synthetic f32 depth map.
pub struct DepthCameraSensor {
    name: String,
    period_s: f64,
    width: u32,
    height: u32,
    frame_count: u64,
    latest_depth: Option<Bytes>,
}

impl DepthCameraSensor {
    pub fn new(name: String, period_s: f64, width: u32, height: u32) -> Self {
        Self {
            name,
            period_s,
            width,
            height,
            frame_count: 0,
            latest_depth: None,
        }
    }

    /// Most recent depth map (little-endian f32 per pixel), if any.
    pub fn latest_depth(&self) -> Option<&Bytes> {
        self.latest_depth.as_ref()
    }
}

impl Sensor for DepthCameraSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> SensorCategory {
        SensorCategory::Rendering
    }

    fn update_period(&self) -> f64 {
        self.period_s
    }

    fn update(&mut self, now: f64) -> Result<(), SensorError> {
        let pixels = (self.width * self.height) as usize;
        let mut buf = Vec::with_capacity(pixels * 4);
        // Flat scene at a depth that oscillates slowly with sim time
        let depth = 5.0 + (now.sin() as f32);
        for _ in 0..pixels {
            buf.extend_from_slice(&depth.to_le_bytes());
        }
        self.latest_depth = Some(Bytes::from(buf));
        self.frame_count += 1;

        trace!(
            sensor = %self.name,
            frame = self.frame_count,
            sim_time = now,
            "depth frame rendered"
        );
        Ok(())
    }
}

/// Single-beam range finder with additive noise.
pub struct RangeFinderSensor {
    name: String,
    period_s: f64,
    max_range_m: f64,
    latest_range_m: Option<f64>,
}

impl RangeFinderSensor {
    pub fn new(name: String, period_s: f64, max_range_m: f64) -> Self {
        Self {
            name,
            period_s,
            max_range_m,
            latest_range_m: None,
        }
    }

    /// Most recent range reading in meters, if any.
    pub fn latest_range_m(&self) -> Option<f64> {
        self.latest_range_m
    }
}

impl Sensor for RangeFinderSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> SensorCategory {
        SensorCategory::General
    }

    fn update_period(&self) -> f64 {
        self.period_s
    }

    fn update(&mut self, now: f64) -> Result<(), SensorError> {
        let mut rng = rand::rng();
        // Target sweeps between 1m and max range, plus measurement noise
        let sweep = (now.sin() * 0.5 + 0.5) * (self.max_range_m - 1.0) + 1.0;
        let noise = rng.random_range(-0.02..0.02);
        let range = (sweep + noise).clamp(0.0, self.max_range_m);
        self.latest_range_m = Some(range);

        trace!(sensor = %self.name, range_m = range, sim_time = now, "range measured");
        Ok(())
    }
}

/// IMU reading: linear acceleration and angular velocity.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImuReading {
    pub accel: [f64; 3],
    pub gyro: [f64; 3],
}

/// Inertial measurement unit with gravity plus noise.
pub struct ImuSensor {
    name: String,
    period_s: f64,
    latest: Option<ImuReading>,
}

impl ImuSensor {
    pub fn new(name: String, period_s: f64) -> Self {
        Self {
            name,
            period_s,
            latest: None,
        }
    }

    /// Most recent IMU reading, if any.
    pub fn latest(&self) -> Option<ImuReading> {
        self.latest
    }
}

impl Sensor for ImuSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> SensorCategory {
        SensorCategory::General
    }

    fn update_period(&self) -> f64 {
        self.period_s
    }

    fn update(&mut self, now: f64) -> Result<(), SensorError> {
        let mut rng = rand::rng();
        let mut noise = [0.0; 6];
        for v in &mut noise {
            *v = rng.random_range(-0.005..0.005);
        }

        self.latest = Some(ImuReading {
            accel: [noise[0], noise[1], 9.81 + noise[2]],
            gyro: [noise[3], noise[4], noise[5]],
        });

        trace!(sensor = %self.name, sim_time = now, "imu sampled");
        Ok(())
    }
}

/// Contact/bumper sensor. Reports whether anything touches the collision body.
pub struct ContactSensor {
    name: String,
    period_s: f64,
    in_contact: bool,
}

impl ContactSensor {
    pub fn new(name: String, period_s: f64) -> Self {
        Self {
            name,
            period_s,
            in_contact: false,
        }
    }

    /// Whether the most recent update observed a contact.
    pub fn in_contact(&self) -> bool {
        self.in_contact
    }
}

impl Sensor for ContactSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> SensorCategory {
        SensorCategory::General
    }

    fn update_period(&self) -> f64 {
        self.period_s
    }

    fn update(&mut self, now: f64) -> Result<(), SensorError> {
        // Synthetic world: a contact event fires during a short window each
        // 10-second cycle
        self.in_contact = now.rem_euclid(10.0) < 0.2;

        trace!(sensor = %self.name, in_contact = self.in_contact, sim_time = now, "contact checked");
        Ok(())
    }
}
