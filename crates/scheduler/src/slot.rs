//! SensorSlot - per-sensor scheduling bookkeeping
//!
//! A slot owns its sensor plus the state the due check needs: the last
//! successful update's sim time (initially "never") and the enabled flag.

use contracts::{Sensor, SensorId};

pub(crate) struct SensorSlot {
    pub id: SensorId,
    pub sensor: Box<dyn Sensor>,
    /// Sim time of the last successful update; `None` until the first one.
    pub last_update: Option<f64>,
    pub enabled: bool,
}

impl SensorSlot {
    pub fn new(id: SensorId, sensor: Box<dyn Sensor>) -> Self {
        Self {
            id,
            sensor,
            last_update: None,
            enabled: true,
        }
    }

    /// Whether the sensor is due at sim time `now`.
    ///
    /// A sensor that has never updated is always due. Otherwise it is due
    /// when `now - last_update >= period`; a zero period therefore makes it
    /// due on every pass. `now` earlier than `last_update` (a rewind the
    /// container did not catch) is never due.
    pub fn is_due(&self, now: f64) -> bool {
        if !self.enabled {
            return false;
        }
        match self.last_update {
            None => true,
            Some(last) => now >= last && now - last >= self.sensor.update_period(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SensorCategory, SensorError};

    struct FixedPeriod(f64);

    impl Sensor for FixedPeriod {
        fn name(&self) -> &str {
            "fixed"
        }
        fn category(&self) -> SensorCategory {
            SensorCategory::General
        }
        fn update_period(&self) -> f64 {
            self.0
        }
        fn update(&mut self, _now: f64) -> Result<(), SensorError> {
            Ok(())
        }
    }

    fn slot(period: f64) -> SensorSlot {
        SensorSlot::new(SensorId::from_raw(1), Box::new(FixedPeriod(period)))
    }

    #[test]
    fn test_never_updated_is_due() {
        let s = slot(10.0);
        assert!(s.is_due(0.0));
    }

    #[test]
    fn test_due_only_after_period_elapses() {
        let mut s = slot(0.1);
        s.last_update = Some(0.0);
        assert!(!s.is_due(0.05));
        assert!(s.is_due(0.1));
        assert!(s.is_due(0.15));
    }

    #[test]
    fn test_zero_period_always_due() {
        let mut s = slot(0.0);
        s.last_update = Some(0.2);
        assert!(s.is_due(0.2));
        assert!(s.is_due(0.20001));
    }

    #[test]
    fn test_disabled_never_due() {
        let mut s = slot(0.0);
        s.enabled = false;
        assert!(!s.is_due(1.0));
    }

    #[test]
    fn test_rewound_time_not_due() {
        let mut s = slot(0.1);
        s.last_update = Some(1.0);
        assert!(!s.is_due(0.5));
    }
}
