//! SensorRegistry - authoritative id/name index of active sensors
//!
//! Single source of truth for sensor existence and uniqueness. Sensor
//! objects are owned by their container worker; the registry holds only
//! non-owning `SensorRecord` metadata. Reads take the shared lock, writers
//! (register/unregister) take the exclusive lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use contracts::{ScheduleError, SensorCategory, SensorId, SensorRecord};
use metrics::gauge;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct RegistryInner {
    by_id: HashMap<SensorId, SensorRecord>,
    by_name: HashMap<String, SensorId>,
}

/// Id/name-indexed store of active sensors.
///
/// Any number of concurrent readers (lookups from scheduling or UI code)
/// may proceed together; writers are mutually exclusive with each other
/// and with readers.
#[derive(Default)]
pub struct SensorRegistry {
    inner: RwLock<RegistryInner>,
    next_id: AtomicU64,
}

impl SensorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sensor, allocating its id.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::DuplicateName`] when `name` is already
    /// registered; no state is mutated in that case.
    pub async fn register(
        &self,
        name: &str,
        category: SensorCategory,
        period_s: f64,
    ) -> Result<SensorRecord, ScheduleError> {
        let mut inner = self.inner.write().await;

        if inner.by_name.contains_key(name) {
            return Err(ScheduleError::duplicate_name(name));
        }

        let id = SensorId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let record = SensorRecord {
            id,
            name: name.to_string(),
            category,
            period_s,
        };

        inner.by_name.insert(name.to_string(), id);
        inner.by_id.insert(id, record.clone());
        gauge!("scheduler_sensors_registered").set(inner.by_id.len() as f64);

        debug!(
            sensor_id = %id,
            sensor = name,
            category = category.as_str(),
            period_s,
            "sensor registered"
        );

        Ok(record)
    }

    /// Remove a sensor's registration, returning its record.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] when `id` is unknown.
    pub async fn unregister(&self, id: SensorId) -> Result<SensorRecord, ScheduleError> {
        let mut inner = self.inner.write().await;

        let record = inner
            .by_id
            .remove(&id)
            .ok_or_else(|| ScheduleError::not_found(id.to_string()))?;
        inner.by_name.remove(&record.name);
        gauge!("scheduler_sensors_registered").set(inner.by_id.len() as f64);

        debug!(sensor_id = %id, sensor = %record.name, "sensor unregistered");

        Ok(record)
    }

    /// Look up a sensor's record by id.
    pub async fn get(&self, id: SensorId) -> Result<SensorRecord, ScheduleError> {
        self.inner
            .read()
            .await
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| ScheduleError::not_found(id.to_string()))
    }

    /// Resolve a sensor id from its unique name.
    pub async fn find_by_name(&self, name: &str) -> Result<SensorId, ScheduleError> {
        self.inner
            .read()
            .await
            .by_name
            .get(name)
            .copied()
            .ok_or_else(|| ScheduleError::not_found(format!("'{name}'")))
    }

    /// Number of registered sensors.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    /// True when no sensors are registered.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.by_id.is_empty()
    }

    /// Drop every registration. Used while finalizing the manager.
    pub(crate) async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.by_id.clear();
        inner.by_name.clear();
        gauge!("scheduler_sensors_registered").set(0.0);
    }
}
