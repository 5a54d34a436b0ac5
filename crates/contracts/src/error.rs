//! Layered error definitions
//!
//! Categorized by source: scheduling surface (registry/lifecycle) vs.
//! sensor-internal update failures. Scheduling errors are returned
//! synchronously to the caller; sensor errors are isolated inside a
//! container pass and never propagate out of `run_one_step`.

use thiserror::Error;

/// Errors returned by the scheduling surface (add/remove/lookup/lifecycle).
#[derive(Debug, Error)]
pub enum ScheduleError {
    // ===== Registry Errors =====
    /// A sensor with the same name is already registered
    #[error("duplicate sensor name: '{name}'")]
    DuplicateName { name: String },

    /// Lookup or removal of an unknown sensor
    #[error("sensor not found: {what}")]
    NotFound { what: String },

    // ===== Lifecycle Errors =====
    /// Operation attempted in a state that does not permit it
    #[error("invalid state for {operation}: manager is {state}")]
    InvalidState {
        state: &'static str,
        operation: &'static str,
    },

    /// A container worker's command channel is closed (worker exited)
    #[error("{container} container is no longer running")]
    ContainerClosed { container: &'static str },

    /// A container worker did not join within the shutdown deadline
    #[error("{container} container failed to stop within {timeout_ms}ms")]
    ShutdownTimeout {
        container: &'static str,
        timeout_ms: u64,
    },

    // ===== Configuration Errors =====
    /// Manifest parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Manifest validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScheduleError {
    /// Create a duplicate-name error
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Create a not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create an invalid-state error
    pub fn invalid_state(state: &'static str, operation: &'static str) -> Self {
        Self::InvalidState { state, operation }
    }

    /// Create a configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors produced inside a sensor's `update` call.
///
/// These never halt a pass: the owning container logs them tagged with the
/// sensor id and continues with the next sensor.
#[derive(Debug, Error)]
pub enum SensorError {
    /// Measurement acquisition failed (e.g. simulated hardware fault)
    #[error("measurement failed: {message}")]
    Measurement { message: String },

    /// Rendering-dependent sensor could not read the scene
    #[error("render readback failed: {message}")]
    Render { message: String },

    /// IO error inside the sensor
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SensorError {
    /// Create a measurement error
    pub fn measurement(message: impl Into<String>) -> Self {
        Self::Measurement {
            message: message.into(),
        }
    }

    /// Create a render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }
}
