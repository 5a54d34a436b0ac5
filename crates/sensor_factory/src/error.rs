//! Factory error types

use thiserror::Error;

/// Sensor construction errors
#[derive(Debug, Error)]
pub enum FactoryError {
    /// A sensor spec carries parameters the kind cannot be built with
    #[error("invalid spec for sensor '{name}': {message}")]
    InvalidSpec { name: String, message: String },
}

impl FactoryError {
    pub fn invalid_spec(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            name: name.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FactoryError>;
