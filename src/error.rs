//! Error types for the wagecast crate

use thiserror::Error;

/// Result type alias for wagecast operations
pub type Result<T> = std::result::Result<T, WagecastError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum WagecastError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Schema mismatch: expected {expected}, got {actual}")]
    SchemaError { expected: String, actual: String },

    #[error("Numerical error: {0}")]
    NumericalError(String),

    #[error("Model archive version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },
}

impl From<csv::Error> for WagecastError {
    fn from(err: csv::Error) -> Self {
        WagecastError::DataError(err.to_string())
    }
}

impl From<bincode::Error> for WagecastError {
    fn from(err: bincode::Error) -> Self {
        WagecastError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for WagecastError {
    fn from(err: ndarray::ShapeError) -> Self {
        WagecastError::SchemaError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
