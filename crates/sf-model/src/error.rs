//! Error types for the intersection process model.

use sf_core::CoreError;
use thiserror::Error;

/// Result type for process model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors reported synchronously by the process model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// A vector argument does not have one entry per segment.
    #[error("Invalid dimension for {what}: expected {expected}, got {got}")]
    InvalidDimension {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// Negative density supplied where a physical state is required.
    #[error("Invalid state: {what}[{index}] = {value} is negative")]
    InvalidState {
        what: &'static str,
        index: usize,
        value: f64,
    },

    /// Control split outside the unit interval.
    #[error("Invalid control: split {value} is outside [0, 1]")]
    InvalidControl { value: f64 },

    /// Parameter set failed validation.
    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: &'static str },

    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },
}

impl From<CoreError> for ModelError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonFinite { what, value } => ModelError::NonFinite { what, value },
            CoreError::Length {
                what,
                expected,
                got,
            } => ModelError::InvalidDimension {
                what,
                expected,
                got,
            },
        }
    }
}
