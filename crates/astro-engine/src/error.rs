//! Error types surfaced by the engine.
//!
//! Provider-level failures are reported as [`EphemerisError`]; everything a
//! caller of the engine sees is an [`EngineError`], whose [`ErrorKind`] lets
//! the caller branch without matching on payloads.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by an ephemeris provider.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EphemerisError {
    #[error("Ephemeris file not found at path: {path}. {message}")]
    FileNotFound { path: String, message: String },
    #[error("Invalid house system: {system}. Valid systems: {valid:?}")]
    InvalidHouseSystem { system: String, valid: Vec<String> },
    #[error("Unknown body: {body}")]
    UnknownBody { body: String },
    #[error("Failed to calculate position for {body} at JD {julian_day}: {message}")]
    CalculationFailed {
        body: String,
        julian_day: f64,
        message: String,
    },
    #[error("House calculation failed at JD {julian_day}: {message}")]
    HouseCalculationFailed { julian_day: f64, message: String },
    #[error("Provider returned a non-finite {field} at JD {julian_day}")]
    NonFinite { field: String, julian_day: f64 },
}

/// Coarse error discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    EphemerisUnavailable,
    ComputationInvariant,
    MissingScoreKey,
}

/// Errors returned by every engine operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid input ({field}): {message}")]
    InvalidInput { field: String, message: String },
    #[error("Ephemeris unavailable: {0}")]
    EphemerisUnavailable(#[from] EphemerisError),
    #[error("Computation invariant violated: {0}")]
    ComputationInvariant(String),
    #[error("Missing compatibility score keys: {missing:?}")]
    MissingScoreKey { missing: Vec<String> },
}

impl EngineError {
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        EngineError::ComputationInvariant(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidInput { .. } => ErrorKind::InvalidInput,
            EngineError::EphemerisUnavailable(_) => ErrorKind::EphemerisUnavailable,
            EngineError::ComputationInvariant(_) => ErrorKind::ComputationInvariant,
            EngineError::MissingScoreKey { .. } => ErrorKind::MissingScoreKey,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_discriminates_variants() {
        assert_eq!(
            EngineError::invalid_input("month", "13 is not a month").kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            EngineError::invariant("longitude is NaN").kind(),
            ErrorKind::ComputationInvariant
        );
        assert_eq!(
            EngineError::MissingScoreKey { missing: vec!["ego".to_string()] }.kind(),
            ErrorKind::MissingScoreKey
        );
    }

    #[test]
    fn test_ephemeris_error_converts() {
        let err: EngineError = EphemerisError::UnknownBody { body: "vulcan".to_string() }.into();
        assert_eq!(err.kind(), ErrorKind::EphemerisUnavailable);
        assert!(err.to_string().contains("vulcan"));
    }
}
