//! Input validation errors, raised before any store call.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field must be positive: {0}")]
    NotPositive(&'static str),

    #[error("Prescription needs at least one medicine")]
    NoMedicines,

    #[error("No patient selected")]
    NoPatientSelected,

    #[error("Unknown {field} value: {value}")]
    UnknownValue { field: &'static str, value: String },
}

pub type ValidationResult<T> = Result<T, ValidationError>;
