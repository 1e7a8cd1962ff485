//! Error taxonomies for the three pipeline stages.
//!
//! Each stage has its own error type and the stages never convert into one
//! another: a validation failure stops before generation, a generation failure
//! stops before delivery, and a delivery failure stays local to its target.

use thiserror::Error;

/// Schema build-time errors. All of them are user-correctable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field name cannot be empty (field #{0})")]
    EmptyFieldName(usize),

    #[error("Min cannot be greater than Max for \"{0}\"")]
    InvalidRange(String),

    #[error("Use either Regex OR Enum for \"{0}\", not both")]
    ConflictingStringConstraints(String),

    #[error("Invalid regex for \"{0}\"")]
    InvalidRegex(String),

    #[error("Enum cannot be empty for \"{0}\"")]
    EmptyEnum(String),

    #[error("Object \"{0}\" must have at least one nested field")]
    EmptyObject(String),

    #[error("Nested field name cannot be empty in object \"{0}\"")]
    EmptyNestedFieldName(String),

    #[error("Nested field in object \"{0}\" must be a primitive type")]
    UnsupportedNestedType(String),

    #[error("Array \"{0}\" only supports primitive item types")]
    UnsupportedItemType(String),

    #[error("Array length for \"{0}\" must be a positive integer")]
    InvalidArrayLength(String),

    #[error("Duplicate field name \"{0}\"")]
    DuplicateFieldName(String),

    #[error("Count must be a positive integer")]
    InvalidCount,
}

impl ValidationError {
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::EmptyFieldName(_) => "EmptyFieldName",
            ValidationError::InvalidRange(_) => "InvalidRange",
            ValidationError::ConflictingStringConstraints(_) => "ConflictingStringConstraints",
            ValidationError::InvalidRegex(_) => "InvalidRegex",
            ValidationError::EmptyEnum(_) => "EmptyEnum",
            ValidationError::EmptyObject(_) => "EmptyObject",
            ValidationError::EmptyNestedFieldName(_) => "EmptyNestedFieldName",
            ValidationError::UnsupportedNestedType(_) => "UnsupportedNestedType",
            ValidationError::UnsupportedItemType(_) => "UnsupportedItemType",
            ValidationError::InvalidArrayLength(_) => "InvalidArrayLength",
            ValidationError::DuplicateFieldName(_) => "DuplicateFieldName",
            ValidationError::InvalidCount => "InvalidCount",
        }
    }

    /// Name of the offending field, when the error is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::InvalidRange(f)
            | ValidationError::ConflictingStringConstraints(f)
            | ValidationError::InvalidRegex(f)
            | ValidationError::EmptyEnum(f)
            | ValidationError::EmptyObject(f)
            | ValidationError::EmptyNestedFieldName(f)
            | ValidationError::UnsupportedNestedType(f)
            | ValidationError::UnsupportedItemType(f)
            | ValidationError::InvalidArrayLength(f)
            | ValidationError::DuplicateFieldName(f) => Some(f),
            ValidationError::EmptyFieldName(_) | ValidationError::InvalidCount => None,
        }
    }
}

/// Failures of the round trip with the generator collaborator.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The collaborator finished but its output was not valid JSON.
    /// The raw output is kept for server-side diagnostics only.
    #[error("Generator output is not well-formed JSON: {reason}")]
    MalformedGeneratorOutput { raw: String, reason: String },

    /// The collaborator could not be started or talked to.
    #[error("Generator unavailable: {0}")]
    GeneratorUnavailable(String),

    /// Strict mode only: the collaborator produced no output at all.
    #[error("Generator produced no output")]
    EmptyGeneratorOutput,

    #[error("Generator did not finish within {0:?}")]
    Timeout(std::time::Duration),

    #[error("Failed to encode generation request: {0}")]
    Encode(#[from] serde_json::Error),
}

impl GenerationError {
    /// Label exposed to HTTP callers in place of any diagnostic detail.
    pub const LABEL: &'static str = "GenerationError";
}

/// Per-target delivery failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("target responded with HTTP {status}")]
    Rejected { status: u16 },
}

/// Failure raised by a [`crate::domain::GeneratorTransport`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to spawn generator '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("generator i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("generator task failed: {0}")]
    Task(String),
}
