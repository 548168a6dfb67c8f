//! Domain error types
//!
//! This module defines the error hierarchy for ThaiDeid.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main ThaiDeid error type
///
/// This is the primary error type used throughout the library. Only two
/// variants ever reach a pipeline caller: [`DeidError::InvalidInput`] for
/// structurally invalid requests and [`DeidError::Internal`] for a crashed
/// pipeline. Everything else is raised while building the engine.
#[derive(Debug, Error)]
pub enum DeidError {
    /// The request was rejected before entering the pipeline
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Pattern library or lexicon could not be loaded
    #[error("Pattern library error: {0}")]
    Pattern(String),

    /// External validator errors
    #[error("Validator error: {0}")]
    Validator(#[from] ValidatorError),

    /// Keyword store errors
    #[error("Keyword store error: {0}")]
    Keywords(String),

    /// Audit trail errors
    #[error("Audit error: {0}")]
    Audit(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Unexpected failure inside the pipeline
    #[error("Internal error: {0}")]
    Internal(String),
}

/// External validator errors
///
/// Raised at the validator boundary. The pipeline never surfaces these to its
/// caller; they are logged and the unvalidated candidates are used instead.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Validator is disabled or lacks an endpoint/credential
    #[error("Validator not configured: {0}")]
    NotConfigured(String),

    /// Transport-level failure
    #[error("Failed to reach validator: {0}")]
    ConnectionFailed(String),

    /// The validator did not answer within the configured bound
    #[error("Validator timed out after {0} seconds")]
    Timeout(u64),

    /// Non-success HTTP status
    #[error("Validator returned {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The payload did not contain a usable entity array
    #[error("Invalid validator response: {0}")]
    InvalidResponse(String),
}

impl DeidError {
    /// Whether the error was caused by the caller rather than the pipeline
    pub fn is_user_error(&self) -> bool {
        matches!(self, DeidError::InvalidInput(_) | DeidError::Configuration(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for DeidError {
    fn from(err: std::io::Error) -> Self {
        DeidError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for DeidError {
    fn from(err: serde_json::Error) -> Self {
        DeidError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for DeidError {
    fn from(err: toml::de::Error) -> Self {
        DeidError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from regex compile errors
impl From<regex::Error> for DeidError {
    fn from(err: regex::Error) -> Self {
        DeidError::Pattern(err.to_string())
    }
}
