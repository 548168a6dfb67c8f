//! Logging and observability
//!
//! Entity text is PHI and never appears in log fields. Macros below log
//! offsets, types, counts and request ids only.
//!
//! # Example
//!
//! ```no_run
//! use thaideid::logging::init_logging;
//! use thaideid::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log a pipeline state transition
///
/// # Example
///
/// ```no_run
/// use thaideid::log_stage_transition;
///
/// log_stage_transition!("5f0c", "Received", "LanguageDetected");
/// ```
#[macro_export]
macro_rules! log_stage_transition {
    ($request_id:expr, $from:expr, $to:expr) => {
        tracing::debug!(
            request_id = %$request_id,
            from = %$from,
            to = %$to,
            "Pipeline stage transition"
        );
    };
}

/// Log a validator failure that fell back to the unvalidated candidates
///
/// # Example
///
/// ```no_run
/// use thaideid::log_validator_fallback;
///
/// log_validator_fallback!("gemini", "connection refused", 4);
/// ```
#[macro_export]
macro_rules! log_validator_fallback {
    ($validator:expr, $error:expr, $candidates:expr) => {
        tracing::warn!(
            validator = $validator,
            error = %$error,
            candidates = $candidates,
            "Validator failed, using unvalidated candidates"
        );
    };
}

/// Log an entity whose recorded span does not match the text
///
/// # Example
///
/// ```no_run
/// use thaideid::log_position_drift;
///
/// log_position_drift!("PERSON", 10, 15, Some((22usize, 27usize)));
/// ```
#[macro_export]
macro_rules! log_position_drift {
    ($entity_type:expr, $start:expr, $end:expr, $recovered:expr) => {
        match $recovered {
            Some((new_start, new_end)) => tracing::warn!(
                entity_type = %$entity_type,
                start = $start,
                end = $end,
                recovered_start = new_start,
                recovered_end = new_end,
                "Entity position drift recovered by first occurrence"
            ),
            None => tracing::warn!(
                entity_type = %$entity_type,
                start = $start,
                end = $end,
                "Entity position drift, span left unmasked"
            ),
        }
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use thaideid::log_error_with_context;
/// use thaideid::domain::DeidError;
///
/// let error = DeidError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
