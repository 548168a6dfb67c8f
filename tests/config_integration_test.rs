//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables hold ENV_MUTEX so they do
//! not interfere with each other.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::NamedTempFile;
use thaideid::config::{load_config, load_config_or_default, ValidatorProvider};
use thaideid::deid::models::{AnonymizationMethod, EntityType, ProcessRequest};
use thaideid::deid::DeidEngine;
use thaideid::domain::DeidError;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("THAIDEID_APPLICATION_LOG_LEVEL");
    std::env::remove_var("THAIDEID_PIPELINE_DEFAULT_METHOD");
    std::env::remove_var("THAIDEID_VALIDATOR_ENABLED");
    std::env::remove_var("THAIDEID_VALIDATOR_PROVIDER");
    std::env::remove_var("THAIDEID_VALIDATOR_TIMEOUT_SECONDS");
    std::env::remove_var("TEST_THAIDEID_API_KEY");
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn lexicon_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("patterns/lexicon.toml")
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_THAIDEID_API_KEY", "gemini-secret");

    let file = write_config(
        r#"
[application]
log_level = "debug"

[pipeline]
default_method = "pseudonymize"
enabled_entity_types = ["PERSON", "CONTACT"]

[validator]
enabled = true
provider = "gemini"
api_key = "${TEST_THAIDEID_API_KEY}"
# api_key = "${NOT_SET_BUT_COMMENTED}"
model = "gemini-2.0-flash-exp"
timeout_seconds = 20
temperature = 0.2
max_output_tokens = 1024

[audit]
enabled = false
json_format = false

[logging]
local_enabled = false
local_path = "/tmp/thaideid"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.pipeline.default_method, "pseudonymize");
    assert_eq!(
        config.pipeline.enabled_entity_types,
        vec![EntityType::Person, EntityType::Contact]
    );
    assert_eq!(config.validator.provider, ValidatorProvider::Gemini);
    assert_eq!(config.validator.timeout_seconds, 20);
    assert_eq!(config.validator.max_output_tokens, 1024);
    assert!(config.validator.api_key.is_some());
    assert!(!config.audit.json_format);
    assert_eq!(config.logging.local_rotation, "hourly");

    cleanup_env_vars();
}

#[test]
fn test_env_overrides_win_over_file() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[pipeline]
default_method = "mask"
"#,
    );

    std::env::set_var("THAIDEID_PIPELINE_DEFAULT_METHOD", "Redact");
    std::env::set_var("THAIDEID_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("THAIDEID_VALIDATOR_TIMEOUT_SECONDS", "45");

    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(config.pipeline.default_method, "redact");
    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.validator.timeout_seconds, 45);

    cleanup_env_vars();
}

#[test]
fn test_invalid_override_is_configuration_error() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("THAIDEID_VALIDATOR_ENABLED", "sometimes");

    let file = write_config("[application]\nlog_level = \"info\"\n");
    let err = load_config(file.path()).unwrap_err();

    assert!(matches!(err, DeidError::Configuration(_)));
    assert!(err.to_string().contains("THAIDEID_VALIDATOR_ENABLED"));

    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_is_reported() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[validator]
api_key = "${TEST_THAIDEID_API_KEY}"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_THAIDEID_API_KEY"));
}

#[test]
fn test_out_of_range_values_fail_validation() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config(
        r#"
[validator]
timeout_seconds = 0
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("timeout_seconds"));
}

#[test]
fn test_missing_file_yields_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let config = load_config_or_default("/nonexistent/thaideid.toml").unwrap();
    assert_eq!(config.pipeline.default_method, "mask");
    assert!(!config.validator.enabled);

    assert!(load_config("/nonexistent/thaideid.toml").is_err());
}

#[test]
fn test_engine_uses_configured_pattern_library() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let mut patterns = NamedTempFile::with_suffix(".toml").unwrap();
    patterns
        .write_all(
            br#"
[[patterns]]
name = "ward_bed"
entity_type = "ID"
confidence = 0.8
regex = '\bWARD-\d+\b'
"#,
        )
        .unwrap();
    patterns.flush().unwrap();

    let file = write_config(&format!(
        "[pipeline]\npattern_library = '{}'\nlexicon = '{}'\n",
        patterns.path().display(),
        lexicon_path().display()
    ));

    let config = load_config(file.path()).expect("Failed to load config");
    let engine = DeidEngine::from_config(&config).expect("Failed to build engine");

    let request = ProcessRequest::new("moved to WARD-12 overnight", AnonymizationMethod::Mask)
        .with_entity_types(vec![EntityType::Id]);
    let response = engine.process(&request).unwrap();

    assert_eq!(response.deidentified_text, "moved to [ID] overnight");
}

#[test]
fn test_missing_pattern_library_fails_validation() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[pipeline]\npattern_library = '/nonexistent/patterns.toml'\n");
    assert!(load_config(file.path()).is_err());
}
