//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DeidConfig, ValidatorProvider};
use super::secret::secret_string;
use crate::deid::models::EntityType;
use crate::domain::errors::DeidError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into DeidConfig
/// 4. Applies environment variable overrides (THAIDEID_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`DeidError::Configuration`] if the file is missing or unreadable,
/// a referenced variable is unset, the TOML does not parse or validation
/// fails.
///
/// # Examples
///
/// ```no_run
/// use thaideid::config::loader::load_config;
///
/// let config = load_config("thaideid.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DeidConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DeidError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        DeidError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: DeidConfig = toml::from_str(&contents)
        .map_err(|e| DeidError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    finish(config)
}

/// Like [`load_config`], but a missing file yields the defaults
///
/// Environment overrides and validation still apply.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<DeidConfig> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "No configuration file, using defaults");
        finish(DeidConfig::default())
    }
}

fn finish(mut config: DeidConfig) -> Result<DeidConfig> {
    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        DeidError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

fn env_var_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid placeholder regex"))
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_placeholder();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(DeidError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        DeidError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

/// Applies environment variable overrides using THAIDEID_* prefix
///
/// Environment variables follow the pattern: THAIDEID_<SECTION>_<KEY>
/// For example: THAIDEID_VALIDATOR_ENDPOINT, THAIDEID_PIPELINE_DEFAULT_METHOD
fn apply_env_overrides(config: &mut DeidConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("THAIDEID_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Pipeline overrides
    if let Some(val) = var("THAIDEID_PIPELINE_DEFAULT_METHOD") {
        config.pipeline.default_method = val.trim().to_lowercase();
    }
    if let Some(val) = var("THAIDEID_PIPELINE_ENABLED_ENTITY_TYPES") {
        config.pipeline.enabled_entity_types = val
            .split(',')
            .filter(|t| !t.trim().is_empty())
            .map(EntityType::parse)
            .collect();
    }
    if let Some(val) = var("THAIDEID_PIPELINE_PATTERN_LIBRARY") {
        config.pipeline.pattern_library = Some(PathBuf::from(val));
    }
    if let Some(val) = var("THAIDEID_PIPELINE_LEXICON") {
        config.pipeline.lexicon = Some(PathBuf::from(val));
    }

    // Validator overrides
    if let Some(val) = var("THAIDEID_VALIDATOR_ENABLED") {
        config.validator.enabled = parse_env("THAIDEID_VALIDATOR_ENABLED", &val)?;
    }
    if let Some(val) = var("THAIDEID_VALIDATOR_PROVIDER") {
        config.validator.provider = ValidatorProvider::from_str(&val)
            .map_err(DeidError::Configuration)?;
    }
    if let Some(val) = var("THAIDEID_VALIDATOR_ENDPOINT") {
        config.validator.endpoint = Some(val);
    }
    if let Some(val) = var("THAIDEID_VALIDATOR_API_KEY") {
        config.validator.api_key = Some(secret_string(val));
    }
    if let Some(val) = var("THAIDEID_VALIDATOR_MODEL") {
        config.validator.model = val;
    }
    if let Some(val) = var("THAIDEID_VALIDATOR_TIMEOUT_SECONDS") {
        config.validator.timeout_seconds = parse_env("THAIDEID_VALIDATOR_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = var("THAIDEID_VALIDATOR_TEMPERATURE") {
        config.validator.temperature = parse_env("THAIDEID_VALIDATOR_TEMPERATURE", &val)?;
    }
    if let Some(val) = var("THAIDEID_VALIDATOR_MAX_OUTPUT_TOKENS") {
        config.validator.max_output_tokens =
            parse_env("THAIDEID_VALIDATOR_MAX_OUTPUT_TOKENS", &val)?;
    }

    // Keyword store overrides
    if let Some(val) = var("THAIDEID_KEYWORDS_PATH") {
        config.keywords.path = Some(PathBuf::from(val));
    }
    if let Some(val) = var("THAIDEID_KEYWORDS_OWNER") {
        config.keywords.owner = Some(val);
    }

    // Audit overrides
    if let Some(val) = var("THAIDEID_AUDIT_ENABLED") {
        config.audit.enabled = parse_env("THAIDEID_AUDIT_ENABLED", &val)?;
    }
    if let Some(val) = var("THAIDEID_AUDIT_LOG_PATH") {
        config.audit.log_path = PathBuf::from(val);
    }
    if let Some(val) = var("THAIDEID_AUDIT_JSON_FORMAT") {
        config.audit.json_format = parse_env("THAIDEID_AUDIT_JSON_FORMAT", &val)?;
    }

    // Logging overrides
    if let Some(val) = var("THAIDEID_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("THAIDEID_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("THAIDEID_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = var("THAIDEID_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
