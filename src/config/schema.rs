//! Configuration schema types

use crate::config::SecretString;
use crate::deid::models::{default_enabled_entity_types, AnonymizationMethod, EntityType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Anonymization method names accepted in configuration
pub const METHODS: [&str; 4] = ["redact", "mask", "generalize", "pseudonymize"];

/// Root configuration, one field per TOML section
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeidConfig {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub validator: ValidatorConfig,

    #[serde(default)]
    pub keywords: KeywordsConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DeidConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.pipeline.validate()?;
        self.validator.validate()?;
        self.audit.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Pipeline defaults and pattern data overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Method used when a request does not name one
    #[serde(default = "default_method")]
    pub default_method: String,

    /// Types detected when a request does not list any
    #[serde(default = "default_enabled_entity_types")]
    pub enabled_entity_types: Vec<EntityType>,

    /// TOML regex families replacing the embedded library
    #[serde(default)]
    pub pattern_library: Option<PathBuf>,

    /// TOML word lists replacing the embedded lexicon
    #[serde(default)]
    pub lexicon: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn method(&self) -> AnonymizationMethod {
        AnonymizationMethod::parse(&self.default_method)
    }

    fn validate(&self) -> Result<(), String> {
        if !METHODS.contains(&self.default_method.as_str()) {
            return Err(format!(
                "Invalid pipeline.default_method '{}'. Must be one of: {}",
                self.default_method,
                METHODS.join(", ")
            ));
        }

        if self.enabled_entity_types.is_empty() {
            return Err("pipeline.enabled_entity_types cannot be empty".to_string());
        }

        if let Some(unknown) = self.enabled_entity_types.iter().find(|t| !t.is_built_in()) {
            return Err(format!(
                "Unknown entity type '{unknown}' in pipeline.enabled_entity_types"
            ));
        }

        for (key, path) in [
            ("pattern_library", &self.pattern_library),
            ("lexicon", &self.lexicon),
        ] {
            if let Some(path) = path {
                if !path.exists() {
                    return Err(format!(
                        "pipeline.{key} file not found: {}",
                        path.display()
                    ));
                }
            }
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_method: default_method(),
            enabled_entity_types: default_enabled_entity_types(),
            pattern_library: None,
            lexicon: None,
        }
    }
}

/// External validator implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorProvider {
    /// Validation service taking `{text, regexEntities, maskList}`
    #[default]
    Service,
    /// `generateContent` model endpoint
    Gemini,
}

impl std::str::FromStr for ValidatorProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "service" => Ok(ValidatorProvider::Service),
            "gemini" => Ok(ValidatorProvider::Gemini),
            other => Err(format!(
                "Invalid validator provider '{other}'. Must be one of: service, gemini"
            )),
        }
    }
}

/// External validator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Run the validation stage
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub provider: ValidatorProvider,

    /// Service URL, or API base for the gemini provider
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token for the service, API key for gemini
    #[serde(default)]
    pub api_key: Option<SecretString>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Upper bound on one validator call
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl ValidatorConfig {
    fn validate(&self) -> Result<(), String> {
        if self.timeout_seconds == 0 || self.timeout_seconds > 300 {
            return Err("validator.timeout_seconds must be between 1 and 300".to_string());
        }

        if !(0.0..=1.0).contains(&self.temperature) {
            return Err("validator.temperature must be between 0.0 and 1.0".to_string());
        }

        if self.max_output_tokens == 0 {
            return Err("validator.max_output_tokens must be > 0".to_string());
        }

        if let Some(ref endpoint) = self.endpoint {
            let url = url::Url::parse(endpoint)
                .map_err(|e| format!("Invalid validator.endpoint '{endpoint}': {e}"))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(format!(
                    "validator.endpoint must use http or https, got '{}'",
                    url.scheme()
                ));
            }
        }

        if self.model.trim().is_empty() {
            return Err("validator.model cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: ValidatorProvider::default(),
            endpoint: None,
            api_key: None,
            model: default_model(),
            timeout_seconds: default_timeout_seconds(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// Read-only keyword store location
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KeywordsConfig {
    /// JSON or TOML keyword file
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Only keywords owned by this user id (plus unowned ones) are used
    #[serde(default)]
    pub owner: Option<String>,
}

/// Audit trail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    #[serde(default = "default_true")]
    pub json_format: bool,
}

impl AuditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            return Err("audit.log_path cannot be empty when audit is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable the JSON file log
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for the rolling log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_method() -> String {
    "mask".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/thaideid-audit.log")
}

fn default_true() -> bool {
    true
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
