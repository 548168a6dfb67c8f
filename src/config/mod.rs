//! Configuration management for ThaiDeid.
//!
//! Configuration is a TOML file (default `thaideid.toml`) with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `THAIDEID_<SECTION>_<KEY>` overrides
//! - Defaults for every setting, so the file is optional
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [pipeline]
//! default_method = "mask"
//! enabled_entity_types = ["PERSON", "DATE", "LOCATION", "ID", "CONTACT", "ORGANIZATION"]
//!
//! [validator]
//! enabled = true
//! provider = "gemini"
//! api_key = "${GEMINI_API_KEY}"
//! timeout_seconds = 30
//!
//! [audit]
//! enabled = true
//! log_path = "./audit/thaideid-audit.log"
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use thaideid::config::load_config_or_default;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config_or_default("thaideid.toml")?;
//! println!("Default method: {}", config.pipeline.default_method);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApplicationConfig, AuditConfig, DeidConfig, KeywordsConfig, LoggingConfig, PipelineConfig,
    ValidatorConfig, ValidatorProvider,
};
pub use secret::{secret_string, SecretString, SecretValue};
