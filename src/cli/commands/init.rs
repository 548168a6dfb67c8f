//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "thaideid.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing ThaiDeid configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. To use the validator, set GEMINI_API_KEY in .env and enable [validator]");
                println!("  3. Validate configuration: thaideid validate-config");
                println!("  4. De-identify: thaideid process --input note.txt --output text");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }
}

/// Commented sample configuration
pub fn sample_config() -> &'static str {
    r#"# ThaiDeid Configuration File
# Thai/English medical text de-identification

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Pipeline
# ============================================================================
[pipeline]
# Method used when a request names none: redact | mask | generalize | pseudonymize
default_method = "mask"

# Entity types detected when a request lists none
enabled_entity_types = ["PERSON", "DATE", "LOCATION", "ID", "CONTACT", "ORGANIZATION"]

# Optional replacements for the embedded pattern tables
# pattern_library = "patterns/deid_patterns.toml"
# lexicon = "patterns/lexicon.toml"

# ============================================================================
# External Validator
# ============================================================================
[validator]
# Skipped entirely while disabled
enabled = false

# service: POST {text, regexEntities, maskList} to endpoint
# gemini:  generateContent call, endpoint defaults to the public API
provider = "gemini"
# endpoint = "https://validator.example.com/validate"
# api_key = "${GEMINI_API_KEY}"
model = "gemini-2.0-flash-exp"

# Upper bound on one validator call (1-300)
timeout_seconds = 30
temperature = 0.1
max_output_tokens = 2048

# ============================================================================
# Keyword Store
# ============================================================================
[keywords]
# JSON array or TOML [[keywords]] file of {keyword, entityType, userId}
# path = "keywords.json"
# owner = "user-42"

# ============================================================================
# Audit Trail
# ============================================================================
[audit]
# One line per request; entity values are stored as SHA-256 only
enabled = false
log_path = "./audit/thaideid-audit.log"
json_format = true

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable JSON file logging in addition to the console
local_enabled = false
local_path = "./logs"

# Log rotation (daily or hourly)
local_rotation = "daily"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeidConfig;
    use tempfile::tempdir;

    #[test]
    fn test_sample_config_parses_and_validates() {
        let config: DeidConfig = toml::from_str(sample_config()).unwrap();
        assert!(config.validate().is_ok());
        assert!(!config.validator.enabled);
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("thaideid.toml");
        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            force: false,
        };

        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(output.exists());
        assert_eq!(args.execute().await.unwrap(), 2);

        let forced = InitArgs { force: true, ..args };
        assert_eq!(forced.execute().await.unwrap(), 0);
    }
}
