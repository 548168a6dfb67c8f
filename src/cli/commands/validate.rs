//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the ThaiDeid configuration file.

use crate::config::{load_config, DeidConfig};
use crate::deid::engine::DeidEngine;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        // Compiles pattern and lexicon overrides, builds the validator client
        if let Err(e) = DeidEngine::from_config(&config) {
            println!("❌ Pipeline could not be built");
            println!("   Error: {e}");
            return Ok(2);
        }
        println!("✅ Pattern library and lexicon loaded");

        println!();
        for line in summary(&config) {
            println!("{line}");
        }
        println!();
        Ok(0)
    }
}

fn summary(config: &DeidConfig) -> Vec<String> {
    let types: Vec<&str> = config
        .pipeline
        .enabled_entity_types
        .iter()
        .map(|t| t.label())
        .collect();

    let mut lines = vec![
        "Configuration Summary:".to_string(),
        format!("  Log Level: {}", config.application.log_level),
        format!("  Default Method: {}", config.pipeline.default_method),
        format!("  Entity Types: {}", types.join(", ")),
        format!(
            "  Pattern Library: {}",
            config
                .pipeline
                .pattern_library
                .as_ref()
                .map_or("embedded".to_string(), |p| p.display().to_string())
        ),
        format!(
            "  Lexicon: {}",
            config
                .pipeline
                .lexicon
                .as_ref()
                .map_or("embedded".to_string(), |p| p.display().to_string())
        ),
    ];

    if config.validator.enabled {
        lines.push(format!(
            "  Validator: {:?} ({}s timeout)",
            config.validator.provider, config.validator.timeout_seconds
        ));
        lines.push(format!(
            "  Validator Endpoint: {}",
            config.validator.endpoint.as_deref().unwrap_or("default")
        ));
        lines.push(format!(
            "  Validator API Key: {}",
            if config.validator.api_key.is_some() { "set" } else { "not set" }
        ));
    } else {
        lines.push("  Validator: disabled".to_string());
    }

    if config.audit.enabled {
        lines.push(format!("  Audit Log: {}", config.audit.log_path.display()));
    } else {
        lines.push("  Audit Log: disabled".to_string());
    }

    lines
}
