//! Process command implementation
//!
//! Runs one text through the pipeline and prints the response.

use super::{exit_code, read_text};
use crate::config::{load_config_or_default, DeidConfig};
use crate::deid::engine::DeidEngine;
use crate::deid::keywords::{FileKeywordStore, KeywordStore};
use crate::deid::models::{AnonymizationMethod, EntityType, MaskKeyword, ProcessRequest, ProcessResponse};
use crate::domain::Result;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Output format of the process command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full response as JSON
    Json,
    /// De-identified text only
    Text,
}

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Text to de-identify
    #[arg(short, long, conflicts_with = "input")]
    pub text: Option<String>,

    /// File holding the text to de-identify (stdin when neither is given)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Anonymization method (redact, mask, generalize, pseudonymize)
    #[arg(short, long)]
    pub method: Option<String>,

    /// Entity types to detect, comma separated
    #[arg(long, value_delimiter = ',')]
    pub types: Vec<String>,

    /// JSON or TOML keyword file, overrides [keywords].path
    #[arg(short, long)]
    pub keywords: Option<PathBuf>,

    /// Run the external validator after resolution
    #[arg(long)]
    pub validate: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

impl ProcessArgs {
    /// Execute the process command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config_or_default(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let text = match read_text(self.text.as_deref(), self.input.as_deref()).await {
            Ok(text) => text,
            Err(e) => {
                eprintln!("❌ {e:#}");
                return Ok(2);
            }
        };

        let request = match self.build_request(&config, text).await {
            Ok(request) => request,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code(&e));
            }
        };

        let response = match self.run(&config, &request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Processing failed");
                eprintln!("❌ {e}");
                return Ok(exit_code(&e));
            }
        };

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
            OutputFormat::Text => println!("{}", response.deidentified_text),
        }

        for warning in &response.warnings {
            eprintln!("⚠️  {warning}");
        }

        Ok(0)
    }

    async fn build_request(&self, config: &DeidConfig, text: String) -> Result<ProcessRequest> {
        let method = self
            .method
            .as_deref()
            .map(AnonymizationMethod::parse)
            .unwrap_or_else(|| config.pipeline.method());

        let types: Vec<EntityType> = if self.types.is_empty() {
            config.pipeline.enabled_entity_types.clone()
        } else {
            self.types.iter().map(|t| EntityType::parse(t)).collect()
        };

        Ok(ProcessRequest::new(text, method)
            .with_entity_types(types)
            .with_mask_list(self.load_keywords(config).await?))
    }

    async fn load_keywords(&self, config: &DeidConfig) -> Result<Vec<MaskKeyword>> {
        let Some(path) = self.keywords.as_ref().or(config.keywords.path.as_ref()) else {
            return Ok(Vec::new());
        };

        FileKeywordStore::new(path)
            .list(config.keywords.owner.as_deref())
            .await
    }

    async fn run(&self, config: &DeidConfig, request: &ProcessRequest) -> Result<ProcessResponse> {
        let engine = DeidEngine::from_config(config)?;

        if !self.validate {
            return engine.process(request);
        }

        if engine.active_validator().is_none() {
            tracing::info!("Validator disabled or not configured, running regex-only pipeline");
        }
        engine.process_with_validation(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args() -> ProcessArgs {
        ProcessArgs {
            text: None,
            input: None,
            method: None,
            types: Vec::new(),
            keywords: None,
            validate: false,
            output: OutputFormat::Json,
        }
    }

    #[tokio::test]
    async fn test_request_uses_config_defaults() {
        let mut config = DeidConfig::default();
        config.pipeline.default_method = "redact".to_string();
        config.pipeline.enabled_entity_types = vec![EntityType::Person];

        let request = args().build_request(&config, "x".to_string()).await.unwrap();
        assert_eq!(request.method, AnonymizationMethod::Redact);
        assert_eq!(request.enabled_entity_types, vec![EntityType::Person]);
        assert!(request.custom_mask_list.is_empty());
    }

    #[tokio::test]
    async fn test_flags_override_config() {
        let mut keywords = NamedTempFile::with_suffix(".json").unwrap();
        write!(keywords, r#"[{{"keyword":"Ward 7","entityType":"LOCATION"}}]"#).unwrap();

        let args = ProcessArgs {
            method: Some("pseudonymize".to_string()),
            types: vec!["person".to_string(), "location".to_string()],
            keywords: Some(keywords.path().to_path_buf()),
            ..args()
        };

        let request = args
            .build_request(&DeidConfig::default(), "x".to_string())
            .await
            .unwrap();
        assert_eq!(request.method, AnonymizationMethod::Pseudonymize);
        assert_eq!(
            request.enabled_entity_types,
            vec![EntityType::Person, EntityType::Location]
        );
        assert_eq!(request.custom_mask_list[0].keyword, "Ward 7");
    }

    #[tokio::test]
    async fn test_run_masks_text() {
        let request = ProcessRequest::new("Call 02-123-4567", AnonymizationMethod::Mask)
            .with_entity_types(vec![EntityType::Contact]);
        let response = args().run(&DeidConfig::default(), &request).await.unwrap();
        assert_eq!(response.deidentified_text, "Call [CONTACT]");
    }

    #[tokio::test]
    async fn test_empty_text_exit_code() {
        let args = ProcessArgs {
            text: Some("  ".to_string()),
            ..args()
        };
        let code = args.execute("nonexistent-thaideid.toml").await.unwrap();
        assert_eq!(code, 2);
    }
}
