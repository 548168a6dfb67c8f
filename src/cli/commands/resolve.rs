//! Resolve command implementation
//!
//! Runs the resolver alone over a candidate entity file, for checking
//! detector or validator output against the merge and filter rules.

use crate::config::load_config_or_default;
use crate::deid::engine::DeidEngine;
use crate::deid::models::Entity;
use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// File holding the source text
    #[arg(short, long)]
    pub input: PathBuf,

    /// JSON array of candidate entities
    #[arg(short, long)]
    pub entities: PathBuf,
}

impl ResolveArgs {
    /// Execute the resolve command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config_or_default(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let (text, candidates) = match self.read_inputs().await {
            Ok(inputs) => inputs,
            Err(e) => {
                eprintln!("❌ {e:#}");
                return Ok(2);
            }
        };

        let engine = match DeidEngine::from_config(&config) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(super::exit_code(&e));
            }
        };

        let count = candidates.len();
        let resolved = engine.resolve_candidates(&text, candidates);
        tracing::info!(candidates = count, resolved = resolved.len(), "Candidates resolved");

        println!("{}", serde_json::to_string_pretty(&resolved)?);
        Ok(0)
    }

    async fn read_inputs(&self) -> anyhow::Result<(String, Vec<Entity>)> {
        let text = read_file(&self.input).await?;
        let raw = read_file(&self.entities).await?;
        let candidates = serde_json::from_str(&raw).with_context(|| {
            format!("{} is not a JSON entity array", self.entities.display())
        })?;
        Ok((text, candidates))
    }
}

async fn read_file(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}
