//! Pattern library for PHI detection
//!
//! Regex families are declared in TOML (`patterns/deid_patterns.toml` is
//! embedded as the default library) and compiled once into a read-only
//! [`PatternRegistry`] shared by every request.

use crate::deid::models::EntityType;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Regex engine used for a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PatternEngine {
    /// `regex` crate, linear time
    #[default]
    Standard,
    /// `fancy-regex`, for look-around
    Fancy,
}

/// Pattern definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDefinition {
    /// Unique pattern name
    pub name: String,
    /// Entity type label
    pub entity_type: String,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Regex source
    pub regex: String,
    /// Engine used to compile `regex`
    #[serde(default)]
    pub engine: PatternEngine,
    /// Longest accepted match, in code points
    #[serde(default)]
    pub max_length: Option<usize>,
}

/// Compiled regex of either engine
#[derive(Debug, Clone)]
pub enum Matcher {
    Standard(regex::Regex),
    Fancy(fancy_regex::Regex),
}

impl Matcher {
    fn compile(engine: PatternEngine, source: &str) -> Result<Self> {
        Ok(match engine {
            PatternEngine::Standard => Matcher::Standard(regex::Regex::new(source)?),
            PatternEngine::Fancy => Matcher::Fancy(fancy_regex::Regex::new(source)?),
        })
    }

    /// Byte ranges of all non-overlapping matches
    pub fn find_spans(&self, text: &str) -> Vec<(usize, usize)> {
        match self {
            Matcher::Standard(re) => re.find_iter(text).map(|m| (m.start(), m.end())).collect(),
            Matcher::Fancy(re) => {
                let mut spans = Vec::new();
                for found in re.find_iter(text) {
                    match found {
                        Ok(m) => spans.push((m.start(), m.end())),
                        Err(e) => {
                            // Backtrack limit hit: keep what was found so far
                            tracing::debug!(error = %e, "Pattern evaluation aborted");
                            break;
                        }
                    }
                }
                spans
            }
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Standard(re) => re.is_match(text),
            Matcher::Fancy(re) => re.is_match(text).unwrap_or(false),
        }
    }
}

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Pattern name
    pub name: String,
    /// Entity type assigned to matches
    pub entity_type: EntityType,
    /// Confidence score
    pub confidence: f32,
    /// Longest accepted match, in code points
    pub max_length: Option<usize>,
    matcher: Matcher,
}

impl CompiledPattern {
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Byte ranges of all non-overlapping matches
    pub fn find_spans(&self, text: &str) -> Vec<(usize, usize)> {
        self.matcher.find_spans(text)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

/// Pattern library container
#[derive(Debug, Deserialize)]
struct PatternLibrary {
    patterns: Vec<PatternDefinition>,
}

/// Pattern registry for PHI detection
#[derive(Debug)]
pub struct PatternRegistry {
    patterns: Vec<CompiledPattern>,
    patterns_by_type: HashMap<EntityType, Vec<usize>>,
}

impl PatternRegistry {
    /// Create a new pattern registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read pattern library: {}",
                path.as_ref().display()
            )
        })?;

        Self::from_toml(&content)
    }

    /// Create a pattern registry from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: PatternLibrary =
            toml::from_str(content).context("Failed to parse pattern library TOML")?;

        let mut patterns = Vec::with_capacity(library.patterns.len());
        let mut patterns_by_type: HashMap<EntityType, Vec<usize>> = HashMap::new();

        for def in library.patterns {
            if def.entity_type.trim().is_empty() {
                anyhow::bail!("Pattern '{}' has an empty entity_type", def.name);
            }
            if !(0.0..=1.0).contains(&def.confidence) {
                anyhow::bail!(
                    "Pattern '{}' confidence {} is outside 0.0 - 1.0",
                    def.name,
                    def.confidence
                );
            }

            let matcher = Matcher::compile(def.engine, &def.regex)
                .with_context(|| format!("Invalid regex in pattern '{}'", def.name))?;
            let entity_type = EntityType::parse(&def.entity_type);

            patterns_by_type
                .entry(entity_type.clone())
                .or_default()
                .push(patterns.len());
            patterns.push(CompiledPattern {
                name: def.name,
                entity_type,
                confidence: def.confidence,
                max_length: def.max_length,
                matcher,
            });
        }

        tracing::debug!(patterns = patterns.len(), "Pattern library compiled");

        Ok(Self {
            patterns,
            patterns_by_type,
        })
    }

    /// Create a default pattern registry with built-in patterns
    pub fn default_patterns() -> Result<Self> {
        let default_toml = include_str!("../../../../patterns/deid_patterns.toml");
        Self::from_toml(default_toml)
    }

    /// Get all patterns
    pub fn all_patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Get patterns for a specific entity type, in library order
    pub fn patterns_for_type(&self, entity_type: &EntityType) -> Vec<&CompiledPattern> {
        self.patterns_by_type
            .get(entity_type)
            .map(|indices| indices.iter().map(|&i| &self.patterns[i]).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
