//! Read-only keyword store boundary
//!
//! Keyword CRUD belongs to whatever owns the store. The pipeline only lists
//! the keywords visible to the current caller and passes them through as the
//! request's mask list.

use crate::deid::models::MaskKeyword;
use crate::domain::{DeidError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Source of user-defined mask keywords
#[async_trait]
pub trait KeywordStore: Send + Sync {
    /// Keywords visible to `owner`
    ///
    /// `None` lists every keyword. A keyword without a `userId` is visible
    /// to every owner.
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::Keywords`] if the store cannot be read.
    async fn list(&self, owner: Option<&str>) -> Result<Vec<MaskKeyword>>;
}

fn visible_to(keyword: &MaskKeyword, owner: Option<&str>) -> bool {
    match (owner, keyword.user_id.as_deref()) {
        (Some(owner), Some(user_id)) => owner == user_id,
        _ => true,
    }
}

/// Fixed keyword list held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeywordStore {
    keywords: Vec<MaskKeyword>,
}

impl InMemoryKeywordStore {
    pub fn new(keywords: Vec<MaskKeyword>) -> Self {
        Self { keywords }
    }
}

#[async_trait]
impl KeywordStore for InMemoryKeywordStore {
    async fn list(&self, owner: Option<&str>) -> Result<Vec<MaskKeyword>> {
        Ok(self
            .keywords
            .iter()
            .filter(|k| visible_to(k, owner))
            .cloned()
            .collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonKeywordFile {
    List(Vec<MaskKeyword>),
    Wrapped { keywords: Vec<MaskKeyword> },
}

#[derive(Deserialize)]
struct TomlKeywordFile {
    #[serde(default)]
    keywords: Vec<MaskKeyword>,
}

/// Keyword file on disk, re-read on every call
///
/// `.toml` files hold `[[keywords]]` tables; anything else is read as JSON,
/// either a bare array or `{"keywords": [...]}`.
#[derive(Debug, Clone)]
pub struct FileKeywordStore {
    path: PathBuf,
}

impl FileKeywordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse keyword file content; `toml` selects the TOML layout
    pub fn parse(content: &str, toml: bool) -> Result<Vec<MaskKeyword>> {
        if toml {
            let file: TomlKeywordFile = toml::from_str(content)
                .map_err(|e| DeidError::Keywords(format!("invalid keyword TOML: {e}")))?;
            return Ok(file.keywords);
        }

        let file: JsonKeywordFile = serde_json::from_str(content)
            .map_err(|e| DeidError::Keywords(format!("invalid keyword JSON: {e}")))?;
        Ok(match file {
            JsonKeywordFile::List(keywords) | JsonKeywordFile::Wrapped { keywords } => keywords,
        })
    }
}

#[async_trait]
impl KeywordStore for FileKeywordStore {
    async fn list(&self, owner: Option<&str>) -> Result<Vec<MaskKeyword>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DeidError::Keywords(format!(
                "Failed to read keyword file {}: {e}",
                self.path.display()
            ))
        })?;

        let is_toml = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let keywords: Vec<MaskKeyword> = Self::parse(&content, is_toml)?
            .into_iter()
            .filter(|k| visible_to(k, owner))
            .collect();

        tracing::debug!(count = keywords.len(), "Keywords loaded");
        Ok(keywords)
    }
}
