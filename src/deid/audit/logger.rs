//! Append-only audit logger

use crate::deid::models::{AnonymizationMethod, Entity, Language};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use uuid::Uuid;

/// Summary of one pipeline run, handed to the logger by the engine
#[derive(Debug)]
pub struct AuditRecord<'a> {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub method: AnonymizationMethod,
    pub language: Language,
    pub validated: bool,
    pub processing_time_ms: u64,
    pub entities: &'a [Entity],
}

#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    request_id: String,
    method: String,
    language: String,
    total_entities: usize,
    validated: bool,
    processing_time_ms: u64,
    entities: Vec<AuditEntity>,
}

/// Audit entity entry (with hashed text)
#[derive(Debug, Serialize)]
struct AuditEntity {
    #[serde(rename = "type")]
    entity_type: String,
    start: usize,
    end: usize,
    confidence: f32,
    source: &'static str,
    /// SHA-256 of the entity text, never the text itself
    value_hash: String,
}

pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    /// Logger that records nothing
    pub fn disabled() -> Self {
        Self {
            log_path: PathBuf::new(),
            json_format: true,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append one run to the audit log
    pub fn log_run(&self, record: &AuditRecord<'_>) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let entry = AuditLogEntry {
            timestamp: record.timestamp.to_rfc3339(),
            request_id: record.request_id.to_string(),
            method: record.method.to_string(),
            language: record.language.to_string(),
            total_entities: record.entities.len(),
            validated: record.validated,
            processing_time_ms: record.processing_time_ms,
            entities: record.entities.iter().map(audit_entity).collect(),
        };

        self.write_entry(&entry)
    }

    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            writeln!(
                file,
                "[{}] Request: {} | Method: {} | Language: {} | Entities: {} | Validated: {} | Time: {}ms",
                entry.timestamp,
                entry.request_id,
                entry.method,
                entry.language,
                entry.total_entities,
                entry.validated,
                entry.processing_time_ms
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}

fn audit_entity(entity: &Entity) -> AuditEntity {
    AuditEntity {
        entity_type: entity.entity_type.to_string(),
        start: entity.start,
        end: entity.end,
        confidence: entity.confidence,
        source: entity.source.as_str(),
        value_hash: hash_value(&entity.text),
    }
}

/// Hex SHA-256 of `value`
pub fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deid::models::{DetectionSource, EntityType};
    use tempfile::tempdir;

    fn entities() -> Vec<Entity> {
        vec![Entity::new(
            EntityType::Contact,
            "somchai@example.com",
            5,
            24,
            0.8,
            DetectionSource::Pattern,
        )]
    }

    fn record(entities: &[Entity]) -> AuditRecord<'_> {
        AuditRecord {
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            method: AnonymizationMethod::Mask,
            language: Language::English,
            validated: false,
            processing_time_ms: 3,
            entities,
        }
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit").join("runs.log");

        let logger = AuditLogger::new(log_path, true, true).unwrap();
        assert!(logger.is_enabled());
        assert!(dir.path().join("audit").is_dir());
    }

    #[test]
    fn test_hash_value() {
        assert_eq!(hash_value("a"), hash_value("a"));
        assert_ne!(hash_value("a"), hash_value("b"));
        assert_eq!(hash_value("").len(), 64);
    }

    #[test]
    fn test_json_line_never_contains_plaintext() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), true, true).unwrap();
        let entities = entities();
        let record = record(&entities);

        logger.log_run(&record).unwrap();
        logger.log_run(&record).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(!content.contains("somchai@example.com"));

        let line: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(line["request_id"], record.request_id.to_string());
        assert_eq!(line["entities"][0]["type"], "CONTACT");
        assert_eq!(line["entities"][0]["value_hash"], hash_value("somchai@example.com"));
    }

    #[test]
    fn test_plain_format() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), false, true).unwrap();
        let entities = entities();

        logger.log_run(&record(&entities)).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("Method: mask | Language: English | Entities: 1"));
    }

    #[test]
    fn test_disabled_writes_nothing() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), true, false).unwrap();
        let entities = entities();

        logger.log_run(&record(&entities)).unwrap();
        assert!(!log_path.exists());
        assert!(AuditLogger::disabled().log_run(&record(&entities)).is_ok());
    }
}
