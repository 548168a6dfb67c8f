//! Pipeline request and response models

use super::entity::{Entity, EntityType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Replacement policy applied to detected entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum AnonymizationMethod {
    /// Replace every entity with `[REDACTED]`
    Redact,
    /// Replace with the entity type label, `[PERSON]`
    #[default]
    Mask,
    /// Same output as mask
    Generalize,
    /// Replace with a per-call stable pseudonym, `[PERSON_k3x9qa]`
    Pseudonymize,
}

impl AnonymizationMethod {
    /// Parse a method name; anything unrecognised behaves like mask
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "redact" => AnonymizationMethod::Redact,
            "generalize" => AnonymizationMethod::Generalize,
            "pseudonymize" => AnonymizationMethod::Pseudonymize,
            _ => AnonymizationMethod::Mask,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnonymizationMethod::Redact => "redact",
            AnonymizationMethod::Mask => "mask",
            AnonymizationMethod::Generalize => "generalize",
            AnonymizationMethod::Pseudonymize => "pseudonymize",
        }
    }
}

impl From<String> for AnonymizationMethod {
    fn from(name: String) -> Self {
        AnonymizationMethod::parse(&name)
    }
}

impl From<AnonymizationMethod> for String {
    fn from(method: AnonymizationMethod) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for AnonymizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Script classification of the input text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "Thai")]
    Thai,
    #[serde(rename = "English")]
    English,
    #[serde(rename = "Mixed (Thai/English)")]
    Mixed,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Language {
    pub fn label(&self) -> &'static str {
        match self {
            Language::Thai => "Thai",
            Language::English => "English",
            Language::Mixed => "Mixed (Thai/English)",
            Language::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User-defined term bound to an entity type
///
/// Storage and ownership live outside the pipeline; the detector only reads
/// these per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskKeyword {
    /// Storage-assigned identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Raw literal, matched case-insensitively after escaping
    pub keyword: String,

    /// Category assigned to every match
    pub entity_type: EntityType,

    /// Owning account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl MaskKeyword {
    pub fn new(keyword: impl Into<String>, entity_type: impl Into<EntityType>) -> Self {
        Self {
            id: None,
            keyword: keyword.into(),
            entity_type: entity_type.into(),
            user_id: None,
        }
    }
}

/// Input to a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    /// Text to de-identify
    #[serde(default)]
    pub text: String,

    /// Replacement policy
    #[serde(default)]
    pub method: AnonymizationMethod,

    /// Categories to detect
    #[serde(default = "default_enabled_entity_types")]
    pub enabled_entity_types: Vec<EntityType>,

    /// User keywords, highest detection priority
    #[serde(default)]
    pub custom_mask_list: Vec<MaskKeyword>,
}

/// All built-in categories
pub fn default_enabled_entity_types() -> Vec<EntityType> {
    EntityType::BUILT_IN.to_vec()
}

impl ProcessRequest {
    /// Request with every built-in type enabled and no keywords
    pub fn new(text: impl Into<String>, method: AnonymizationMethod) -> Self {
        Self {
            text: text.into(),
            method,
            enabled_entity_types: default_enabled_entity_types(),
            custom_mask_list: Vec::new(),
        }
    }

    pub fn with_entity_types(mut self, types: Vec<EntityType>) -> Self {
        self.enabled_entity_types = types;
        self
    }

    pub fn with_mask_list(mut self, keywords: Vec<MaskKeyword>) -> Self {
        self.custom_mask_list = keywords;
        self
    }
}

/// Per-type entity counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_entities: usize,
    pub by_type: BTreeMap<EntityType, usize>,
}

impl Statistics {
    /// Count entities per type; built-in types are always present
    pub fn from_entities(entities: &[Entity]) -> Self {
        let mut by_type: BTreeMap<EntityType, usize> =
            EntityType::BUILT_IN.iter().map(|t| (t.clone(), 0)).collect();

        for entity in entities {
            *by_type.entry(entity.entity_type.clone()).or_insert(0) += 1;
        }

        Self {
            total_entities: entities.len(),
            by_type,
        }
    }
}

/// Output of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub deidentified_text: String,
    pub entities: Vec<Entity>,
    pub language: Language,
    pub statistics: Statistics,

    /// Entities that could not be substituted; the text is left unmasked there
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deid::models::DetectionSource;

    #[test]
    fn test_method_parse_unknown_is_mask() {
        assert_eq!(AnonymizationMethod::parse("redact"), AnonymizationMethod::Redact);
        assert_eq!(AnonymizationMethod::parse("PSEUDONYMIZE"), AnonymizationMethod::Pseudonymize);
        assert_eq!(AnonymizationMethod::parse("shuffle"), AnonymizationMethod::Mask);
    }

    #[test]
    fn test_language_labels() {
        let json = serde_json::to_string(&Language::Mixed).unwrap();
        assert_eq!(json, "\"Mixed (Thai/English)\"");
        assert_eq!(Language::Thai.to_string(), "Thai");
    }

    #[test]
    fn test_request_defaults() {
        let request: ProcessRequest = serde_json::from_str(r#"{"text":"hello"}"#).unwrap();
        assert_eq!(request.method, AnonymizationMethod::Mask);
        assert_eq!(request.enabled_entity_types.len(), 6);
        assert!(request.custom_mask_list.is_empty());
    }

    #[test]
    fn test_request_camel_case() {
        let request: ProcessRequest = serde_json::from_str(
            r#"{"text":"x","method":"redact","enabledEntityTypes":["PERSON"],
                "customMaskList":[{"keyword":"HN","entityType":"ID","userId":"7"}]}"#,
        )
        .unwrap();
        assert_eq!(request.enabled_entity_types, vec![EntityType::Person]);
        assert_eq!(request.custom_mask_list[0].entity_type, EntityType::Id);
        assert_eq!(request.custom_mask_list[0].user_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_statistics_include_all_built_in_types() {
        let entities = vec![
            Entity::new(EntityType::Person, "a", 0, 1, 1.0, DetectionSource::CustomKeyword),
            Entity::new(EntityType::Person, "b", 2, 3, 1.0, DetectionSource::CustomKeyword),
            Entity::new(EntityType::parse("ward_code"), "c", 4, 5, 1.0, DetectionSource::CustomKeyword),
        ];
        let stats = Statistics::from_entities(&entities);

        assert_eq!(stats.total_entities, 3);
        assert_eq!(stats.by_type[&EntityType::Person], 2);
        assert_eq!(stats.by_type[&EntityType::Date], 0);
        assert_eq!(stats.by_type[&EntityType::Custom("WARD_CODE".to_string())], 1);
        assert_eq!(stats.by_type.len(), 7);
    }
}
