//! Detected entity model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a detected span
///
/// The six built-in categories cover the PHI the detectors know about.
/// User keywords may introduce further categories, kept as [`EntityType::Custom`]
/// with an upper-cased label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    /// Person names, with or without honorific
    Person,
    /// Calendar dates in any supported format
    Date,
    /// Addresses, cities, wards and rooms
    Location,
    /// National IDs, record numbers, passports, policies
    Id,
    /// Phone numbers and e-mail addresses
    Contact,
    /// Hospitals, companies, insurers, government bodies
    Organization,
    /// User-defined category introduced by a custom keyword
    Custom(String),
}

impl EntityType {
    /// Built-in categories in canonical order
    pub const BUILT_IN: [EntityType; 6] = [
        EntityType::Person,
        EntityType::Date,
        EntityType::Location,
        EntityType::Id,
        EntityType::Contact,
        EntityType::Organization,
    ];

    /// Parse a label, mapping unknown labels to [`EntityType::Custom`]
    pub fn parse(label: &str) -> Self {
        let label = label.trim().to_uppercase();
        match label.as_str() {
            "PERSON" => EntityType::Person,
            "DATE" => EntityType::Date,
            "LOCATION" => EntityType::Location,
            "ID" => EntityType::Id,
            "CONTACT" => EntityType::Contact,
            "ORGANIZATION" => EntityType::Organization,
            _ => EntityType::Custom(label),
        }
    }

    /// Upper-case label used in masks and statistics
    pub fn label(&self) -> &str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::Date => "DATE",
            EntityType::Location => "LOCATION",
            EntityType::Id => "ID",
            EntityType::Contact => "CONTACT",
            EntityType::Organization => "ORGANIZATION",
            EntityType::Custom(label) => label,
        }
    }

    pub fn is_built_in(&self) -> bool {
        !matches!(self, EntityType::Custom(_))
    }
}

impl From<String> for EntityType {
    fn from(label: String) -> Self {
        EntityType::parse(&label)
    }
}

impl From<&str> for EntityType {
    fn from(label: &str) -> Self {
        EntityType::parse(label)
    }
}

impl From<EntityType> for String {
    fn from(entity_type: EntityType) -> Self {
        entity_type.label().to_string()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which detector produced an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    /// User keyword list
    CustomKeyword,
    /// Honorific-anchored name scan
    TitledName,
    /// Known-name corpus lookup
    NameCorpus,
    /// Generic regex family
    Pattern,
    /// Supplied by the caller or the external validator
    #[default]
    External,
}

impl DetectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionSource::CustomKeyword => "custom_keyword",
            DetectionSource::TitledName => "titled_name",
            DetectionSource::NameCorpus => "name_corpus",
            DetectionSource::Pattern => "pattern",
            DetectionSource::External => "external",
        }
    }
}

/// A detected span of sensitive text
///
/// `start` and `end` are half-open offsets into the original text counted in
/// Unicode code points, so Thai text indexes the same way it renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity category
    #[serde(rename = "type")]
    pub entity_type: EntityType,

    /// Exact substring as detected
    pub text: String,

    /// First code point of the span
    pub start: usize,

    /// One past the last code point of the span
    pub end: usize,

    /// Detector confidence in [0, 1]
    #[serde(default = "default_confidence")]
    pub confidence: f32,

    /// Detector that produced the span
    #[serde(default)]
    pub source: DetectionSource,
}

fn default_confidence() -> f32 {
    0.8
}

impl Entity {
    /// Create a new entity
    pub fn new(
        entity_type: EntityType,
        text: impl Into<String>,
        start: usize,
        end: usize,
        confidence: f32,
        source: DetectionSource,
    ) -> Self {
        Self {
            entity_type,
            text: text.into(),
            start,
            end,
            confidence: confidence.clamp(0.0, 1.0),
            source,
        }
    }

    /// Span length in code points
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether two spans share at least one code point
    pub fn overlaps(&self, other: &Entity) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `[start, end)` lies entirely inside this span
    pub fn covers(&self, start: usize, end: usize) -> bool {
        self.start <= start && end <= self.end
    }
}
