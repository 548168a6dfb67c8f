//! Fixed-label replacement strategies

use super::ReplacementStrategy;
use crate::deid::models::Entity;

/// Literal replacing every entity under `redact`
pub const REDACTED: &str = "[REDACTED]";

/// Replaces every entity with `[REDACTED]`
pub struct RedactStrategy;

impl ReplacementStrategy for RedactStrategy {
    fn replacement(&mut self, _entity: &Entity) -> String {
        REDACTED.to_string()
    }
}

/// Replaces an entity with its type label, `[PERSON]`
pub struct MaskStrategy;

impl ReplacementStrategy for MaskStrategy {
    fn replacement(&mut self, entity: &Entity) -> String {
        format!("[{}]", entity.entity_type.label())
    }
}
