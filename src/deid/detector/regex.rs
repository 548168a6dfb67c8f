//! Generic regex family detection

use super::lexicon::Lexicon;
use super::patterns::PatternRegistry;
use super::{DetectionContext, DetectionStrategy};
use crate::deid::models::{DetectionSource, Entity, EntityType};
use std::sync::Arc;

/// Runs every registered pattern of every enabled type
pub struct RegexFamilyStrategy {
    registry: Arc<PatternRegistry>,
    lexicon: Arc<Lexicon>,
}

impl RegexFamilyStrategy {
    pub fn new(registry: Arc<PatternRegistry>, lexicon: Arc<Lexicon>) -> Self {
        Self { registry, lexicon }
    }

    /// Enabled types, built-ins in canonical order first
    fn scan_order(enabled: &[EntityType]) -> Vec<EntityType> {
        let mut order: Vec<EntityType> = EntityType::BUILT_IN
            .iter()
            .filter(|t| enabled.contains(*t))
            .cloned()
            .collect();
        for entity_type in enabled {
            if !order.contains(entity_type) {
                order.push(entity_type.clone());
            }
        }
        order
    }
}

impl DetectionStrategy for RegexFamilyStrategy {
    fn name(&self) -> &'static str {
        "regex_family"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Entity> {
        let text = ctx.text();
        let mut entities = Vec::new();

        for entity_type in Self::scan_order(ctx.enabled_types) {
            for pattern in self.registry.patterns_for_type(&entity_type) {
                for (byte_start, byte_end) in pattern.find_spans(text) {
                    let (start, end) = ctx.index.char_span(byte_start, byte_end);
                    if start == end {
                        continue;
                    }
                    if pattern.max_length.is_some_and(|max| end - start > max) {
                        continue;
                    }

                    let matched = &text[byte_start..byte_end];
                    if entity_type == EntityType::Person
                        && self.lexicon.mentions_clinical_term(matched)
                    {
                        continue;
                    }

                    entities.push(Entity::new(
                        entity_type.clone(),
                        matched,
                        start,
                        end,
                        pattern.confidence,
                        DetectionSource::Pattern,
                    ));
                }
            }
        }

        entities
    }
}
