//! Entity resolution
//!
//! Three passes over raw detector output: overlap merging, per-type
//! false-positive filtering and leftward context expansion. Each pass is a
//! fixed point, so resolving an already-resolved list returns it unchanged.

pub mod context;
pub mod filters;

use crate::deid::detector::Lexicon;
use crate::deid::models::Entity;
use crate::deid::text::TextIndex;
use std::sync::Arc;

pub use context::ContextExpander;
pub use filters::FalsePositiveFilter;

/// Merge, filter and expand candidate entities
pub struct EntityResolver {
    filter: FalsePositiveFilter,
    expander: ContextExpander,
}

impl EntityResolver {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            filter: FalsePositiveFilter::new(lexicon.clone()),
            expander: ContextExpander::new(lexicon),
        }
    }

    /// Resolve candidates found in `text`
    pub fn resolve(&self, entities: Vec<Entity>, text: &str) -> Vec<Entity> {
        let index = TextIndex::new(text);
        let candidates = entities.len();

        let merged = merge_overlapping(entities);
        let merged_count = merged.len();

        let filtered: Vec<Entity> = merged
            .into_iter()
            .filter(|entity| self.filter.accept(entity, &index))
            .collect();
        let filtered_count = filtered.len();

        let resolved = self.expander.expand(filtered, &index);

        tracing::debug!(
            candidates = candidates,
            merged = merged_count,
            kept = filtered_count,
            "Entities resolved"
        );

        resolved
    }
}

/// Collapse overlapping spans, keeping the strictly longer one
///
/// Candidates are visited by start offset, longer spans first on ties. A
/// candidate overlapping accepted spans replaces them only when it is
/// longer than the longest of them; otherwise it is discarded. The result
/// is sorted by start offset and contains no overlapping spans.
pub fn merge_overlapping(mut entities: Vec<Entity>) -> Vec<Entity> {
    entities.sort_by(|a, b| a.start.cmp(&b.start).then(b.len().cmp(&a.len())));

    let mut accepted: Vec<Entity> = Vec::with_capacity(entities.len());
    for entity in entities {
        let longest_overlap = accepted
            .iter()
            .filter(|e| e.overlaps(&entity))
            .map(Entity::len)
            .max();

        match longest_overlap {
            None => accepted.push(entity),
            Some(longest) if entity.len() > longest => {
                accepted.retain(|e| !e.overlaps(&entity));
                accepted.push(entity);
            }
            Some(_) => {}
        }
    }

    accepted.sort_by_key(|e| e.start);
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deid::models::{DetectionSource, EntityType};

    fn person(text: &str, start: usize, end: usize) -> Entity {
        Entity::new(EntityType::Person, text, start, end, 0.8, DetectionSource::External)
    }

    fn resolver() -> EntityResolver {
        EntityResolver::new(Arc::new(Lexicon::default_lexicon().unwrap()))
    }

    #[test]
    fn test_merge_keeps_longer_span() {
        let merged = merge_overlapping(vec![person("Smith", 4, 9), person("Dr. Smith", 0, 9)]);
        assert_eq!(merged, vec![person("Dr. Smith", 0, 9)]);
    }

    #[test]
    fn test_merge_equal_length_keeps_first() {
        let a = Entity::new(EntityType::Id, "12345", 0, 5, 0.8, DetectionSource::Pattern);
        let b = Entity::new(EntityType::Contact, "12345", 0, 5, 0.8, DetectionSource::Pattern);
        let merged = merge_overlapping(vec![a.clone(), b]);
        assert_eq!(merged, vec![a]);
    }

    #[test]
    fn test_merge_partial_overlap_replaces_all_shorter() {
        let merged = merge_overlapping(vec![
            person("ab", 0, 2),
            person("cd", 3, 5),
            person("bcd", 1, 5),
        ]);
        assert_eq!(merged, vec![person("bcd", 1, 5)]);
    }

    #[test]
    fn test_merge_result_sorted_and_disjoint() {
        let merged = merge_overlapping(vec![
            person("c", 10, 12),
            person("a", 0, 3),
            person("b", 2, 8),
            person("d", 11, 20),
        ]);
        for pair in merged.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_resolve_overlap_scenario() {
        let text = "Dr. Smith";
        let resolved = resolver().resolve(vec![person("Dr. Smith", 0, 9), person("Smith", 4, 9)], text);
        assert_eq!(resolved, vec![person("Dr. Smith", 0, 9)]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let text = "seen by Dr. John Adams, born on March 3, 1990, in Room 402";
        let candidates = vec![
            person("John Adams", 12, 22),
            Entity::new(EntityType::Date, "March 3, 1990", 32, 45, 0.8, DetectionSource::Pattern),
            Entity::new(EntityType::Location, "Room 402", 50, 58, 0.75, DetectionSource::Pattern),
        ];
        let once = resolver().resolve(candidates, text);
        let twice = resolver().resolve(once.clone(), text);
        assert_eq!(once, twice);
        assert_eq!(once[0].text, "Dr. John Adams");
        assert_eq!(once[1].text, "born on March 3, 1990");
    }

    #[test]
    fn test_resolve_empty() {
        assert!(resolver().resolve(Vec::new(), "text").is_empty());
    }
}
