//! Position normalization and right-to-left splicing

use super::ReplacementStrategy;
use crate::deid::models::Entity;
use crate::deid::text::TextIndex;
use crate::log_position_drift;

/// Result of splicing replacements into a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionOutcome {
    pub text: String,
    /// Entities replaced
    pub applied: usize,
    /// Entities left unmasked after failed verification
    pub skipped: usize,
    /// One entry per drifted or skipped entity; never contains entity text
    pub warnings: Vec<String>,
}

/// Realign entities whose recorded span no longer matches `text`
///
/// A drifted entity is moved to the first occurrence of its text. When the
/// text does not occur at all the entity is left where it was and the
/// substitution step will skip it.
pub fn normalize_positions(text: &str, entities: &[Entity]) -> (Vec<Entity>, Vec<String>) {
    let index = TextIndex::new(text);
    let mut warnings = Vec::new();

    let normalized = entities
        .iter()
        .map(|entity| {
            if index.matches_at(entity.start, entity.end, &entity.text) {
                return entity.clone();
            }

            let recovered = index.find_first(&entity.text);
            log_position_drift!(entity.entity_type, entity.start, entity.end, recovered);

            match recovered {
                Some((start, end)) => {
                    warnings.push(format!(
                        "{} entity at {}..{} did not match the text; moved to first occurrence at {}..{}",
                        entity.entity_type, entity.start, entity.end, start, end
                    ));
                    Entity {
                        start,
                        end,
                        ..entity.clone()
                    }
                }
                None => entity.clone(),
            }
        })
        .collect();

    (normalized, warnings)
}

/// Replace every verified entity span, rightmost first
///
/// Each span is re-checked against the partially rewritten text right
/// before it is replaced; a mismatch (including a span already consumed by
/// an overlapping replacement) skips that entity only.
pub fn substitute(
    text: &str,
    entities: &[Entity],
    strategy: &mut dyn ReplacementStrategy,
) -> SubstitutionOutcome {
    let mut chars: Vec<char> = text.chars().collect();
    let mut ordered: Vec<&Entity> = entities.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));

    let mut applied = 0;
    let mut skipped = 0;
    let mut warnings = Vec::new();
    // Lowest offset already rewritten; spans must end at or before it
    let mut frontier = chars.len();

    for entity in ordered {
        let verified = !entity.is_empty()
            && entity.end <= frontier
            && chars[entity.start..entity.end].iter().copied().eq(entity.text.chars());

        if !verified {
            skipped += 1;
            warnings.push(format!(
                "{} entity at {}..{} skipped: span does not match the text",
                entity.entity_type, entity.start, entity.end
            ));
            continue;
        }

        let replacement = strategy.replacement(entity);
        chars.splice(entity.start..entity.end, replacement.chars());
        frontier = entity.start;
        applied += 1;
    }

    SubstitutionOutcome {
        text: chars.into_iter().collect(),
        applied,
        skipped,
        warnings,
    }
}
