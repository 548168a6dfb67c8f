//! User keyword detection

use super::{DetectionContext, DetectionStrategy};
use crate::deid::models::{DetectionSource, Entity};
use regex::RegexBuilder;

/// Confidence of user-listed keywords
pub const KEYWORD_CONFIDENCE: f32 = 1.0;

/// Case-insensitive literal search for every enabled mask keyword
pub struct CustomKeywordStrategy;

impl DetectionStrategy for CustomKeywordStrategy {
    fn name(&self) -> &'static str {
        "custom_keyword"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Entity> {
        let mut entities = Vec::new();

        for mask in ctx.mask_list {
            if mask.keyword.trim().is_empty() {
                continue;
            }
            let entity_type = &mask.entity_type;
            if !ctx.is_enabled(entity_type) {
                continue;
            }

            let pattern = match RegexBuilder::new(&regex::escape(&mask.keyword))
                .case_insensitive(true)
                .build()
            {
                Ok(pattern) => pattern,
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unusable mask keyword");
                    continue;
                }
            };

            for found in pattern.find_iter(ctx.text()) {
                let (start, end) = ctx.index.char_span(found.start(), found.end());
                entities.push(Entity::new(
                    entity_type.clone(),
                    found.as_str(),
                    start,
                    end,
                    KEYWORD_CONFIDENCE,
                    DetectionSource::CustomKeyword,
                ));
            }
        }

        entities
    }
}
