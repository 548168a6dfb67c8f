//! Entity detection
//!
//! Detection runs an ordered list of [`DetectionStrategy`] implementations,
//! highest priority first. A candidate fully nested inside a span accepted
//! by an earlier strategy is dropped; partial overlaps are left for the
//! resolver to arbitrate.

pub mod corpus;
pub mod keyword;
pub mod lexicon;
pub mod patterns;
pub mod regex;
pub mod titled;

use crate::deid::models::{Entity, EntityType, MaskKeyword};
use crate::deid::text::TextIndex;
use anyhow::Result;
use std::sync::Arc;

pub use corpus::CorpusNameStrategy;
pub use keyword::CustomKeywordStrategy;
pub use lexicon::Lexicon;
pub use patterns::PatternRegistry;
pub use regex::RegexFamilyStrategy;
pub use titled::TitledNameStrategy;

/// Per-request inputs shared by every strategy
pub struct DetectionContext<'a> {
    pub index: &'a TextIndex<'a>,
    pub enabled_types: &'a [EntityType],
    pub mask_list: &'a [MaskKeyword],
}

impl<'a> DetectionContext<'a> {
    pub fn is_enabled(&self, entity_type: &EntityType) -> bool {
        self.enabled_types.contains(entity_type)
    }

    pub fn text(&self) -> &'a str {
        self.index.as_str()
    }
}

/// One detection stage
pub trait DetectionStrategy: Send + Sync {
    /// Stage name, for logging
    fn name(&self) -> &'static str;

    /// Candidates found in the request text
    ///
    /// Must not fail: malformed input contributes zero candidates.
    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Entity>;
}

/// Layered entity detector
pub struct EntityDetector {
    strategies: Vec<Box<dyn DetectionStrategy>>,
}

impl EntityDetector {
    /// Standard strategy order: custom keywords, titled names, corpus names,
    /// generic regex families
    pub fn new(registry: Arc<PatternRegistry>, lexicon: Arc<Lexicon>) -> Self {
        Self {
            strategies: vec![
                Box::new(CustomKeywordStrategy),
                Box::new(TitledNameStrategy::new(lexicon.clone())),
                Box::new(CorpusNameStrategy::new(lexicon.clone())),
                Box::new(RegexFamilyStrategy::new(registry, lexicon)),
            ],
        }
    }

    /// Detector over the embedded pattern library and lexicon
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(
            Arc::new(PatternRegistry::default_patterns()?),
            Arc::new(Lexicon::default_lexicon()?),
        ))
    }

    /// Detector with an explicit strategy list, in priority order
    pub fn with_strategies(strategies: Vec<Box<dyn DetectionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Run every strategy over `text`
    ///
    /// Offsets of the returned entities are code points.
    pub fn detect(
        &self,
        text: &str,
        enabled_types: &[EntityType],
        mask_list: &[MaskKeyword],
    ) -> Vec<Entity> {
        let index = TextIndex::new(text);
        let ctx = DetectionContext {
            index: &index,
            enabled_types,
            mask_list,
        };

        let mut accepted: Vec<Entity> = Vec::new();
        for strategy in &self.strategies {
            let covered = accepted.len();
            let candidates = strategy.detect(&ctx);
            let found = candidates.len();

            for candidate in candidates {
                let nested = accepted[..covered]
                    .iter()
                    .any(|e| e.covers(candidate.start, candidate.end));
                if !nested {
                    accepted.push(candidate);
                }
            }

            tracing::debug!(
                strategy = strategy.name(),
                found = found,
                kept = accepted.len() - covered,
                "Detection stage complete"
            );
        }

        accepted
    }
}
