//! Known-name corpus lookup

use super::lexicon::Lexicon;
use super::{DetectionContext, DetectionStrategy};
use crate::deid::models::{DetectionSource, Entity, EntityType};
use crate::deid::text::is_thai_letter;
use std::sync::Arc;

/// Confidence of corpus name hits
pub const CORPUS_CONFIDENCE: f32 = 0.9;

/// Matches script-contiguous tokens against the known-name corpus
pub struct CorpusNameStrategy {
    lexicon: Arc<Lexicon>,
}

impl CorpusNameStrategy {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }
}

/// Maximal runs of Thai letters or of Latin letters, as code-point ranges
fn script_tokens(chars: &[char]) -> Vec<(usize, usize)> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let same_script: fn(char) -> bool = if is_thai_letter(chars[i]) {
            is_thai_letter
        } else if chars[i].is_ascii_alphabetic() {
            |c| c.is_ascii_alphabetic()
        } else {
            i += 1;
            continue;
        };

        let start = i;
        while i < chars.len() && same_script(chars[i]) {
            i += 1;
        }
        tokens.push((start, i));
    }

    tokens
}

impl DetectionStrategy for CorpusNameStrategy {
    fn name(&self) -> &'static str {
        "name_corpus"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Entity> {
        if !ctx.is_enabled(&EntityType::Person) {
            return Vec::new();
        }

        let chars: Vec<char> = ctx.text().chars().collect();
        script_tokens(&chars)
            .into_iter()
            .filter_map(|(start, end)| {
                let token: String = chars[start..end].iter().collect();
                if self.lexicon.is_known_name(&token) && !self.lexicon.is_medical_term(&token) {
                    Some(Entity::new(
                        EntityType::Person,
                        token,
                        start,
                        end,
                        CORPUS_CONFIDENCE,
                        DetectionSource::NameCorpus,
                    ))
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deid::text::TextIndex;

    fn run(text: &str) -> Vec<Entity> {
        let strategy = CorpusNameStrategy::new(Arc::new(Lexicon::default_lexicon().unwrap()));
        let index = TextIndex::new(text);
        let enabled = [EntityType::Person];
        let ctx = DetectionContext {
            index: &index,
            enabled_types: &enabled,
            mask_list: &[],
        };
        strategy.detect(&ctx)
    }

    #[test]
    fn test_script_tokens_split_on_script_change() {
        let chars: Vec<char> = "สมชายSomchai 12 ใจดี".chars().collect();
        assert_eq!(script_tokens(&chars), vec![(0, 5), (5, 12), (16, 20)]);
    }

    #[test]
    fn test_thai_names_found() {
        let entities = run("ผู้ป่วย สมชาย ใจดี");
        let found: Vec<_> = entities.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(found, vec!["สมชาย", "ใจดี"]);
        assert_eq!(entities[0].start, 8);
        assert!(entities.iter().all(|e| e.confidence == CORPUS_CONFIDENCE));
    }

    #[test]
    fn test_romanized_names_case_insensitive() {
        let entities = run("Contact SOMCHAI or somsri");
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn test_name_must_be_whole_token() {
        assert!(run("สมชายดี").is_empty());
        assert!(run("Somchaiya").is_empty());
    }
}
