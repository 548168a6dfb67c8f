//! Honorific-anchored person name detection

use super::lexicon::Lexicon;
use super::{DetectionContext, DetectionStrategy};
use crate::deid::models::{DetectionSource, Entity, EntityType};
use crate::deid::text::is_thai_letter;
use std::sync::Arc;

/// Confidence of title-anchored names
pub const TITLED_CONFIDENCE: f32 = 0.95;

/// Name words consumed after a title
const MAX_NAME_WORDS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Thai,
    Latin,
}

/// Scans for the longest title at each position and extends the span over
/// up to two following name words of the same script
pub struct TitledNameStrategy {
    lexicon: Arc<Lexicon>,
}

/// Space or tab; names never continue across a line break
fn is_inline_space(c: char) -> bool {
    c.is_whitespace() && c != '\n' && c != '\r'
}

/// End of the name word starting at `at`, with its script
fn word_at(chars: &[char], at: usize) -> Option<(usize, Script)> {
    let first = *chars.get(at)?;
    if is_thai_letter(first) {
        let mut end = at + 1;
        while end < chars.len() && is_thai_letter(chars[end]) {
            end += 1;
        }
        return Some((end, Script::Thai));
    }
    if first.is_alphabetic() && first.is_uppercase() {
        let mut end = at + 1;
        while end < chars.len() && chars[end].is_alphabetic() && chars[end].is_lowercase() {
            end += 1;
        }
        // A lone capital is an initial, not a name
        if end - at >= 2 {
            return Some((end, Script::Latin));
        }
    }
    None
}

impl TitledNameStrategy {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    fn ends_name(&self, word: &str) -> bool {
        self.lexicon.is_stop_word(word)
            || self.lexicon.is_medical_term(word)
            || self.lexicon.is_role_word(word)
    }

    /// End offset of the name following a title that ends at `after_title`
    fn name_end(&self, chars: &[char], after_title: usize) -> Option<usize> {
        let mut cursor = after_title;
        while cursor < chars.len() && is_inline_space(chars[cursor]) {
            cursor += 1;
        }

        let mut script = None;
        let mut end = None;
        let mut words = 0;

        while words < MAX_NAME_WORDS {
            let Some((word_end, word_script)) = word_at(chars, cursor) else {
                break;
            };
            if script.is_some_and(|s| s != word_script) {
                break;
            }
            let word: String = chars[cursor..word_end].iter().collect();
            if self.ends_name(&word) {
                break;
            }

            script = Some(word_script);
            end = Some(word_end);
            words += 1;

            let mut next = word_end;
            while next < chars.len() && is_inline_space(chars[next]) {
                next += 1;
            }
            if next == word_end {
                break;
            }
            cursor = next;
        }

        end
    }
}

impl DetectionStrategy for TitledNameStrategy {
    fn name(&self) -> &'static str {
        "titled_name"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Entity> {
        if !ctx.is_enabled(&EntityType::Person) {
            return Vec::new();
        }

        let chars: Vec<char> = ctx.text().chars().collect();
        let mut entities = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let Some(title) = self.lexicon.title_at(&chars, i) else {
                i += 1;
                continue;
            };

            match self.name_end(&chars, i + title.chars.len()) {
                Some(end) => {
                    let text: String = chars[i..end].iter().collect();
                    entities.push(Entity::new(
                        EntityType::Person,
                        text,
                        i,
                        end,
                        TITLED_CONFIDENCE,
                        DetectionSource::TitledName,
                    ));
                    i = end;
                }
                None => i += 1,
            }
        }

        entities
    }
}
