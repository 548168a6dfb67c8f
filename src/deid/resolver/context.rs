//! Leftward context expansion
//!
//! A PERSON span directly preceded by an honorific absorbs it, and a DATE
//! span directly preceded by "born on" absorbs that phrase. A cue already
//! covered by another entity is left alone, so expansion never creates an
//! overlap.

use crate::deid::detector::Lexicon;
use crate::deid::models::{Entity, EntityType};
use crate::deid::text::TextIndex;
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// Look-behind window for cues, in code points
const CUE_WINDOW: usize = 40;

fn born_on_cue() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:^|[^A-Za-z])(born[ \t]+on[ \t]*)$").expect("valid born-on regex")
    })
}

fn born_on_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^born\s+on\b").expect("valid born-on prefix regex"))
}

pub struct ContextExpander {
    lexicon: Arc<Lexicon>,
}

impl ContextExpander {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Expand every entity with a free cue directly before it
    pub fn expand(&self, mut entities: Vec<Entity>, index: &TextIndex<'_>) -> Vec<Entity> {
        for i in 0..entities.len() {
            let entity = &entities[i];
            if !index.matches_at(entity.start, entity.end, &entity.text) {
                continue;
            }

            let Some(cue_len) = self.cue_len(entity, index) else {
                continue;
            };
            let new_start = entity.start - cue_len;

            let blocked = entities
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && other.start < entity.start && other.end > new_start);
            if blocked {
                continue;
            }

            if let Some(text) = index.slice(new_start, entities[i].end) {
                let entity = &mut entities[i];
                entity.text = text.to_string();
                entity.start = new_start;
            }
        }

        entities
    }

    /// Code-point length of the cue preceding `entity`, if any
    fn cue_len(&self, entity: &Entity, index: &TextIndex<'_>) -> Option<usize> {
        let before = index.before(entity.start, CUE_WINDOW);

        let cue_len = match entity.entity_type {
            EntityType::Person => {
                if self.lexicon.starts_with_title(&entity.text) {
                    return None;
                }
                self.lexicon.trailing_title_len(before)?
            }
            EntityType::Date => {
                if born_on_prefix().is_match(&entity.text) {
                    return None;
                }
                let captures = born_on_cue().captures(before)?;
                captures.get(1)?.as_str().chars().count()
            }
            _ => return None,
        };

        (cue_len > 0 && cue_len <= entity.start).then_some(cue_len)
    }
}
