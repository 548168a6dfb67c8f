//! Per-type false-positive filters

use crate::deid::detector::Lexicon;
use crate::deid::models::{DetectionSource, Entity, EntityType};
use crate::deid::text::TextIndex;
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// Context window, in code points, on each side of a PERSON candidate
const CONTEXT_WIDTH: usize = 100;

fn year_continuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\d+,?\s+\d{4}\b").expect("valid year continuation regex"))
}

fn leading_article() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(?:the|a|an)\s+").expect("valid article regex"))
}

fn date_shapes() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        [
            r"^\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}$",
            r"^\d{4}-\d{2}-\d{2}$",
            r"(?i)^(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},?\s+\d{4}$",
            r"^\d{1,2}\s*(?:มกราคม|กุมภาพันธ์|มีนาคม|เมษายน|พฤษภาคม|มิถุนายน|กรกฎาคม|สิงหาคม|กันยายน|ตุลาคม|พฤศจิกายน|ธันวาคม)\s*\d{4}$",
        ]
        .iter()
        .map(|source| Regex::new(source).expect("valid date shape regex"))
        .collect()
    })
}

/// Rejects candidates that are almost certainly not PHI of their type
pub struct FalsePositiveFilter {
    lexicon: Arc<Lexicon>,
}

impl FalsePositiveFilter {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Whether `entity` survives filtering
    ///
    /// User keywords are never filtered.
    pub fn accept(&self, entity: &Entity, index: &TextIndex<'_>) -> bool {
        if entity.source == DetectionSource::CustomKeyword {
            return true;
        }

        match &entity.entity_type {
            EntityType::Person => self.accept_person(entity, index),
            EntityType::Date => {
                if !looks_like_date(&entity.text) {
                    tracing::debug!(
                        start = entity.start,
                        end = entity.end,
                        "DATE candidate outside the known shapes kept"
                    );
                }
                true
            }
            EntityType::Location => !leading_article().is_match(&entity.text),
            EntityType::Organization => entity.text.chars().count() >= 3,
            _ => true,
        }
    }

    fn accept_person(&self, entity: &Entity, index: &TextIndex<'_>) -> bool {
        let text = entity.text.as_str();

        if self.lexicon.has_blocklisted_word(text) || self.lexicon.matches_medical_compound(text) {
            return false;
        }

        let before = index.before(entity.start, CONTEXT_WIDTH);
        let after = index.after(entity.end, CONTEXT_WIDTH);

        // Context checks look left of the span, which changes once a title
        // has been absorbed; titled spans skip them
        if !self.lexicon.starts_with_title(text) {
            if entity.source == DetectionSource::Pattern && self.in_medical_context(before, after) {
                return false;
            }
            if self.follows_preposition(before) && self.lexicon.is_city(text) {
                return false;
            }
        }

        !year_continuation().is_match(after)
    }

    fn in_medical_context(&self, before: &str, after: &str) -> bool {
        before
            .split(|c: char| !(c.is_alphanumeric() || c == '-'))
            .chain(after.split(|c: char| !(c.is_alphanumeric() || c == '-')))
            .any(|token| !token.is_empty() && self.lexicon.is_medical_context(token))
    }

    fn follows_preposition(&self, before: &str) -> bool {
        before
            .split_whitespace()
            .next_back()
            .is_some_and(|token| self.lexicon.is_preposition(token))
    }
}

/// Numeric, ISO, English month-name or Thai month-name date
pub fn looks_like_date(text: &str) -> bool {
    date_shapes().iter().any(|re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn filter() -> FalsePositiveFilter {
        FalsePositiveFilter::new(Arc::new(Lexicon::default_lexicon().unwrap()))
    }

    /// Entity for the first occurrence of `needle` in `text`
    fn entity_in(text: &str, needle: &str, entity_type: EntityType, source: DetectionSource) -> Entity {
        let index = TextIndex::new(text);
        let (start, end) = index.find_first(needle).unwrap();
        Entity::new(entity_type, needle, start, end, 0.7, source)
    }

    fn accepts(text: &str, needle: &str, entity_type: EntityType, source: DetectionSource) -> bool {
        let entity = entity_in(text, needle, entity_type, source);
        filter().accept(&entity, &TextIndex::new(text))
    }

    #[test_case("Olivia Martinez signed the form", "Olivia Martinez", true ; "plain name")]
    #[test_case("Report for December Smith", "December Smith", false ; "month word")]
    #[test_case("moved to Siriraj Hospital", "Siriraj Hospital", false ; "organization keyword")]
    #[test_case("he had Recurrent Stroke", "Recurrent Stroke", false ; "medical compound")]
    #[test_case("the Cushing Syndrome workup", "Cushing Syndrome", false ; "syndrome compound")]
    #[test_case("Olivia Martinez was diagnosed last week", "Olivia Martinez", false ; "medical context after")]
    #[test_case("Follow-up visit: Olivia Martinez signed", "Olivia Martinez", false ; "medical context before")]
    #[test_case("Dr. Olivia Martinez was diagnosed", "Dr. Olivia Martinez", true ; "titled exempt from context")]
    #[test_case("Olivia Martinez 12, 2023", "Olivia Martinez", false ; "year continuation")]
    fn test_person_filter(text: &str, needle: &str, expected: bool) {
        assert_eq!(
            accepts(text, needle, EntityType::Person, DetectionSource::Pattern),
            expected
        );
    }

    #[test]
    fn test_context_check_only_for_pattern_source() {
        let text = "Olivia Martinez was diagnosed last week";
        assert!(accepts(text, "Olivia Martinez", EntityType::Person, DetectionSource::NameCorpus));
    }

    #[test]
    fn test_preposition_before_city() {
        assert!(!accepts(
            "flew in from Tokyo yesterday",
            "Tokyo",
            EntityType::Person,
            DetectionSource::NameCorpus
        ));
    }

    #[test_case("Referred to Parisa Khan", "Parisa Khan" ; "city inside a name")]
    #[test_case("Referred to Dr. Parisa Khan", "Dr. Parisa Khan" ; "titled name after preposition")]
    fn test_preposition_only_rejects_bare_city(text: &str, needle: &str) {
        assert!(accepts(text, needle, EntityType::Person, DetectionSource::NameCorpus));
    }

    #[test]
    fn test_custom_keyword_never_filtered() {
        assert!(accepts(
            "Report for December Smith",
            "December Smith",
            EntityType::Person,
            DetectionSource::CustomKeyword
        ));
    }

    #[test_case("12/05/2023", true ; "numeric")]
    #[test_case("March 3, 1990", true ; "english month")]
    #[test_case("10 มิถุนายน 2564", true ; "thai month")]
    #[test_case("in 2019", false ; "year in context")]
    fn test_date_shapes(text: &str, shaped: bool) {
        assert_eq!(looks_like_date(text), shaped);
        // Every DATE candidate is kept regardless of shape
        assert!(accepts(text, text, EntityType::Date, DetectionSource::Pattern));
    }

    #[test_case("The Clinic", false ; "article the")]
    #[test_case("an office", false ; "article an")]
    #[test_case("Room 402", true ; "room")]
    fn test_location_articles(text: &str, expected: bool) {
        assert_eq!(
            accepts(text, text, EntityType::Location, DetectionSource::Pattern),
            expected
        );
    }

    #[test_case("AB", false ; "two chars")]
    #[test_case("รพ.", true ; "three thai code points")]
    #[test_case("ACME", true ; "four chars")]
    fn test_organization_length(text: &str, expected: bool) {
        assert_eq!(
            accepts(text, text, EntityType::Organization, DetectionSource::Pattern),
            expected
        );
    }

    #[test]
    fn test_other_types_pass() {
        assert!(accepts("HN: 1", "HN: 1", EntityType::Id, DetectionSource::Pattern));
    }
}
