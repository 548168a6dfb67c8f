//! Literal corpora: honorific titles, stop words, known names and the word
//! lists behind the false-positive filters

use crate::deid::text::is_thai_letter;
use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Lexicon file layout
#[derive(Debug, Deserialize)]
struct LexiconFile {
    titles: Vec<String>,
    #[serde(default)]
    spaced_titles: Vec<String>,
    #[serde(default)]
    title_exclusions: Vec<String>,
    #[serde(default)]
    stop_words: Vec<String>,
    #[serde(default)]
    known_names: Vec<String>,
    #[serde(default)]
    medical_terms: Vec<String>,
    #[serde(default)]
    role_words: Vec<String>,
    #[serde(default)]
    months: Vec<String>,
    #[serde(default)]
    days: Vec<String>,
    #[serde(default)]
    cities: Vec<String>,
    #[serde(default)]
    organization_keywords: Vec<String>,
    #[serde(default)]
    medical_context: Vec<String>,
    #[serde(default)]
    prepositions: Vec<String>,
    #[serde(default)]
    medical_compounds: Vec<String>,
}

/// Honorific title
#[derive(Debug, Clone)]
pub struct Title {
    pub text: String,
    /// Code points, for matching at arbitrary offsets
    pub chars: Vec<char>,
    /// Latin titles need a non-letter on both sides
    pub latin: bool,
    /// Only a title when followed by whitespace
    pub requires_space: bool,
}

/// Compiled lexicon shared by the name detectors and the resolver
#[derive(Debug)]
pub struct Lexicon {
    titles: Vec<Title>,
    title_exclusions: Vec<Vec<char>>,
    stop_words: HashSet<String>,
    thai_stop_prefixes: Vec<String>,
    known_names: HashSet<String>,
    medical_terms: HashSet<String>,
    role_words: HashSet<String>,
    person_blocklist: HashSet<String>,
    blocklist_phrases: Vec<String>,
    cities: HashSet<String>,
    medical_context: HashSet<String>,
    prepositions: HashSet<String>,
    medical_compounds: Vec<Regex>,
}

/// Fold Latin text for case-insensitive lookups; Thai is unaffected
fn fold(word: &str) -> String {
    word.to_lowercase()
}

fn is_thai_word(word: &str) -> bool {
    word.chars().next().is_some_and(is_thai_letter)
}

/// Lowercased words of `text`, punctuation trimmed, joined by single spaces
fn folded_words(text: &str) -> String {
    text.split_whitespace()
        .map(trim_word)
        .filter(|w| !w.is_empty())
        .map(fold)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip punctuation hugging a whitespace-delimited word ("Bangkok," -> "Bangkok")
pub fn trim_word(word: &str) -> &str {
    word.trim_matches(|c: char| c.is_ascii_punctuation() && c != '-')
}

impl Lexicon {
    /// Load a lexicon from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read lexicon: {}", path.as_ref().display()))?;

        Self::from_toml(&content)
    }

    /// Build a lexicon from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: LexiconFile = toml::from_str(content).context("Failed to parse lexicon TOML")?;

        if file.titles.is_empty() {
            anyhow::bail!("Lexicon must define at least one title");
        }

        let spaced: HashSet<&str> = file.spaced_titles.iter().map(String::as_str).collect();
        let mut titles: Vec<Title> = file
            .titles
            .iter()
            .filter(|t| !t.trim().is_empty())
            .map(|t| Title {
                text: t.clone(),
                chars: t.chars().collect(),
                latin: t.chars().next().is_some_and(|c| c.is_ascii_alphabetic()),
                requires_space: spaced.contains(t.as_str()),
            })
            .collect();
        // Stable: equal-length titles keep their priority order
        titles.sort_by(|a, b| b.chars.len().cmp(&a.chars.len()));

        let (thai_stops, latin_stops): (Vec<String>, Vec<String>) =
            file.stop_words.into_iter().partition(|w| is_thai_word(w));

        let mut person_blocklist = HashSet::new();
        let mut blocklist_phrases = Vec::new();
        for entry in file
            .months
            .iter()
            .chain(&file.days)
            .chain(&file.cities)
            .chain(&file.organization_keywords)
            .chain(&file.medical_terms)
        {
            if entry.contains(char::is_whitespace) {
                blocklist_phrases.push(folded_words(entry));
            } else {
                person_blocklist.insert(fold(entry));
            }
        }

        let medical_compounds = file
            .medical_compounds
            .iter()
            .map(|source| {
                RegexBuilder::new(source)
                    .case_insensitive(true)
                    .build()
                    .with_context(|| format!("Invalid medical compound pattern: {source}"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            titles,
            title_exclusions: file
                .title_exclusions
                .iter()
                .filter(|w| !w.trim().is_empty())
                .map(|w| w.chars().collect())
                .collect(),
            stop_words: latin_stops.iter().map(|w| fold(w)).collect(),
            thai_stop_prefixes: thai_stops,
            known_names: file.known_names.iter().map(|w| fold(w)).collect(),
            medical_terms: file.medical_terms.iter().map(|w| fold(w)).collect(),
            role_words: file.role_words.iter().map(|w| fold(w)).collect(),
            person_blocklist,
            blocklist_phrases,
            cities: file.cities.iter().map(|w| folded_words(w)).collect(),
            medical_context: file.medical_context.iter().map(|w| fold(w)).collect(),
            prepositions: file.prepositions.iter().map(|w| fold(w)).collect(),
            medical_compounds,
        })
    }

    /// Built-in lexicon
    pub fn default_lexicon() -> Result<Self> {
        let default_toml = include_str!("../../../patterns/lexicon.toml");
        Self::from_toml(default_toml)
    }

    /// Titles, longest first
    pub fn titles(&self) -> &[Title] {
        &self.titles
    }

    /// Whether a name word ends a titled-name span
    pub fn is_stop_word(&self, word: &str) -> bool {
        if is_thai_word(word) {
            self.thai_stop_prefixes.iter().any(|p| word.starts_with(p.as_str()))
        } else {
            self.stop_words.contains(&fold(word))
        }
    }

    pub fn is_known_name(&self, word: &str) -> bool {
        self.known_names.contains(&fold(word))
    }

    pub fn is_medical_term(&self, word: &str) -> bool {
        self.medical_terms.contains(&fold(word))
    }

    pub fn is_role_word(&self, word: &str) -> bool {
        self.role_words.contains(&fold(word))
    }

    /// Whether any word of `text` is a medical term or a clinical role
    pub fn mentions_clinical_term(&self, text: &str) -> bool {
        text.split_whitespace()
            .map(trim_word)
            .any(|w| self.is_medical_term(w) || self.is_role_word(w))
    }

    /// Whether any word of `text` is a month, day, city, organization
    /// keyword or medical term
    pub fn has_blocklisted_word(&self, text: &str) -> bool {
        let padded = format!(" {} ", folded_words(text));
        if self
            .blocklist_phrases
            .iter()
            .any(|p| padded.contains(&format!(" {p} ")))
        {
            return true;
        }
        text.split_whitespace()
            .map(trim_word)
            .any(|w| self.person_blocklist.contains(&fold(w)))
    }

    /// Whether `text` is exactly a known city name ("Bangkok", "los  angeles,")
    pub fn is_city(&self, text: &str) -> bool {
        self.cities.contains(&folded_words(text))
    }

    pub fn is_medical_context(&self, token: &str) -> bool {
        self.medical_context.contains(&fold(token))
    }

    pub fn is_preposition(&self, token: &str) -> bool {
        self.prepositions.contains(&fold(token))
    }

    /// Whether `text` reads like a diagnosis ("Acute Stroke", "Cushing Syndrome")
    pub fn matches_medical_compound(&self, text: &str) -> bool {
        self.medical_compounds.iter().any(|re| re.is_match(text))
    }

    /// Longest title at code-point offset `at` of `chars`
    pub fn title_at(&self, chars: &[char], at: usize) -> Option<&Title> {
        self.titles.iter().find(|title| {
            let end = at + title.chars.len();
            if end > chars.len() || chars[at..end] != title.chars[..] {
                return false;
            }
            if title.latin {
                let before_ok = at == 0 || !chars[at - 1].is_alphabetic();
                let after_ok = chars.get(end).map_or(true, |c| !c.is_alphabetic());
                if !(before_ok && after_ok) {
                    return false;
                }
            }
            if title.requires_space {
                return chars.get(end).is_some_and(|c| c.is_whitespace());
            }
            !self.title_exclusions.iter().any(|word| {
                word.len() > title.chars.len() && chars[at..].starts_with(word)
            })
        })
    }

    /// Whether `text` opens with a title
    pub fn starts_with_title(&self, text: &str) -> bool {
        let chars: Vec<char> = text.chars().collect();
        self.title_at(&chars, 0).is_some()
    }

    /// Code-point length of a title plus trailing spaces closing `before`
    ///
    /// Returns the length of the cue to absorb, or `None` when `before` does
    /// not end with a title.
    pub fn trailing_title_len(&self, before: &str) -> Option<usize> {
        let chars: Vec<char> = before.chars().collect();
        let mut trimmed_end = chars.len();
        while trimmed_end > 0 && matches!(chars[trimmed_end - 1], ' ' | '\t') {
            trimmed_end -= 1;
        }

        self.titles.iter().find_map(|title| {
            let len = title.chars.len();
            if len > trimmed_end {
                return None;
            }
            let at = trimmed_end - len;
            if chars[at..trimmed_end] != title.chars[..] {
                return None;
            }
            if title.latin && at > 0 && chars[at - 1].is_alphabetic() {
                return None;
            }
            if title.requires_space && trimmed_end == chars.len() {
                return None;
            }
            Some(chars.len() - at)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> Lexicon {
        Lexicon::default_lexicon().unwrap()
    }

    #[test]
    fn test_titles_longest_first() {
        let lexicon = lexicon();
        let position = |t: &str| lexicon.titles().iter().position(|x| x.text == t).unwrap();
        assert!(position("ศ. นพ.") < position("นพ."));
        assert!(position("นางสาว") < position("นาง"));
        // equal length keeps file order
        assert!(position("นาง") < position("นาย"));
    }

    #[test]
    fn test_title_at_prefers_compound() {
        let lexicon = lexicon();
        let chars: Vec<char> = "ศ. นพ.สมชาย".chars().collect();
        assert_eq!(lexicon.title_at(&chars, 0).unwrap().text, "ศ. นพ.");
    }

    #[test]
    fn test_latin_title_needs_boundary() {
        let lexicon = lexicon();
        let chars: Vec<char> = "Mississippi".chars().collect();
        assert!(lexicon.title_at(&chars, 0).is_none());

        let chars: Vec<char> = "Miss Olivia".chars().collect();
        assert_eq!(lexicon.title_at(&chars, 0).unwrap().text, "Miss");
    }

    #[test]
    fn test_spaced_title() {
        let lexicon = lexicon();
        let word: Vec<char> = "คุณภาพ".chars().collect();
        assert!(lexicon.title_at(&word, 0).is_none());
        let name: Vec<char> = "คุณ สมศรี".chars().collect();
        assert_eq!(lexicon.title_at(&name, 0).unwrap().text, "คุณ");
    }

    #[test]
    fn test_stop_words() {
        let lexicon = lexicon();
        assert!(lexicon.is_stop_word("Hospital"));
        assert!(lexicon.is_stop_word("hospital"));
        assert!(lexicon.is_stop_word("โรงพยาบาลศิริราช"));
        assert!(!lexicon.is_stop_word("สมชาย"));
    }

    #[test]
    fn test_blocklisted_words() {
        let lexicon = lexicon();
        assert!(lexicon.has_blocklisted_word("December Smith"));
        assert!(lexicon.has_blocklisted_word("visit to Los Angeles"));
        assert!(lexicon.has_blocklisted_word("Bangkok,"));
        assert!(!lexicon.has_blocklisted_word("Olivia Martinez"));
    }

    #[test]
    fn test_is_city_whole_span_only() {
        let lexicon = lexicon();
        assert!(lexicon.is_city("Los  Angeles,"));
        assert!(lexicon.is_city("paris"));
        assert!(lexicon.is_city("เชียงใหม่"));
        assert!(!lexicon.is_city("Downtown Los Angeles"));
        assert!(!lexicon.is_city("Parisa Khan"));
        assert!(!lexicon.is_city("Olivia"));
    }

    #[test]
    fn test_blocklist_phrases_are_word_bounded() {
        let lexicon = lexicon();
        assert!(lexicon.has_blocklisted_word("Downtown New York"));
        assert!(!lexicon.has_blocklisted_word("Renew Yorkton"));
    }

    #[test]
    fn test_title_exclusions() {
        let lexicon = lexicon();
        let premier: Vec<char> = "นายกรัฐมนตรี กล่าว".chars().collect();
        assert!(lexicon.title_at(&premier, 0).is_none());
        assert!(!lexicon.starts_with_title("นายจ้าง สมชาย"));

        let name: Vec<char> = "นายสมชาย".chars().collect();
        assert_eq!(lexicon.title_at(&name, 0).unwrap().text, "นาย");
    }

    #[test]
    fn test_medical_compound() {
        let lexicon = lexicon();
        assert!(lexicon.matches_medical_compound("Recurrent Stroke"));
        assert!(lexicon.matches_medical_compound("Cushing Syndrome"));
        assert!(!lexicon.matches_medical_compound("Olivia Martinez"));
    }

    #[test]
    fn test_trailing_title_len() {
        let lexicon = lexicon();
        assert_eq!(lexicon.trailing_title_len("seen by Dr. "), Some(4));
        assert_eq!(lexicon.trailing_title_len("ผู้ป่วยนพ."), Some(3));
        assert_eq!(lexicon.trailing_title_len("seen by XDr. "), None);
        assert_eq!(lexicon.trailing_title_len("no title here "), None);
    }

    #[test]
    fn test_clinical_term_mentions() {
        let lexicon = lexicon();
        assert!(lexicon.mentions_clinical_term("Patient Smith"));
        assert!(lexicon.mentions_clinical_term("ไข้"));
        assert!(!lexicon.mentions_clinical_term("John Smith"));
    }
}
