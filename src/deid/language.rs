//! Language detection from character-class ratios

use crate::deid::models::Language;

/// Share of the text a script must strictly exceed to count
const SCRIPT_RATIO_THRESHOLD: f64 = 0.3;

/// Classify text as Thai, English, mixed or unknown
///
/// Counts code points in the Thai block (U+0E00-U+0E7F) and ASCII letters,
/// each as a ratio of all code points. A script counts when its ratio is
/// strictly greater than 0.3.
///
/// # Examples
///
/// ```
/// use thaideid::deid::language::detect_language;
/// use thaideid::deid::models::Language;
///
/// assert_eq!(detect_language("ผู้ป่วยมีไข้"), Language::Thai);
/// assert_eq!(detect_language("Patient has fever"), Language::English);
/// assert_eq!(detect_language("12345"), Language::Unknown);
/// ```
pub fn detect_language(text: &str) -> Language {
    let mut total = 0usize;
    let mut thai = 0usize;
    let mut english = 0usize;

    for c in text.chars() {
        total += 1;
        if ('\u{0E00}'..='\u{0E7F}').contains(&c) {
            thai += 1;
        } else if c.is_ascii_alphabetic() {
            english += 1;
        }
    }

    if total == 0 {
        return Language::Unknown;
    }

    let thai_ratio = thai as f64 / total as f64;
    let english_ratio = english as f64 / total as f64;

    match (
        thai_ratio > SCRIPT_RATIO_THRESHOLD,
        english_ratio > SCRIPT_RATIO_THRESHOLD,
    ) {
        (true, true) => Language::Mixed,
        (true, false) => Language::Thai,
        (false, true) => Language::English,
        (false, false) => Language::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("ผู้ป่วยชื่อสมชาย", Language::Thai ; "thai only")]
    #[test_case("Patient John Smith", Language::English ; "english only")]
    #[test_case("ผู้ป่วย John Smith มาตรวจ", Language::Mixed ; "mixed")]
    #[test_case("", Language::Unknown ; "empty")]
    #[test_case("123-456-7890", Language::Unknown ; "digits only")]
    fn test_detect_language(text: &str, expected: Language) {
        assert_eq!(detect_language(text), expected);
    }

    #[test]
    fn test_thai_ratio_just_above_threshold() {
        let text = format!("{}{}", "ก".repeat(31), "1".repeat(69));
        assert_eq!(detect_language(&text), Language::Thai);
    }

    #[test]
    fn test_thai_ratio_exactly_threshold_is_unknown() {
        let text = format!("{}{}", "ก".repeat(30), "1".repeat(70));
        assert_eq!(detect_language(&text), Language::Unknown);
    }
}
