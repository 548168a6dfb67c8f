//! External validator boundary
//!
//! A validator receives the text, the resolved candidates and the caller's
//! keywords, and may add, remove or rescore entities. Every failure is
//! reported as a [`ValidatorError`]; the engine falls back to the
//! candidates it already has.

pub mod gemini;
pub mod service;

use crate::config::{ValidatorConfig, ValidatorProvider};
use crate::deid::models::{Entity, MaskKeyword};
use crate::domain::ValidatorError;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, OnceLock};

pub use gemini::GeminiValidator;
pub use service::ServiceValidator;

/// Outbound entity validation
#[async_trait]
pub trait EntityValidator: Send + Sync {
    /// Validator name, for logging
    fn name(&self) -> &'static str;

    /// Whether the validator has what it needs to make a call
    fn is_configured(&self) -> bool;

    /// Validated entity list for `text`
    async fn validate(
        &self,
        text: &str,
        candidates: &[Entity],
        mask_list: &[MaskKeyword],
    ) -> Result<Vec<Entity>, ValidatorError>;
}

/// Validator selected by `[validator].provider`
pub fn from_config(config: &ValidatorConfig) -> Result<Arc<dyn EntityValidator>, ValidatorError> {
    Ok(match config.provider {
        ValidatorProvider::Service => Arc::new(ServiceValidator::new(config)?),
        ValidatorProvider::Gemini => Arc::new(GeminiValidator::new(config)?),
    })
}

fn bracketed_array() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[\s\S]*\]").expect("valid bracketed array regex"))
}

/// Parse the entity array embedded in free-form model output
///
/// Takes everything from the first `[` to the last `]`, so prose or code
/// fences around the array are ignored.
pub fn extract_entity_array(raw: &str) -> Result<Vec<Entity>, ValidatorError> {
    let found = bracketed_array()
        .find(raw)
        .ok_or_else(|| ValidatorError::InvalidResponse("no JSON array in response".to_string()))?;

    serde_json::from_str(found.as_str())
        .map_err(|e| ValidatorError::InvalidResponse(format!("entity array did not parse: {e}")))
}

/// Entities from a validator response body
///
/// Accepts a bare entity array, an `{"entities": [...]}` object, a
/// `generateContent` envelope whose first candidate part holds the array
/// as text, or plain text containing the array.
pub fn parse_response_body(body: &str) -> Result<Vec<Entity>, ValidatorError> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return extract_entity_array(body);
    };

    match value {
        Value::Array(_) => serde_json::from_value(value)
            .map_err(|e| ValidatorError::InvalidResponse(format!("entity array did not parse: {e}"))),
        Value::Object(ref object) => {
            if let Some(entities) = object.get("entities") {
                return serde_json::from_value(entities.clone()).map_err(|e| {
                    ValidatorError::InvalidResponse(format!("entities field did not parse: {e}"))
                });
            }
            if let Some(text) = generated_text(&value) {
                return extract_entity_array(text);
            }
            if let Some(text) = object.get("text").and_then(Value::as_str) {
                return extract_entity_array(text);
            }
            Err(ValidatorError::InvalidResponse(
                "response has no entities".to_string(),
            ))
        }
        _ => Err(ValidatorError::InvalidResponse(
            "response is not an object or array".to_string(),
        )),
    }
}

/// `candidates[0].content.parts[0].text` of a generateContent response
pub(crate) fn generated_text(value: &Value) -> Option<&str> {
    value
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
}

/// Timeouts map to [`ValidatorError::Timeout`], everything else to a
/// connection failure
pub(crate) fn transport_error(e: reqwest::Error, timeout_seconds: u64) -> ValidatorError {
    if e.is_timeout() {
        ValidatorError::Timeout(timeout_seconds)
    } else {
        ValidatorError::ConnectionFailed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deid::models::{DetectionSource, EntityType};

    const ARRAY: &str = r#"[{"type":"PERSON","text":"John Smith","start":8,"end":18,"confidence":0.95}]"#;

    #[test]
    fn test_extract_from_prose() {
        let raw = format!("Here are the entities:\n```json\n{ARRAY}\n```\nDone.");
        let entities = extract_entity_array(&raw).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].entity_type, EntityType::Person);
        assert_eq!(entities[0].source, DetectionSource::External);
    }

    #[test]
    fn test_extract_without_array_fails() {
        assert!(matches!(
            extract_entity_array("I could not find anything"),
            Err(ValidatorError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_extract_malformed_array_fails() {
        assert!(extract_entity_array("[{\"type\": \"PERSON\",]").is_err());
    }

    #[test]
    fn test_parse_bare_array() {
        assert_eq!(parse_response_body(ARRAY).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_entities_object() {
        let body = format!(r#"{{"entities": {ARRAY}}}"#);
        assert_eq!(parse_response_body(&body).unwrap()[0].text, "John Smith");
    }

    #[test]
    fn test_parse_generate_content_envelope() {
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": format!("```json\n{ARRAY}\n```")}]}}]
        })
        .to_string();
        assert_eq!(parse_response_body(&body).unwrap()[0].end, 18);
    }

    #[test]
    fn test_parse_plain_text_body() {
        let body = format!("result: {ARRAY}");
        assert_eq!(parse_response_body(&body).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_unusable_object() {
        assert!(parse_response_body(r#"{"status":"ok"}"#).is_err());
        assert!(parse_response_body("42").is_err());
    }

    #[test]
    fn test_missing_confidence_defaults() {
        let entities =
            extract_entity_array(r#"[{"type":"ID","text":"HN 1","start":0,"end":4}]"#).unwrap();
        assert_eq!(entities[0].confidence, 0.8);
    }
}
