//! generateContent-style model validator
//!
//! Builds a de-identification review prompt and asks the model to return a
//! JSON array of entities. The array is pulled out of the first candidate's
//! text part.

use super::{extract_entity_array, generated_text, transport_error, EntityValidator};
use crate::config::{SecretString, ValidatorConfig};
use crate::deid::models::{Entity, MaskKeyword};
use crate::domain::ValidatorError;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

/// Default API base when `[validator].endpoint` is unset
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Client for a `models/{model}:generateContent` endpoint
pub struct GeminiValidator {
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
    temperature: f32,
    max_output_tokens: u32,
    timeout_seconds: u64,
    client: Client,
}

impl GeminiValidator {
    pub fn new(config: &ValidatorConfig) -> Result<Self, ValidatorError> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(10)))
            .build()
            .map_err(|e| ValidatorError::ConnectionFailed(format!("Failed to build HTTP client: {e}")))?;

        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Ok(Self {
            endpoint,
            model: config.model.clone(),
            api_key: config
                .api_key
                .clone()
                .filter(|key| !key.expose_secret().is_empty()),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            timeout_seconds: config.timeout_seconds,
            client,
        })
    }

    fn request_url(&self, key: &str) -> Result<Url, ValidatorError> {
        let mut url = Url::parse(&format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        ))
        .map_err(|e| ValidatorError::NotConfigured(format!("invalid endpoint: {e}")))?;
        url.query_pairs_mut().append_pair("key", key);
        Ok(url)
    }

    fn request_body(&self, prompt: String) -> Value {
        json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {
                "temperature": self.temperature,
                "maxOutputTokens": self.max_output_tokens,
            }
        })
    }
}

/// Review prompt sent to the model
pub fn build_prompt(text: &str, candidates: &[Entity], mask_list: &[MaskKeyword]) -> String {
    let keywords = if mask_list.is_empty() {
        "None".to_string()
    } else {
        mask_list
            .iter()
            .map(|m| format!("\"{}\" ({})", m.keyword, m.entity_type))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let candidates_json =
        serde_json::to_string_pretty(candidates).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"You are a de-identification expert for Thai and English medical records.

Review the entities detected in the text below, correct them and add any that were missed.

**Text:**
{text}

**Detected entities:**
{candidates_json}

**Custom keywords to detect:**
{keywords}

**Instructions:**
1. Keep, adjust or remove each detected entity
2. Add missed entities, in particular:
   - Names with titles (Mr., Ms., Dr., นาย, นาง, นพ.)
   - Names in context (born in, from, patient, doctor)
   - Dates written out ("December 1, 2023", "10 มิถุนายน 2564")
   - National IDs, passport numbers, insurance policy numbers
   - Thai addresses with their components (ชั้น, อาคาร, ถนน)
   - Companies ending in "Co., Ltd." and insurers
   - Phone numbers separated by "-", "‑" or spaces
3. Give every entity a confidence between 0.0 and 1.0
4. Treat every custom keyword as an entity to detect
5. Reply with ONLY a JSON array in this format:

[
  {{
    "type": "PERSON",
    "text": "exact text from the original",
    "start": 0,
    "end": 0,
    "confidence": 0.95
  }}
]

**Entity types:**
- PERSON: patient and clinician names, with their titles
- DATE: any date format
- LOCATION: cities, addresses, departments, rooms
- ID: national IDs, passports, medical record numbers, policy numbers
- CONTACT: phone numbers and e-mail addresses
- ORGANIZATION: hospitals, companies, insurers, government departments

**Never tag as PERSON:**
- Month names, weekday names, city names on their own
- Organization words such as Hospital, Clinic or Insurance
- Partial dates such as "December 1"

**Positions:**
- "start" and "end" are character offsets into the original text
- Do not change the original text
- Include every entity with confidence >= 0.5
- Return the JSON array and nothing else"#
    )
}

#[async_trait]
impl EntityValidator for GeminiValidator {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn validate(
        &self,
        text: &str,
        candidates: &[Entity],
        mask_list: &[MaskKeyword],
    ) -> Result<Vec<Entity>, ValidatorError> {
        let key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ValidatorError::NotConfigured("no API key".to_string()))?;
        let url = self.request_url(key.expose_secret().as_ref())?;
        let body = self.request_body(build_prompt(text, candidates, mask_list));

        tracing::debug!(
            model = %self.model,
            candidates = candidates.len(),
            "Calling generateContent validator"
        );

        let resp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e.without_url(), self.timeout_seconds))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ValidatorError::HttpStatus { status, body });
        }

        let payload: Value = resp
            .json()
            .await
            .map_err(|e| ValidatorError::InvalidResponse(e.without_url().to_string()))?;
        let generated = generated_text(&payload)
            .ok_or_else(|| ValidatorError::InvalidResponse("no text in model response".to_string()))?;

        extract_entity_array(generated)
    }
}
