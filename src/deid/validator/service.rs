//! Validator service client
//!
//! POSTs `{text, regexEntities, maskList}` to a validation endpoint and reads
//! the entity array back out of whatever envelope the service wraps it in.

use super::{parse_response_body, transport_error, EntityValidator};
use crate::config::{SecretString, ValidatorConfig};
use crate::deid::models::{Entity, MaskKeyword};
use crate::domain::ValidatorError;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationRequest<'a> {
    text: &'a str,
    regex_entities: &'a [Entity],
    mask_list: &'a [MaskKeyword],
}

/// Client for an HTTP validation service
pub struct ServiceValidator {
    endpoint: Option<String>,
    api_key: Option<SecretString>,
    timeout_seconds: u64,
    client: Client,
}

impl ServiceValidator {
    pub fn new(config: &ValidatorConfig) -> Result<Self, ValidatorError> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(10)))
            .build()
            .map_err(|e| ValidatorError::ConnectionFailed(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: config.endpoint.clone().filter(|e| !e.trim().is_empty()),
            api_key: config.api_key.clone(),
            timeout_seconds: config.timeout_seconds,
            client,
        })
    }
}

#[async_trait]
impl EntityValidator for ServiceValidator {
    fn name(&self) -> &'static str {
        "service"
    }

    fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn validate(
        &self,
        text: &str,
        candidates: &[Entity],
        mask_list: &[MaskKeyword],
    ) -> Result<Vec<Entity>, ValidatorError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| ValidatorError::NotConfigured("no endpoint".to_string()))?;

        let mut request = self.client.post(endpoint).json(&ValidationRequest {
            text,
            regex_entities: candidates,
            mask_list,
        });
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key.expose_secret().as_ref());
        }

        tracing::debug!(candidates = candidates.len(), "Calling validator service");

        let resp = request
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_seconds))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ValidatorError::HttpStatus { status, body });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| transport_error(e, self.timeout_seconds))?;
        let entities = parse_response_body(&body)?;

        tracing::debug!(
            candidates = candidates.len(),
            validated = entities.len(),
            "Validator service responded"
        );

        Ok(entities)
    }
}
