//! External validation stage against mock validator endpoints

use mockito::{Matcher, Server};
use thaideid::config::{secret_string, DeidConfig, ValidatorProvider};
use thaideid::deid::models::{
    AnonymizationMethod, EntityType, MaskKeyword, ProcessRequest, ProcessResponse,
};
use thaideid::deid::DeidEngine;

const TEXT: &str = "Patient John Smith, HN: 12345";

fn request() -> ProcessRequest {
    ProcessRequest::new(TEXT, AnonymizationMethod::Mask)
        .with_entity_types(vec![EntityType::Person, EntityType::Id])
        .with_mask_list(vec![MaskKeyword::new("John Smith", "PERSON")])
}

fn service_engine(endpoint: String) -> DeidEngine {
    let mut config = DeidConfig::default();
    config.validator.enabled = true;
    config.validator.endpoint = Some(endpoint);
    config.validator.timeout_seconds = 5;
    DeidEngine::from_config(&config).expect("Failed to build engine")
}

fn assert_same_response(a: &ProcessResponse, b: &ProcessResponse) {
    assert_eq!(a.deidentified_text, b.deidentified_text);
    assert_eq!(a.entities, b.entities);
    assert_eq!(a.language, b.language);
    assert_eq!(a.statistics, b.statistics);
}

#[tokio::test]
async fn test_server_error_falls_back_to_regex_result() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/validate")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let engine = service_engine(format!("{}/validate", server.url()));
    let validated = engine.process_with_validation(&request()).await.unwrap();
    let plain = engine.process(&request()).unwrap();

    mock.assert_async().await;
    assert_same_response(&validated, &plain);
    assert_eq!(validated.deidentified_text, "Patient [PERSON], [ID]");
}

#[tokio::test]
async fn test_unreachable_service_falls_back() {
    let engine = service_engine("http://127.0.0.1:1/validate".to_string());

    let validated = engine.process_with_validation(&request()).await.unwrap();
    let plain = engine.process(&request()).unwrap();

    assert_same_response(&validated, &plain);
}

#[tokio::test]
async fn test_malformed_body_falls_back() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/validate")
        .with_status(200)
        .with_body("I could not find any entities, sorry")
        .create_async()
        .await;

    let engine = service_engine(format!("{}/validate", server.url()));
    let validated = engine.process_with_validation(&request()).await.unwrap();

    assert_eq!(validated.deidentified_text, "Patient [PERSON], [ID]");
}

#[tokio::test]
async fn test_validator_entities_replace_candidates() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/validate")
        .match_body(Matcher::PartialJsonString(
            r#"{"text":"Patient John Smith, HN: 12345"}"#
                .to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"entities":[{"type":"PERSON","text":"John Smith","start":8,"end":18,"confidence":0.95}]}"#,
        )
        .create_async()
        .await;

    let engine = service_engine(format!("{}/validate", server.url()));
    let response = engine.process_with_validation(&request()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.entities.len(), 1);
    assert_eq!(response.deidentified_text, "Patient [PERSON], HN: 12345");
    assert_eq!(response.statistics.total_entities, 1);
}

#[tokio::test]
async fn test_validator_overlaps_are_merged() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/validate")
        .with_status(200)
        .with_body(
            r#"[{"type":"PERSON","text":"Smith","start":13,"end":18},
                {"type":"PERSON","text":"John Smith","start":8,"end":18}]"#,
        )
        .create_async()
        .await;

    let engine = service_engine(format!("{}/validate", server.url()));
    let response = engine.process_with_validation(&request()).await.unwrap();

    assert_eq!(response.entities.len(), 1);
    assert_eq!(response.entities[0].text, "John Smith");
    assert!(response.warnings.is_empty());
}

#[tokio::test]
async fn test_gemini_envelope_is_understood() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Regex("generateContent".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"candidates":[{"content":{"parts":[{"text":"```json\n[{\"type\":\"ID\",\"text\":\"HN: 12345\",\"start\":20,\"end\":29,\"confidence\":0.9}]\n```"}]}}]}"#,
        )
        .create_async()
        .await;

    let mut config = DeidConfig::default();
    config.validator.enabled = true;
    config.validator.provider = ValidatorProvider::Gemini;
    config.validator.endpoint = Some(server.url());
    config.validator.api_key = Some(secret_string("test-key".to_string()));
    let engine = DeidEngine::from_config(&config).unwrap();

    let response = engine.process_with_validation(&request()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.deidentified_text, "Patient John Smith, [ID]");
}

#[tokio::test]
async fn test_gemini_without_key_is_skipped() {
    let mut config = DeidConfig::default();
    config.validator.enabled = true;
    config.validator.provider = ValidatorProvider::Gemini;
    let engine = DeidEngine::from_config(&config).unwrap();

    assert!(engine.active_validator().is_none());
    let response = engine.process_with_validation(&request()).await.unwrap();
    assert_eq!(response.deidentified_text, "Patient [PERSON], [ID]");
}
