use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;

use super::*;
use super::gemini::{classify_status, extract_text};

fn profile() -> StudentProfile {
    StudentProfile {
        nisn: "0051234567".to_string(),
        name: "Budi".to_string(),
        birth_order: 2,
        sibling_count: 4,
        parent_occupation: "Farmer".to_string(),
        allowance: format_grouped(15_000, '.'),
        organization: "Scouts".to_string(),
        hobby: "Football".to_string(),
        attendance: 70.0,
        grade: 62.0,
        violations: 3,
        risk_score: Some(78.0),
        notes: "Often late on Mondays".to_string(),
    }
}

/// Records prompts and replies with a canned answer
struct StubGenerator {
    reply: Result<String, fn() -> NarrativeError>,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    fn ok(text: &str) -> Self {
        Self { reply: Ok(text.to_string()), prompts: Mutex::new(Vec::new()) }
    }

    fn failing(err: fn() -> NarrativeError) -> Self {
        Self { reply: Err(err), prompts: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(&self, prompt: &str) -> NarrativeResult<String> {
        self.prompts.lock().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(make) => Err(make()),
        }
    }
}

#[test]
fn test_format_grouped() {
    assert_eq!(format_grouped(0, '.'), "0");
    assert_eq!(format_grouped(999, '.'), "999");
    assert_eq!(format_grouped(1_000, '.'), "1.000");
    assert_eq!(format_grouped(15_000, '.'), "15.000");
    assert_eq!(format_grouped(1_234_567, ','), "1,234,567");
    assert_eq!(format_grouped(-50_000, '.'), "-50.000");
}

#[test]
fn test_prompt_contains_profile() {
    let prompt = render_prompt(&profile());
    assert!(prompt.contains("Name: Budi"));
    assert!(prompt.contains("child 2 of 4"));
    assert!(prompt.contains("allowance: 15.000"));
    assert!(prompt.contains("attendance 70%"));
    assert!(prompt.contains("Model risk score: 78%"));
    assert!(prompt.contains("\"Often late on Mondays\""));
}

#[test]
fn test_prompt_without_score() {
    let prompt = render_prompt(&StudentProfile { risk_score: None, ..profile() });
    assert!(prompt.contains("Model risk score: n/a%"));
}

#[tokio::test]
async fn test_generator_returns_text_verbatim() {
    let stub = Arc::new(StubGenerator::ok("* **Root cause:** money\n"));
    let generator = NarrativeGenerator::new(stub.clone());

    let text = generator.analyze(&profile()).await.unwrap();
    assert_eq!(text, "* **Root cause:** money\n");
    assert_eq!(stub.prompts.lock().len(), 1);
    assert_eq!(generator.backend_name(), "stub");
}

#[tokio::test]
async fn test_generator_surfaces_backend_errors() {
    let generator = NarrativeGenerator::new(Arc::new(StubGenerator::failing(|| NarrativeError::RateLimited)));
    let err = generator.analyze(&profile()).await.unwrap_err();
    assert!(matches!(err, NarrativeError::RateLimited));
    assert!(!err.is_not_configured());
}

#[test]
fn test_generator_separator() {
    let generator = NarrativeGenerator::new(Arc::new(StubGenerator::ok(""))).with_separator(',');
    assert_eq!(generator.separator(), ',');
    assert_eq!(generator.format_allowance(25_000), "25,000");
}

#[tokio::test]
async fn test_gemini_without_key_is_not_configured() {
    let client = GeminiClient::new(GeminiConfig::default()).unwrap();
    assert!(!client.is_configured());
    assert_eq!(client.config().model, DEFAULT_GEMINI_MODEL);

    let err = client.generate("hello").await.unwrap_err();
    assert!(err.is_not_configured());
}

#[test]
fn test_gemini_config_builders() {
    let config = GeminiConfig::default()
        .with_api_key("k")
        .with_model("gemini-pro")
        .with_temperature(5.0)
        .with_timeout(5);
    assert_eq!(config.api_key.as_deref(), Some("k"));
    assert_eq!(config.model, "gemini-pro");
    assert_eq!(config.temperature, 2.0);
    assert_eq!(config.timeout_secs, 5);
}

#[test]
fn test_extract_text_joins_parts() {
    let body = r#"{
        "candidates": [
            {"content": {"role": "model", "parts": [{"text": "* a\n"}, {"text": "* b"}]}},
            {"content": {"parts": [{"text": "ignored"}]}}
        ]
    }"#;
    assert_eq!(extract_text(body).unwrap(), "* a\n* b");
}

#[test]
fn test_extract_text_rejects_blocked_or_garbage() {
    let blocked = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
    match extract_text(blocked) {
        Err(NarrativeError::InvalidResponse(reason)) => assert_eq!(reason, "SAFETY"),
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(extract_text("not json"), Err(NarrativeError::InvalidResponse(_))));
    assert!(matches!(
        extract_text(r#"{"candidates": [{"content": {"parts": []}}]}"#),
        Err(NarrativeError::InvalidResponse(_))
    ));
}

#[test]
fn test_status_classification() {
    assert!(matches!(classify_status(StatusCode::UNAUTHORIZED, String::new()), NarrativeError::Authentication));
    assert!(matches!(classify_status(StatusCode::FORBIDDEN, String::new()), NarrativeError::Authentication));
    assert!(matches!(classify_status(StatusCode::TOO_MANY_REQUESTS, String::new()), NarrativeError::RateLimited));
    assert!(matches!(
        classify_status(StatusCode::BAD_REQUEST, r#"{"reason": "API_KEY_INVALID"}"#.to_string()),
        NarrativeError::Authentication
    ));
    assert!(matches!(
        classify_status(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string()),
        NarrativeError::Api { status: 500, .. }
    ));
}

#[test]
fn test_summary_drops_upstream_body() {
    let err = NarrativeError::Api { status: 500, body: "{\"error\":\"internal trace\"}".to_string() };
    assert_eq!(err.summary(), "narrative service returned 500");
    assert!(err.to_string().contains("internal trace"));

    let err = NarrativeError::Connection("dns failure for 10.0.0.7".to_string());
    assert_eq!(err.summary(), "cannot reach narrative service");
    assert_eq!(NarrativeError::RateLimited.summary(), NarrativeError::RateLimited.to_string());
}
