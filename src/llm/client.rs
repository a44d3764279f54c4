use async_trait::async_trait;
use log::warn;
use reqwest::{Client, StatusCode};

use crate::error::{FrgCheckError, Result};
use crate::llm::types::{
    default_safety_settings, Content, ErrorEnvelope, GenerateContentRequest, GenerationConfig,
    GenerateContentResponse, SystemInstruction,
};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Bound on how much of a raw error body is surfaced in error messages.
const ERROR_BODY_PREVIEW: usize = 200;

/// API key and model identifier, validated once at construction.
#[derive(Debug, Clone)]
pub struct Credentials {
    api_key: String,
    model: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into().trim().to_string();
        let model = model.into().trim().to_string();

        if api_key.is_empty() {
            return Err(FrgCheckError::Configuration(
                "API key is missing or blank".to_string(),
            ));
        }
        if model.is_empty() {
            return Err(FrgCheckError::Configuration(
                "model name is missing or blank".to_string(),
            ));
        }

        Ok(Self { api_key, model })
    }

    /// Reads `GEMINI_API_KEY` and `GEMINI_MODEL` from the environment; the
    /// model falls back to [`DEFAULT_MODEL`] when unset.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            FrgCheckError::Configuration("GEMINI_API_KEY is not set".to_string())
        })?;
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(api_key, model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Seam between the row checker and the completion endpoint, so tests can
/// substitute canned or failing evaluators.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Sends one single-turn check request and returns the model's textual
    /// JSON reply, trimmed.
    async fn evaluate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    credentials: Credentials,
    base_url: String,
}

impl GeminiClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            client: Client::new(),
            credentials,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Evaluator for GeminiClient {
    async fn evaluate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.credentials.model, self.credentials.api_key
        );

        let payload = GenerateContentRequest {
            contents: vec![Content::user(user_prompt)],
            system_instruction: SystemInstruction::text(system_prompt),
            generation_config: GenerationConfig::deterministic_json(),
            safety_settings: default_safety_settings(),
        };

        let response = self.client.post(&url).json(&payload).send().await?;
        let status = response.status();
        let body = response.text().await?;

        decode_response(status, &body)
    }
}

/// Decodes one `generateContent` exchange. Pure over (status, body) so the
/// whole contract is testable without a network.
pub(crate) fn decode_response(status: StatusCode, body: &str) -> Result<String> {
    if !status.is_success() {
        return Err(FrgCheckError::Transport {
            status: status.as_u16(),
            message: transport_message(body),
        });
    }

    if let Ok(envelope) = serde_json::from_str::<GenerateContentResponse>(body) {
        if let Some(text) = envelope.candidate_text() {
            return Ok(text.trim().to_string());
        }
        if let Some(reason) = envelope.block_reason() {
            return Err(FrgCheckError::Blocked {
                reason: reason.to_string(),
            });
        }
    }

    // Fallback decoding path: the primary envelope contract did not hold.
    // Kept separate and logged so schema drift stays visible.
    if let Some(inner) = extract_fenced_json(body) {
        warn!("Gemini envelope missing expected fields; extracted JSON from a fenced block");
        return Ok(inner.to_string());
    }

    Err(FrgCheckError::UnexpectedResponse(
        "response did not contain candidates[0].content.parts[0].text".to_string(),
    ))
}

/// Finds a ```json fenced block and returns its trimmed inner text.
pub(crate) fn extract_fenced_json(raw: &str) -> Option<&str> {
    let start = raw.find("```json")? + "```json".len();
    let rest = &raw[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

fn transport_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(message) = envelope.error.and_then(|detail| detail.message) {
            return message;
        }
    }
    truncate_preview(body)
}

fn truncate_preview(body: &str) -> String {
    if body.len() <= ERROR_BODY_PREVIEW {
        return body.to_string();
    }
    let mut end = ERROR_BODY_PREVIEW;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_reject_blank_values() {
        assert!(Credentials::new("", "gemini-2.5-flash").is_err());
        assert!(Credentials::new("   ", "gemini-2.5-flash").is_err());
        assert!(Credentials::new("key", "").is_err());
        let credentials = Credentials::new(" key ", " gemini-2.5-flash ").unwrap();
        assert_eq!(credentials.model(), "gemini-2.5-flash");
    }

    #[test]
    fn test_decode_success_envelope() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "  {\"error_id\":\"1001\",\"is_error_found\":false,\"reason\":\"問題なし\",\"suggestion\":\"\"}  "}]}
            }]
        }"#;
        let text = decode_response(StatusCode::OK, body).unwrap();
        assert!(text.starts_with('{'));
        assert!(text.ends_with('}'));
        assert!(text.contains("問題なし"));
    }

    #[test]
    fn test_decode_blocked_response() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let err = decode_response(StatusCode::OK, body).unwrap_err();
        match err {
            FrgCheckError::Blocked { reason } => assert_eq!(reason, "SAFETY"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_falls_back_to_fenced_json() {
        let body = "whatever came back: ```json\n{\"error_id\": \"2001\", \"is_error_found\": true, \"reason\": \"入力回路が不明\", \"suggestion\": \"入力を明記\"}\n``` trailing";
        let text = decode_response(StatusCode::OK, body).unwrap();
        assert_eq!(
            text,
            "{\"error_id\": \"2001\", \"is_error_found\": true, \"reason\": \"入力回路が不明\", \"suggestion\": \"入力を明記\"}"
        );
    }

    #[test]
    fn test_decode_unexpected_shape_without_fence() {
        let body = r#"{"candidates": []}"#;
        assert!(matches!(
            decode_response(StatusCode::OK, body),
            Err(FrgCheckError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_decode_transport_error_uses_provider_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid"}}"#;
        let err = decode_response(StatusCode::BAD_REQUEST, body).unwrap_err();
        match err {
            FrgCheckError::Transport { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_transport_error_truncates_raw_body() {
        let body = "x".repeat(500);
        let err = decode_response(StatusCode::INTERNAL_SERVER_ERROR, &body).unwrap_err();
        match err {
            FrgCheckError::Transport { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message.len(), ERROR_BODY_PREVIEW + 3);
                assert!(message.ends_with("..."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extract_fenced_json() {
        assert_eq!(
            extract_fenced_json("```json\n{\"a\": 1}\n```"),
            Some("{\"a\": 1}")
        );
        assert_eq!(extract_fenced_json("no fence here"), None);
    }
}
