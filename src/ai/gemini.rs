use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::ai::{ProviderError, ProviderResult};
use crate::config::Config;
use crate::utils::http::get_http_client;
use crate::utils::timing::log_llm_timing;

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

/// Primary provider. Readiness is decided once per process from the
/// configured credential; a failed initialization is not re-attempted.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    timeout: Duration,
    temperature: f32,
    top_k: i32,
    top_p: f32,
    max_output_tokens: i32,
    ready: Mutex<Option<bool>>,
}

impl GeminiProvider {
    pub fn from_config(config: &Config) -> Self {
        GeminiProvider {
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            timeout: Duration::from_secs(config.gemini_timeout_seconds),
            temperature: config.gemini_temperature,
            top_k: config.gemini_top_k,
            top_p: config.gemini_top_p,
            max_output_tokens: config.gemini_max_output_tokens,
            ready: Mutex::new(None),
        }
    }

    #[cfg(test)]
    pub fn for_tests(api_key: &str) -> Self {
        GeminiProvider {
            api_key: api_key.to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout: Duration::from_secs(30),
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
            ready: Mutex::new(None),
        }
    }

    /// Idempotent lazy init: the first call decides readiness from the
    /// credential, later calls return the cached outcome.
    pub fn ensure_initialized(&self) -> bool {
        let mut state = self.ready.lock();
        if let Some(ready) = *state {
            return ready;
        }

        let ready = if self.api_key.trim().is_empty() {
            warn!("GEMINI_API_KEY not found in environment variables");
            false
        } else {
            info!("Gemini API initialized successfully");
            true
        };
        *state = Some(ready);
        ready
    }

    /// Cached readiness without triggering initialization.
    pub fn is_ready(&self) -> bool {
        (*self.ready.lock()).unwrap_or(false)
    }

    pub async fn generate(&self, text: &str, image: Option<&str>) -> ProviderResult {
        if !self.ensure_initialized() {
            return Err(ProviderError::NotReady);
        }

        let parts = build_user_parts(text, image);
        let payload = json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": {
                "temperature": self.temperature,
                "topK": self.top_k,
                "topP": self.top_p,
                "maxOutputTokens": self.max_output_tokens,
            },
        });

        log_llm_timing("gemini", &self.model, "generate", || async {
            let response = self.call_api(payload).await?;
            let text = extract_text_from_response(response);
            if text.trim().is_empty() {
                Err(ProviderError::EmptyResponse)
            } else {
                Ok(text)
            }
        })
        .await
    }

    async fn call_api(&self, payload: Value) -> Result<GeminiResponse, ProviderError> {
        let client = get_http_client();
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let response = client
            .post(&url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                ProviderError::Request(self.redact_api_key(&format!(
                    "Gemini request failed: {err} (timeout={}, connect={})",
                    err.is_timeout(),
                    err.is_connect()
                )))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let (message, body_summary) = summarize_error_body(&body);
            debug!(target: "llm.gemini", status = %status, body = %body_summary);
            let detail = message.unwrap_or(body_summary);
            return Err(ProviderError::Request(self.redact_api_key(&format!(
                "Gemini request failed with status {status}: {detail}"
            ))));
        }

        response
            .json::<GeminiResponse>()
            .await
            .map_err(|err| ProviderError::Request(format!("Gemini response decode failed: {err}")))
    }

    fn redact_api_key(&self, text: &str) -> String {
        let key = self.api_key.trim();
        if key.is_empty() {
            return text.to_string();
        }
        text.replace(key, "[redacted]")
    }
}

/// Strips a `data:<mime>;base64,` style prefix, leaving raw base64. Content
/// before the first comma is treated as the prefix; inputs without a comma
/// pass through untouched.
fn strip_data_url_prefix(payload: &str) -> &str {
    match payload.split_once(',') {
        Some((_, rest)) => rest,
        None => payload,
    }
}

fn decode_image_payload(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(strip_data_url_prefix(payload).trim())
}

fn detect_mime_type(data: &[u8]) -> Option<String> {
    infer::get(data).map(|kind| kind.mime_type().to_string())
}

/// Builds the request parts: always the text, plus inline image data when
/// the payload decodes. A malformed image degrades to a text-only request
/// instead of failing the attempt.
fn build_user_parts(text: &str, image: Option<&str>) -> Vec<Value> {
    let mut parts = vec![json!({ "text": text })];

    if let Some(payload) = image {
        match decode_image_payload(payload) {
            Ok(bytes) => {
                let mime_type =
                    detect_mime_type(&bytes).unwrap_or_else(|| "image/png".to_string());
                let encoded = general_purpose::STANDARD.encode(&bytes);
                parts.push(json!({
                    "inlineData": {
                        "mimeType": mime_type,
                        "data": encoded
                    }
                }));
            }
            Err(err) => {
                warn!("Image processing error: {err}; falling back to text-only request");
            }
        }
    }

    parts
}

fn extract_text_from_response(response: GeminiResponse) -> String {
    let mut text_parts = Vec::new();
    for candidate in response.candidates.unwrap_or_default() {
        if let Some(content) = candidate.content {
            for part in content.parts.unwrap_or_default() {
                if let Some(text) = part.text {
                    if !text.trim().is_empty() {
                        text_parts.push(text);
                    }
                }
            }
        }
    }
    text_parts.join("\n")
}

fn summarize_error_body(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (None, "empty response body".to_string());
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let message = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string());
        return (message, truncate_for_log(&value.to_string(), 2000));
    }

    (None, truncate_for_log(trimmed, 2000))
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_data_url_prefix_at_first_comma() {
        assert_eq!(strip_data_url_prefix("data:image/png;base64,AAA"), "AAA");
    }

    #[test]
    fn passes_raw_base64_through_unchanged() {
        assert_eq!(strip_data_url_prefix("aGVsbG8="), "aGVsbG8=");
    }

    #[test]
    fn decodes_a_data_url_payload() {
        let bytes = decode_image_payload("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn malformed_base64_degrades_to_text_only_parts() {
        let parts = build_user_parts("describe this", Some("data:image/png;base64,!!notb64!!"));
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["text"], "describe this");
    }

    #[test]
    fn valid_image_yields_text_and_inline_data_parts() {
        // Smallest PNG header so the MIME sniffer recognizes it.
        let png_header: &[u8] = &[
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
        ];
        let encoded = general_purpose::STANDARD.encode(png_header);
        let parts = build_user_parts("what is this", Some(&encoded));
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
    }

    #[test]
    fn initialization_outcome_is_cached() {
        let provider = GeminiProvider::for_tests("");
        assert!(!provider.ensure_initialized());
        assert!(!provider.ensure_initialized());
        assert!(!provider.is_ready());

        let provider = GeminiProvider::for_tests("test-key");
        assert!(!provider.is_ready());
        assert!(provider.ensure_initialized());
        assert!(provider.is_ready());
    }

    #[tokio::test]
    async fn generate_short_circuits_when_not_ready() {
        let provider = GeminiProvider::for_tests("");
        let err = provider.generate("hello", None).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotReady));
    }

    #[test]
    fn extracts_and_joins_candidate_text() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Paris is the capital of France." }] }
            }]
        }))
        .unwrap();
        assert_eq!(
            extract_text_from_response(response),
            "Paris is the capital of France."
        );
    }

    #[test]
    fn summarizes_structured_error_bodies() {
        let (message, _) =
            summarize_error_body(r#"{"error": {"message": "API key not valid"}}"#);
        assert_eq!(message.as_deref(), Some("API key not valid"));
    }
}
