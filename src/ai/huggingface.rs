use std::time::Duration;

use serde_json::{json, Value};

use crate::ai::{ProviderError, ProviderResult};
use crate::config::Config;
use crate::utils::http::get_http_client;
use crate::utils::timing::log_llm_timing;

/// Secondary text-only provider against the HuggingFace Inference API.
/// Attempted only when a credential is configured; one bounded-timeout
/// request per resolve.
pub struct HuggingFaceProvider {
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl HuggingFaceProvider {
    pub fn from_config(config: &Config) -> Self {
        HuggingFaceProvider {
            api_key: config.huggingface_api_key.clone(),
            model: config.huggingface_model.clone(),
            endpoint: config.huggingface_endpoint.clone(),
            timeout: Duration::from_secs(config.huggingface_timeout_seconds),
        }
    }

    #[cfg(test)]
    pub fn for_tests(api_key: &str) -> Self {
        HuggingFaceProvider {
            api_key: api_key.to_string(),
            model: "gpt2".to_string(),
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub async fn generate(&self, text: &str) -> ProviderResult {
        let token = self.api_key.trim();
        if token.is_empty() {
            return Err(ProviderError::MissingCredential);
        }

        let url = format!("{}/{}", self.endpoint.trim_end_matches('/'), self.model);
        let payload = json!({
            "inputs": text,
            "parameters": {
                "max_length": 200,
                "num_return_sequences": 1
            }
        });

        log_llm_timing("huggingface", &self.model, "generate", || async {
            let response = get_http_client()
                .post(&url)
                .bearer_auth(token)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await
                .map_err(|err| {
                    ProviderError::Request(format!("HuggingFace request failed: {err}"))
                })?;

            if !response.status().is_success() {
                return Err(ProviderError::Request(format!(
                    "HuggingFace request failed with status {}",
                    response.status()
                )));
            }

            let value = response.json::<Value>().await.map_err(|err| {
                ProviderError::Request(format!("HuggingFace response decode failed: {err}"))
            })?;

            match extract_generated_text(&value) {
                Some(text) => Ok(text),
                None => Err(ProviderError::EmptyResponse),
            }
        })
        .await
    }
}

/// The inference API answers with `[{"generated_text": ...}, ...]`; only
/// the first entry is used.
fn extract_generated_text(value: &Value) -> Option<String> {
    let text = value
        .as_array()?
        .first()?
        .get("generated_text")?
        .as_str()?;
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_credential_short_circuits() {
        let provider = HuggingFaceProvider::for_tests("");
        let err = provider.generate("hello").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential));
    }

    #[test]
    fn extracts_the_first_generated_text() {
        let value = json!([
            { "generated_text": "first" },
            { "generated_text": "second" }
        ]);
        assert_eq!(extract_generated_text(&value).as_deref(), Some("first"));
    }

    #[test]
    fn malformed_payloads_yield_none() {
        assert_eq!(extract_generated_text(&json!({})), None);
        assert_eq!(extract_generated_text(&json!([])), None);
        assert_eq!(extract_generated_text(&json!([{ "other": 1 }])), None);
        assert_eq!(extract_generated_text(&json!([{ "generated_text": "  " }])), None);
    }
}
