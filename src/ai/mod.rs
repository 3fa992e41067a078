pub mod gemini;
pub mod huggingface;
pub mod knowledge;
pub mod templates;

use tracing::{debug, warn};

use crate::config::CONFIG;
use gemini::GeminiProvider;
use huggingface::HuggingFaceProvider;

/// Outcome of a single provider attempt. Reasons are logged by the
/// resolver and never shown to the end user.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider is not ready")]
    NotReady,
    #[error("no API credential configured")]
    MissingCredential,
    #[error("provider returned an empty response")]
    EmptyResponse,
    #[error("{0}")]
    Request(String),
}

pub type ProviderResult = Result<String, ProviderError>;

const EMPTY_INPUT_PROMPT: &str = "I'm here to help! Please ask me something.";

/// Resolves a user message to a reply by walking a fixed fallback chain:
/// Gemini, then the knowledge base, then HuggingFace, then the template
/// responder. Always returns non-empty text; each provider is attempted
/// exactly once per call.
pub struct AiResponder {
    gemini: GeminiProvider,
    huggingface: HuggingFaceProvider,
}

impl AiResponder {
    pub fn new(gemini: GeminiProvider, huggingface: HuggingFaceProvider) -> Self {
        AiResponder { gemini, huggingface }
    }

    pub fn from_config() -> Self {
        AiResponder::new(
            GeminiProvider::from_config(&CONFIG),
            HuggingFaceProvider::from_config(&CONFIG),
        )
    }

    /// Attempts Gemini initialization and reports readiness. Safe to call
    /// repeatedly; the outcome of the first attempt is cached for the
    /// lifetime of the process.
    pub fn ensure_ready(&self) -> bool {
        self.gemini.ensure_initialized()
    }

    pub fn gemini_ready(&self) -> bool {
        self.gemini.is_ready()
    }

    pub async fn resolve(&self, text: &str, image: Option<&str>) -> String {
        if text.trim().is_empty() && image.is_none() {
            return EMPTY_INPUT_PROMPT.to_string();
        }

        if self.gemini.ensure_initialized() {
            match self.gemini.generate(text, image).await {
                Ok(reply) => return reply,
                Err(err) => warn!("Gemini generation failed: {err}; trying fallbacks"),
            }
        } else {
            debug!("Gemini not ready, skipping to fallbacks");
        }

        if let Some(content) = knowledge::lookup(text) {
            debug!("Knowledge base matched, returning stored document");
            return content.to_string();
        }

        match self.huggingface.generate(text).await {
            Ok(reply) => return reply,
            Err(err) => warn!("HuggingFace generation failed: {err}"),
        }

        debug!("All providers exhausted, using template responder");
        templates::respond(text, image.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_responder() -> AiResponder {
        AiResponder::new(
            GeminiProvider::for_tests(""),
            HuggingFaceProvider::for_tests(""),
        )
    }

    #[tokio::test]
    async fn empty_input_returns_the_fixed_prompt() {
        let responder = offline_responder();
        assert_eq!(responder.resolve("", None).await, EMPTY_INPUT_PROMPT);
        assert_eq!(responder.resolve("   ", None).await, EMPTY_INPUT_PROMPT);
    }

    #[tokio::test]
    async fn keyword_input_returns_the_stored_document_when_gemini_is_down() {
        let responder = offline_responder();
        let reply = responder.resolve("Tell me about react", None).await;
        assert_eq!(reply, knowledge::lookup("react").unwrap());
    }

    #[tokio::test]
    async fn unmatched_input_falls_through_to_the_template_responder() {
        let responder = offline_responder();
        let reply = responder.resolve("xyzzy plugh", None).await;
        assert_eq!(reply, templates::respond("xyzzy plugh", false));
    }

    #[tokio::test]
    async fn never_returns_an_empty_reply() {
        let responder = offline_responder();
        for input in ["", "hello", "thanks!", "Tell me about css", "???", "bye"] {
            let reply = responder.resolve(input, None).await;
            assert!(!reply.is_empty(), "empty reply for input {input:?}");
        }
        let reply = responder.resolve("", Some("data:image/png;base64,aGk=")).await;
        assert!(!reply.is_empty());
    }

    #[tokio::test]
    async fn image_without_textual_match_gets_image_guidance() {
        let responder = offline_responder();
        let reply = responder
            .resolve("qwertyuiop", Some("data:image/png;base64,aGk="))
            .await;
        assert_eq!(reply, templates::respond("qwertyuiop", true));
    }
}
