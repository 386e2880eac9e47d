//! Response generation on top of the LLM backend
//!
//! Prepends the persona to every request and supports two input shapes: a
//! plain conversation, or a single vision turn carrying an image. Failures
//! come back as a typed [`GenerateError`]; the turn orchestrator turns them
//! into user-facing text.

mod image;

pub use image::{ImageAttachment, ImageError};

use crate::llm::{ContentBlock, LlmBackend, LlmError, LlmMessage, LlmRequest, MessageRole};
use crate::store::{Role, Turn};
use crate::system_prompt::Persona;
use thiserror::Error;

/// Reply used when no API key is configured
pub const CONFIG_ERROR_MESSAGE: &str = "⚠️ **Configuration Error**: OpenAI API key is missing. Set `OPENAI_API_KEY` in the environment or in a `.env` file and restart the server.";

/// Why a reply could not be generated
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no LLM credential configured")]
    NotConfigured,
    #[error(transparent)]
    Upstream(#[from] LlmError),
}

impl GenerateError {
    /// Text shown to the user in place of a model reply
    pub fn user_message(&self) -> String {
        match self {
            GenerateError::NotConfigured => CONFIG_ERROR_MESSAGE.to_string(),
            GenerateError::Upstream(e) => format!("Error connecting to AI: {e}"),
        }
    }
}

/// What the model should answer
#[derive(Debug, Clone, Copy)]
pub enum GenerationInput<'a> {
    /// Prior turns, oldest first, ending with the current user turn
    Conversation(&'a [Turn]),
    /// One stateless user turn with an attached image; no history
    Vision {
        text: &'a str,
        image: &'a ImageAttachment,
    },
}

/// Wraps the backend with the persona and sampling settings
pub struct ResponseGenerator {
    backend: LlmBackend,
    persona: Persona,
    temperature: f32,
}

impl ResponseGenerator {
    pub fn new(backend: LlmBackend, persona: Persona, temperature: f32) -> Self {
        Self {
            backend,
            persona,
            temperature,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.service().is_some()
    }

    pub fn model_id(&self) -> Option<&str> {
        self.backend.service().map(|backend| backend.model_id())
    }

    pub async fn generate(&self, input: GenerationInput<'_>) -> Result<String, GenerateError> {
        let backend = match &self.backend {
            LlmBackend::Ready(service) => service,
            LlmBackend::MissingKey => return Err(GenerateError::NotConfigured),
            // Surfaced like any other upstream failure so the key isn't reported missing
            LlmBackend::Failed(e) => return Err(e.clone().into()),
        };

        let messages = match input {
            GenerationInput::Conversation(turns) => turns.iter().map(turn_to_message).collect(),
            GenerationInput::Vision { text, image } => vec![LlmMessage {
                role: MessageRole::User,
                content: vec![ContentBlock::text(text), image.to_content_block()],
            }],
        };

        let request = LlmRequest {
            system: Some(self.persona.as_str().to_string()),
            messages,
            max_tokens: None,
            temperature: Some(self.temperature),
        };

        let text = backend.complete(&request).await?.text();
        if text.trim().is_empty() {
            return Err(LlmError::malformed("Model returned an empty completion").into());
        }
        Ok(text)
    }
}

fn turn_to_message(turn: &Turn) -> LlmMessage {
    match turn.role {
        Role::User => LlmMessage::user(turn.content.clone()),
        Role::Assistant => LlmMessage::assistant(turn.content.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmErrorKind, LlmService};
    use crate::testing::{text_response, MockLlmClient};
    use std::sync::Arc;

    fn generator(mock: &Arc<MockLlmClient>) -> ResponseGenerator {
        let backend: Arc<dyn LlmService> = mock.clone();
        ResponseGenerator::new(backend.into(), Persona::new("You are a test persona."), 0.7)
    }

    fn image() -> ImageAttachment {
        ImageAttachment {
            media_type: "image/png".to_string(),
            data: "iVBORw0KGgo=".to_string(),
        }
    }

    #[tokio::test]
    async fn test_persona_is_system_message() {
        let mock = Arc::new(MockLlmClient::new("mock"));
        mock.queue_response(text_response("Hi there"));

        let turns = vec![Turn::user("Hello")];
        let reply = generator(&mock)
            .generate(GenerationInput::Conversation(&turns))
            .await
            .unwrap();

        assert_eq!(reply, "Hi there");
        let requests = mock.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system.as_deref(), Some("You are a test persona."));
        assert_eq!(requests[0].temperature, Some(0.7));
    }

    #[tokio::test]
    async fn test_conversation_roles_and_order_preserved() {
        let mock = Arc::new(MockLlmClient::new("mock"));
        mock.queue_response(text_response("ok"));

        let turns = vec![
            Turn::user("first"),
            Turn::assistant("second"),
            Turn::user("third"),
        ];
        generator(&mock)
            .generate(GenerationInput::Conversation(&turns))
            .await
            .unwrap();

        let request = &mock.recorded_requests()[0];
        let roles: Vec<_> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::User]
        );
        assert_eq!(request.messages[2].text(), "third");
        assert!(!request.has_image());
    }

    #[tokio::test]
    async fn test_vision_is_single_message_with_image() {
        let mock = Arc::new(MockLlmClient::new("mock"));
        mock.queue_response(text_response("It is an X-ray."));

        let image = image();
        generator(&mock)
            .generate(GenerationInput::Vision {
                text: "What is this?",
                image: &image,
            })
            .await
            .unwrap();

        let request = &mock.recorded_requests()[0];
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, MessageRole::User);
        assert_eq!(request.messages[0].text(), "What is this?");
        assert!(request.has_image());
    }

    #[tokio::test]
    async fn test_unconfigured_returns_config_error() {
        let generator = ResponseGenerator::new(LlmBackend::MissingKey, Persona::default(), 0.7);
        let turns = vec![Turn::user("Hello")];

        let err = generator
            .generate(GenerationInput::Conversation(&turns))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerateError::NotConfigured));
        assert_eq!(err.user_message(), CONFIG_ERROR_MESSAGE);
        assert!(!generator.is_configured());
        assert_eq!(generator.model_id(), None);
    }

    #[tokio::test]
    async fn test_upstream_error_is_described() {
        let mock = Arc::new(MockLlmClient::new("mock"));
        mock.queue_error(LlmError::rate_limit("Rate limit exceeded: slow down"));

        let turns = vec![Turn::user("Hello")];
        let err = generator(&mock)
            .generate(GenerationInput::Conversation(&turns))
            .await
            .unwrap_err();

        assert_eq!(
            err.user_message(),
            "Error connecting to AI: Rate limit exceeded: slow down"
        );
    }

    #[tokio::test]
    async fn test_blank_completion_is_malformed() {
        let mock = Arc::new(MockLlmClient::new("mock"));
        mock.queue_response(text_response("   "));

        let turns = vec![Turn::user("Hello")];
        let err = generator(&mock)
            .generate(GenerationInput::Conversation(&turns))
            .await
            .unwrap_err();

        match err {
            GenerateError::Upstream(e) => assert_eq!(e.kind, LlmErrorKind::MalformedResponse),
            GenerateError::NotConfigured => panic!("expected upstream error"),
        }
    }

    #[tokio::test]
    async fn test_failed_backend_is_upstream_error_not_missing_key() {
        let generator = ResponseGenerator::new(
            LlmBackend::Failed(LlmError::unknown("Failed to create HTTP client: no TLS backend")),
            Persona::default(),
            0.7,
        );
        let turns = vec![Turn::user("Hello")];

        let err = generator
            .generate(GenerationInput::Conversation(&turns))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerateError::Upstream(_)));
        assert_eq!(
            err.user_message(),
            "Error connecting to AI: Failed to create HTTP client: no TLS backend"
        );
        assert!(!generator.is_configured());
    }
}
