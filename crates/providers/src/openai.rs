use serde::{Deserialize, Serialize};
use shared::agent_api::{ChatMessage, CompletionRequest};
use shared::credentials::CredentialStore;
use shared::errors::CompletionError;
use shared::settings::{CompletionSettings, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use std::sync::Arc;

use crate::classify::{ErrorClassifier, OpenAiErrorClassifier};
use crate::transport::{ReqwestTransport, Transport, TransportError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Returned when the provider answers without any message text
pub const EMPTY_COMPLETION_FALLBACK: &str = "Sorry, I could not generate a response.";

// ── Request types ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

// ── Response types ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

// ── Options ──────────────────────────────────────────────────────────

/// Per-call knobs; unset fields fall back to the defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionOptions {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

impl From<&CompletionSettings> for CompletionOptions {
    fn from(settings: &CompletionSettings) -> Self {
        Self {
            model: Some(settings.model.clone()),
            temperature: Some(settings.temperature),
            max_tokens: settings.max_tokens,
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Single-shot client for the chat-completions endpoint.
///
/// One call is one HTTP request: no retries, no streaming. The API key is
/// read from the credential store at call time, so key changes apply to
/// the next request without rebuilding the client.
pub struct OpenAIClient {
    transport: Arc<dyn Transport>,
    credentials: CredentialStore,
    classifier: Box<dyn ErrorClassifier>,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(credentials: CredentialStore) -> Result<Self, TransportError> {
        Ok(Self::with_transport(
            credentials,
            Arc::new(ReqwestTransport::new()?),
        ))
    }

    pub fn with_transport(credentials: CredentialStore, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            credentials,
            classifier: Box::new(OpenAiErrorClassifier),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: Option<&str>) -> Self {
        self.base_url = base_url
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        self
    }

    pub fn with_classifier(mut self, classifier: Box<dyn ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    pub async fn complete(
        &self,
        request: &CompletionRequest,
        options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        let api_key = self
            .credentials
            .valid_credential()
            .ok_or(CompletionError::MissingCredential)?;

        let req = OpenAIRequest {
            model: options.model(),
            messages: &request.messages,
            temperature: options.temperature(),
            max_tokens: options.max_tokens,
        };
        let body = serde_json::to_value(&req)
            .map_err(|e| CompletionError::unknown(format!("failed to encode request: {}", e)))?;

        tracing::debug!(
            model = req.model,
            messages = request.len(),
            max_tokens = ?req.max_tokens,
            "sending chat completion"
        );

        let resp = self
            .transport
            .post_json(&self.endpoint(), &api_key, &body)
            .await
            .map_err(|e| {
                tracing::warn!("chat completion transport failed: {}", e);
                CompletionError::unknown(e.to_string())
            })?;

        if !resp.is_success() {
            let err = self.classifier.classify(resp.status, &resp.body);
            tracing::warn!(status = resp.status, kind = err.kind(), "chat completion failed");
            return Err(err);
        }

        let parsed: OpenAIResponse = serde_json::from_str(&resp.body).map_err(|e| {
            tracing::warn!("malformed chat completion response: {}", e);
            CompletionError::unknown(format!("malformed response: {}", e))
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| EMPTY_COMPLETION_FALLBACK.to_string());
        Ok(text)
    }
}
