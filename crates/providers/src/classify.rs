//! Mapping of provider failure responses onto `CompletionError`.
//!
//! Everything vendor-specific about error shapes lives here. Supporting
//! another provider means another `ErrorClassifier`, nothing else.

use serde::Deserialize;
use shared::errors::CompletionError;

/// Turns a non-success HTTP response into a classified failure
pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, status: u16, body: &str) -> CompletionError;
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIErrorEnvelope {
    #[serde(default)]
    error: Option<OpenAIErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl OpenAIErrorBody {
    fn code(&self) -> Option<String> {
        match &self.code {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// OpenAI chat-completions error conventions
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenAiErrorClassifier;

impl OpenAiErrorClassifier {
    fn is_insufficient_quota(err: &OpenAIErrorBody, raw: &str) -> bool {
        let reason_matches = |s: &str| {
            let s = s.to_lowercase();
            s == "insufficient_quota" || s == "insufficient quota"
        };
        if err.code().as_deref().is_some_and(reason_matches)
            || err.error_type.as_deref().is_some_and(reason_matches)
        {
            return true;
        }
        let text = err.message.as_deref().unwrap_or(raw).to_lowercase();
        text.contains("insufficient_quota")
            || text.contains("insufficient quota")
            || text.contains("exceeded your current quota")
    }

    fn is_context_overflow(err: &OpenAIErrorBody, raw: &str) -> bool {
        if err.code().as_deref() == Some("context_length_exceeded") {
            return true;
        }
        let text = err.message.as_deref().unwrap_or(raw).to_lowercase();
        text.contains("context_length_exceeded")
            || text.contains("maximum context length")
            || text.contains("context length")
    }
}

impl ErrorClassifier for OpenAiErrorClassifier {
    fn classify(&self, status: u16, body: &str) -> CompletionError {
        let err = serde_json::from_str::<OpenAIErrorEnvelope>(body)
            .ok()
            .and_then(|e| e.error)
            .unwrap_or_default();

        match status {
            429 if Self::is_insufficient_quota(&err, body) => CompletionError::QuotaExceeded,
            429 => CompletionError::RateLimited,
            401 => CompletionError::InvalidCredential,
            400 if Self::is_context_overflow(&err, body) => CompletionError::ContextTooLarge,
            _ => {
                let detail = match err.message {
                    Some(message) if !message.trim().is_empty() => {
                        format!("HTTP {}: {}", status, message)
                    }
                    _ => {
                        let snippet: String = body.chars().take(800).collect();
                        if snippet.trim().is_empty() {
                            format!("HTTP {}", status)
                        } else {
                            format!("HTTP {}: {}", status, snippet)
                        }
                    }
                };
                CompletionError::unknown(detail)
            }
        }
    }
}
