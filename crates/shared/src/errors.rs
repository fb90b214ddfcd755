//! Failure taxonomy shared by ingestion, completion and credential handling.

/// File ingestion failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error(
        "Unsupported file type: {name}. Please upload a text-based file (txt, md, js, ts, json, etc.)"
    )]
    UnsupportedType { name: String },

    #[error("Failed to read file {name}: {reason}")]
    ReadError { name: String, reason: String },
}

/// Completion call failures, already classified
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("No API key is set. Please add your OpenAI API key to start chatting.")]
    MissingCredential,

    #[error("Your OpenAI API key was rejected. Please check the key and enter it again.")]
    InvalidCredential,

    #[error(
        "Your OpenAI account has run out of quota. Check your plan and billing details, or enter a different API key."
    )]
    QuotaExceeded,

    #[error("Too many requests right now. Please wait a moment and try again.")]
    RateLimited,

    #[error(
        "The conversation is too long for the model. Try removing attached files or clearing the conversation."
    )]
    ContextTooLarge,

    #[error("Failed to get a response from OpenAI: {detail}")]
    Unknown { detail: String },
}

impl CompletionError {
    pub fn unknown(detail: impl Into<String>) -> Self {
        CompletionError::Unknown {
            detail: detail.into(),
        }
    }

    /// Whether the UI should ask the user for a (new) API key.
    ///
    /// Quota exhaustion is included because the chat has always re-prompted
    /// on it, even though the key itself may be fine.
    pub fn requires_credential_prompt(&self) -> bool {
        matches!(
            self,
            CompletionError::InvalidCredential | CompletionError::QuotaExceeded
        )
    }

    /// Short stable name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::MissingCredential => "missing_credential",
            CompletionError::InvalidCredential => "invalid_credential",
            CompletionError::QuotaExceeded => "quota_exceeded",
            CompletionError::RateLimited => "rate_limited",
            CompletionError::ContextTooLarge => "context_too_large",
            CompletionError::Unknown { .. } => "unknown",
        }
    }
}

/// Credential updates coming from the UI
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("That doesn't look like an OpenAI API key. Keys start with \"sk-\".")]
    InvalidFormat,

    #[error("Could not store the API key: {0}")]
    Storage(#[from] anyhow::Error),
}
