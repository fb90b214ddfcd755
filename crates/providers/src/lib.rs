//! Completion providers: the OpenAI chat-completions client, its HTTP
//! transport and the provider error classifier.

pub mod classify;
pub mod openai;
pub mod transport;

pub use classify::{ErrorClassifier, OpenAiErrorClassifier};
pub use openai::{CompletionOptions, OpenAIClient, EMPTY_COMPLETION_FALLBACK};
pub use transport::{HttpResponse, ReqwestTransport, Transport, TransportError};
