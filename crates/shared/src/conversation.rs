//! Conversation state: turns, file attachments and the ordered history.
//!
//! The history is owned by whoever drives the conversation (the chat
//! session). Turns are append-only; the only bulk mutation is a reset back
//! to the seeded greeting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SEED_TURN_ID: &str = "welcome";
pub const SEED_GREETING: &str = "Hello! How can I assist you today?";

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text content of a user-shared file, ready to be spliced into a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    /// Original file name, as shown to the user and the model
    pub name: String,
    /// Decoded text, possibly truncated with an omission marker
    pub content: String,
    /// Byte size of the source file before decoding or truncation
    pub size: u64,
}

impl Attachment {
    pub fn new(name: impl Into<String>, content: impl Into<String>, size: u64) -> Self {
        Self {
            id: format!("file-{}", Uuid::new_v4()),
            name: name.into(),
            content: content.into(),
            size,
        }
    }

    /// Size label for file chips, e.g. "1.5 KB"
    pub fn size_label(&self) -> String {
        format!("{:.1} KB", self.size as f64 / 1024.0)
    }
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<Attachment>,
}

impl Turn {
    fn with_role(role: Role, content: impl Into<String>, files: Vec<Attachment>) -> Self {
        Self {
            id: format!("{}-{}", role.as_str(), Uuid::new_v4()),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            files,
        }
    }

    pub fn user(content: impl Into<String>, files: Vec<Attachment>) -> Self {
        Self::with_role(Role::User, content, files)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content, Vec::new())
    }

    /// The greeting every fresh conversation starts with
    pub fn seed() -> Self {
        Self {
            id: SEED_TURN_ID.to_string(),
            role: Role::Assistant,
            content: SEED_GREETING.to_string(),
            timestamp: Utc::now(),
            files: Vec::new(),
        }
    }
}

/// Ordered, append-only turn history for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self {
            turns: vec![Turn::seed()],
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Replace everything with a single seed greeting
    pub fn reset(&mut self) {
        self.turns.clear();
        self.turns.push(Turn::seed());
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Only the seed greeting is present
    pub fn is_fresh(&self) -> bool {
        self.turns.len() <= 1
    }

    /// Export to JSON for persistence
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}
