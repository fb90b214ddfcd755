pub mod conversation;
pub mod credentials;
pub mod errors;

pub mod settings {
    use serde::{Deserialize, Serialize};

    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    pub const DEFAULT_MAX_FILE_CHARS: usize = 10_000;

    fn default_model() -> String {
        DEFAULT_MODEL.to_string()
    }

    fn default_temperature() -> f32 {
        DEFAULT_TEMPERATURE
    }

    fn default_max_file_chars() -> usize {
        DEFAULT_MAX_FILE_CHARS
    }

    /// Parameters for the chat-completion call
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct CompletionSettings {
        #[serde(default = "default_model")]
        pub model: String, // e.g., "gpt-4o-mini"
        #[serde(default = "default_temperature")]
        pub temperature: f32,
        #[serde(default)]
        pub max_tokens: Option<u32>,
        /// Override for self-hosted or proxied OpenAI-compatible endpoints
        #[serde(default)]
        pub base_url: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct AppSettings {
        #[serde(default)]
        pub completion: CompletionSettings,
        /// Characters of file text kept per attachment before truncation
        #[serde(default = "default_max_file_chars")]
        pub max_file_chars: usize,
    }

    impl Default for CompletionSettings {
        fn default() -> Self {
            Self {
                model: default_model(),
                temperature: DEFAULT_TEMPERATURE,
                max_tokens: None,
                base_url: None,
            }
        }
    }

    impl Default for AppSettings {
        fn default() -> Self {
            Self {
                completion: CompletionSettings::default(),
                max_file_chars: DEFAULT_MAX_FILE_CHARS,
            }
        }
    }
}

pub mod agent_api {
    use crate::conversation::Role;
    use serde::{Deserialize, Serialize};

    /// One role/content pair as the completion endpoint expects it
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ChatMessage {
        pub role: Role,
        pub content: String,
    }

    impl ChatMessage {
        pub fn new(role: Role, content: impl Into<String>) -> Self {
            Self {
                role,
                content: content.into(),
            }
        }
    }

    /// Ordered messages for a single completion call. Built fresh per call.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
    pub struct CompletionRequest {
        pub messages: Vec<ChatMessage>,
    }

    impl CompletionRequest {
        pub fn len(&self) -> usize {
            self.messages.len()
        }

        pub fn is_empty(&self) -> bool {
            self.messages.is_empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::settings::*;

    #[test]
    fn test_settings_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.completion.model, "gpt-4o-mini");
        assert_eq!(settings.completion.temperature, 0.7);
        assert_eq!(settings.completion.max_tokens, None);
        assert_eq!(settings.max_file_chars, 10_000);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let json = r#"{"completion": {"model": "gpt-4o"}}"#;
        let settings: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.completion.model, "gpt-4o");
        assert_eq!(settings.completion.temperature, 0.7);
        assert_eq!(settings.max_file_chars, 10_000);

        let empty: AppSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, AppSettings::default());
    }

    #[test]
    fn test_chat_message_wire_shape() {
        use super::agent_api::ChatMessage;
        use super::conversation::Role;

        let msg = ChatMessage::new(Role::System, "be brief");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, serde_json::json!({"role": "system", "content": "be brief"}));
    }
}
