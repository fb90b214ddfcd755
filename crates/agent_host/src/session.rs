//! Chat session: the operations a front end calls.
//!
//! The session owns the conversation history. Every change is reported as a
//! `ChatEvent` on an optional channel so the UI can redraw on its own
//! schedule; the session never calls back into the UI.

use crate::assembler::assemble;
use providers::{CompletionOptions, OpenAIClient, TransportError};
use shared::conversation::{Attachment, ConversationHistory, Turn};
use shared::credentials::{is_valid, CredentialStore};
use shared::errors::{CompletionError, CredentialError};
use shared::settings::AppSettings;
use tokio::sync::mpsc::UnboundedSender;

/// State changes the UI may want to render
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    TurnAppended(Turn),
    /// A completion call started (true) or finished (false)
    Thinking(bool),
    Failed(CompletionError),
    Reset,
    CredentialChanged { present: bool },
}

pub struct ChatSession {
    history: ConversationHistory,
    client: OpenAIClient,
    options: CompletionOptions,
    events: Option<UnboundedSender<ChatEvent>>,
}

impl ChatSession {
    pub fn new(client: OpenAIClient, options: CompletionOptions) -> Self {
        Self {
            history: ConversationHistory::new(),
            client,
            options,
            events: None,
        }
    }

    /// Session talking to the endpoint configured in `settings`
    pub fn from_settings(
        settings: &AppSettings,
        credentials: CredentialStore,
    ) -> Result<Self, TransportError> {
        let client = OpenAIClient::new(credentials)?
            .with_base_url(settings.completion.base_url.as_deref());
        Ok(Self::new(
            client,
            CompletionOptions::from(&settings.completion),
        ))
    }

    pub fn with_events(mut self, tx: UnboundedSender<ChatEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    fn emit(&self, event: ChatEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    pub fn credentials(&self) -> &CredentialStore {
        self.client.credentials()
    }

    pub fn has_valid_credential(&self) -> bool {
        self.credentials().valid_credential().is_some()
    }

    /// Send a user message (with optional files) and wait for the answer.
    ///
    /// The user turn is recorded before the network call and stays in the
    /// history if the call fails; the assistant turn is only added on
    /// success. Taking `&mut self` keeps at most one call in flight.
    pub async fn send_message(
        &mut self,
        text: &str,
        files: Vec<Attachment>,
    ) -> Result<Turn, CompletionError> {
        let text = text.trim();
        let request = assemble(self.history.turns(), text, &files);

        let user_turn = Turn::user(text, files);
        self.history.push(user_turn.clone());
        self.emit(ChatEvent::TurnAppended(user_turn));

        self.emit(ChatEvent::Thinking(true));
        let result = self.client.complete(&request, &self.options).await;
        self.emit(ChatEvent::Thinking(false));

        match result {
            Ok(answer) => {
                let reply = Turn::assistant(answer);
                self.history.push(reply.clone());
                self.emit(ChatEvent::TurnAppended(reply.clone()));
                Ok(reply)
            }
            Err(err) => {
                tracing::warn!(kind = err.kind(), "message not answered");
                self.emit(ChatEvent::Failed(err.clone()));
                Err(err)
            }
        }
    }

    /// Back to a single greeting turn
    pub fn reset_conversation(&mut self) {
        self.history.reset();
        tracing::info!("conversation reset");
        self.emit(ChatEvent::Reset);
    }

    pub fn set_credential(&self, key: &str) -> Result<(), CredentialError> {
        let key = key.trim();
        if !is_valid(key) {
            return Err(CredentialError::InvalidFormat);
        }
        self.credentials().save(key)?;
        self.emit(ChatEvent::CredentialChanged { present: true });
        Ok(())
    }

    pub fn clear_credential(&self) -> Result<(), CredentialError> {
        self.credentials().clear()?;
        self.emit(ChatEvent::CredentialChanged { present: false });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use providers::{HttpResponse, Transport};
    use shared::conversation::Role;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tokio::sync::mpsc::unbounded_channel;

    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<HttpResponse>>,
        bodies: Mutex<Vec<serde_json::Value>>,
    }

    impl ScriptedTransport {
        fn with_replies(replies: &[(u16, &str)]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(
                    replies
                        .iter()
                        .map(|(status, body)| HttpResponse::new(*status, *body))
                        .collect(),
                ),
                bodies: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn post_json(
            &self,
            _url: &str,
            _bearer_token: &str,
            body: &serde_json::Value,
        ) -> Result<HttpResponse, TransportError> {
            self.bodies.lock().push(body.clone());
            self.replies
                .lock()
                .pop_front()
                .ok_or_else(|| TransportError("no scripted reply".into()))
        }
    }

    fn answer(text: &str) -> String {
        serde_json::json!({"choices": [{"message": {"role": "assistant", "content": text}}]})
            .to_string()
    }

    fn session_with(transport: Arc<ScriptedTransport>, key: Option<&str>) -> ChatSession {
        let creds = CredentialStore::in_memory();
        if let Some(key) = key {
            creds.save(key).unwrap();
        }
        ChatSession::new(
            OpenAIClient::with_transport(creds, transport),
            CompletionOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_successful_send_appends_both_turns() {
        let reply = answer("Hello to you too");
        let transport = ScriptedTransport::with_replies(&[(200, reply.as_str())]);
        let mut session = session_with(transport.clone(), Some("sk-session-key-01"));

        let turn = session.send_message("  hi  ", Vec::new()).await.unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(turn.content, "Hello to you too");

        let turns = session.history().turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1].role, Role::User);
        assert_eq!(turns[1].content, "hi");
        assert_eq!(turns[2].content, "Hello to you too");

        // Seed greeting is not sent on the first exchange
        let bodies = transport.bodies.lock();
        assert_eq!(
            bodies[0]["messages"],
            serde_json::json!([{"role": "user", "content": "hi"}])
        );
    }

    #[tokio::test]
    async fn test_failed_send_keeps_user_turn_only() {
        let transport = ScriptedTransport::with_replies(&[(401, "{}")]);
        let mut session = session_with(transport, Some("sk-revoked-key-01"));

        let err = session.send_message("hello", Vec::new()).await.unwrap_err();
        assert_eq!(err, CompletionError::InvalidCredential);
        assert!(err.requires_credential_prompt());

        let turns = session.history().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].role, Role::User);
    }

    #[tokio::test]
    async fn test_missing_credential_never_reaches_transport() {
        let transport = ScriptedTransport::with_replies(&[]);
        let mut session = session_with(transport.clone(), None);

        let err = session.send_message("hello", Vec::new()).await.unwrap_err();
        assert_eq!(err, CompletionError::MissingCredential);
        assert!(transport.bodies.lock().is_empty());
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_resend_after_failure_carries_history() {
        let reply = answer("Now it works");
        let transport =
            ScriptedTransport::with_replies(&[(429, "{}"), (200, reply.as_str())]);
        let mut session = session_with(transport.clone(), Some("sk-session-key-02"));

        let err = session.send_message("hello", Vec::new()).await.unwrap_err();
        assert_eq!(err, CompletionError::RateLimited);

        session.send_message("hello", Vec::new()).await.unwrap();
        assert_eq!(session.history().len(), 4);

        let bodies = transport.bodies.lock();
        let second = bodies[1]["messages"].as_array().unwrap();
        // seed + failed user turn + resent user turn
        assert_eq!(second.len(), 3);
        assert_eq!(second[0]["role"], "assistant");
    }

    #[tokio::test]
    async fn test_files_travel_with_the_turn() {
        let reply = answer("Looks like a shopping list");
        let transport = ScriptedTransport::with_replies(&[(200, reply.as_str())]);
        let mut session = session_with(transport.clone(), Some("sk-session-key-03"));

        let list = Attachment::new("list.txt", "eggs\nmilk", 9);
        session.send_message("", vec![list]).await.unwrap();

        assert_eq!(session.history().turns()[1].files.len(), 1);
        assert_eq!(session.history().turns()[1].content, "");

        let bodies = transport.bodies.lock();
        let messages = bodies[0]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        let user = messages[1]["content"].as_str().unwrap();
        assert!(user.starts_with("Please analyze these files and provide insights."));
        assert!(user.contains("--- FILE: list.txt ---\neggs\nmilk\n--- END FILE ---"));
    }

    #[tokio::test]
    async fn test_reset_twice_yields_same_seed() {
        let reply = answer("sure");
        let transport = ScriptedTransport::with_replies(&[(200, reply.as_str())]);
        let mut session = session_with(transport, Some("sk-session-key-04"));
        session.send_message("hi", Vec::new()).await.unwrap();

        session.reset_conversation();
        let first: Vec<(String, String)> = session
            .history()
            .turns()
            .iter()
            .map(|t| (t.id.clone(), t.content.clone()))
            .collect();
        session.reset_conversation();
        let second: Vec<(String, String)> = session
            .history()
            .turns()
            .iter()
            .map(|t| (t.id.clone(), t.content.clone()))
            .collect();

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[tokio::test]
    async fn test_credential_updates() {
        let session = session_with(ScriptedTransport::with_replies(&[]), None);
        assert!(!session.has_valid_credential());

        assert!(matches!(
            session.set_credential("abc"),
            Err(CredentialError::InvalidFormat)
        ));
        assert_eq!(session.credentials().get(), "");

        session.set_credential("  sk-fresh-key-0001 \n").unwrap();
        assert_eq!(session.credentials().get(), "sk-fresh-key-0001");
        assert!(session.has_valid_credential());

        session.clear_credential().unwrap();
        assert!(!session.has_valid_credential());
    }

    #[tokio::test]
    async fn test_events_follow_the_exchange() {
        let reply = answer("pong");
        let transport = ScriptedTransport::with_replies(&[(200, reply.as_str()), (500, "")]);
        let (tx, mut rx) = unbounded_channel();
        let mut session = session_with(transport, Some("sk-session-key-05")).with_events(tx);

        session.send_message("ping", Vec::new()).await.unwrap();
        let _ = session.send_message("ping again", Vec::new()).await;
        session.reset_conversation();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        assert!(matches!(&events[0], ChatEvent::TurnAppended(t) if t.content == "ping"));
        assert_eq!(events[1], ChatEvent::Thinking(true));
        assert_eq!(events[2], ChatEvent::Thinking(false));
        assert!(matches!(&events[3], ChatEvent::TurnAppended(t) if t.content == "pong"));
        assert!(matches!(&events[4], ChatEvent::TurnAppended(t) if t.content == "ping again"));
        assert!(matches!(&events[7], ChatEvent::Failed(CompletionError::Unknown { .. })));
        assert_eq!(events[8], ChatEvent::Reset);
        assert_eq!(events.len(), 9);
    }
}
