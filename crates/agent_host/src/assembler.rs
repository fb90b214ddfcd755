//! Conversation assembly
//!
//! Builds the message list for one completion call from the current
//! history plus the turn being sent. File attachments are inlined into
//! their owning message as delimited blocks, and a single system directive
//! is prepended when any message carries files.

use crate::prompts::{file_block, DEFAULT_FILE_INSTRUCTION, FILE_CONTEXT_DIRECTIVE};
use shared::agent_api::{ChatMessage, CompletionRequest};
use shared::conversation::{Attachment, Role, Turn};

/// A turn projected down to what the request needs
struct Projected<'a> {
    role: Role,
    content: &'a str,
    files: &'a [Attachment],
}

/// Message text with every attachment appended as a file block
fn render_content(role: Role, content: &str, files: &[Attachment]) -> String {
    if files.is_empty() {
        return content.to_string();
    }

    let mut parts: Vec<String> = Vec::with_capacity(files.len() + 1);
    if !content.trim().is_empty() {
        parts.push(content.to_string());
    } else if role == Role::User {
        parts.push(DEFAULT_FILE_INSTRUCTION.to_string());
    }
    parts.extend(files.iter().map(file_block));
    parts.join("\n\n")
}

/// Assemble the completion request for sending `new_user_text`.
///
/// Prior turns are only included once the conversation has moved past the
/// seed greeting. The caller is responsible for appending the new user turn
/// to its own history.
pub fn assemble(
    history: &[Turn],
    new_user_text: &str,
    new_files: &[Attachment],
) -> CompletionRequest {
    let mut projected: Vec<Projected<'_>> = Vec::with_capacity(history.len() + 1);

    if history.len() > 1 {
        projected.extend(history.iter().map(|turn| Projected {
            role: turn.role,
            content: &turn.content,
            files: &turn.files,
        }));
    }
    projected.push(Projected {
        role: Role::User,
        content: new_user_text,
        files: new_files,
    });

    let any_files = projected.iter().any(|p| !p.files.is_empty());
    let mut messages = Vec::with_capacity(projected.len() + usize::from(any_files));
    if any_files {
        messages.push(ChatMessage::new(Role::System, FILE_CONTEXT_DIRECTIVE));
    }
    messages.extend(
        projected
            .iter()
            .map(|p| ChatMessage::new(p.role, render_content(p.role, p.content, p.files))),
    );

    tracing::debug!(
        messages = messages.len(),
        with_files = any_files,
        "assembled completion request"
    );

    CompletionRequest { messages }
}
