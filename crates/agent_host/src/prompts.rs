//! Fixed prompt text used when files are shared into the conversation.

use shared::conversation::Attachment;

/// System directive prepended whenever any turn carries files
pub const FILE_CONTEXT_DIRECTIVE: &str = "You are a helpful assistant. The user has shared the content of one or more files in this conversation. Each file appears between a '--- FILE: <name> ---' line and an '--- END FILE ---' line. You have access to that content: use it to answer the user's questions, and when you rely on a file, refer to it by its file name.";

/// Stands in for an empty user message that only carries files
pub const DEFAULT_FILE_INSTRUCTION: &str = "Please analyze these files and provide insights.";

pub const FILE_HEADER_PREFIX: &str = "--- FILE: ";
pub const FILE_FOOTER: &str = "--- END FILE ---";

/// Delimited block holding one file's content
pub fn file_block(file: &Attachment) -> String {
    format!(
        "{prefix}{name} ---\n{content}\n{footer}",
        prefix = FILE_HEADER_PREFIX,
        name = file.name,
        content = file.content,
        footer = FILE_FOOTER,
    )
}
