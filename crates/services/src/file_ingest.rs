//! File ingestion for chat attachments.
//!
//! Only plain-text formats are accepted. The extension is checked before
//! any bytes are read, text is decoded as UTF-8 and long files are cut to a
//! character budget with a marker saying how much was dropped.

use shared::conversation::Attachment;
use shared::errors::IngestError;
use std::path::Path;

pub use shared::settings::DEFAULT_MAX_FILE_CHARS;

/// Extensions accepted for attachment (compared lowercase)
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "txt", "md", "js", "jsx", "ts", "tsx", "json", "html", "css", "csv",
];

/// A file handed over by the UI: name, byte size and raw content
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }
}

/// Substring after the last `.`, or empty when the name has none
pub fn file_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => "",
    }
}

pub fn is_supported(name: &str) -> bool {
    let ext = file_extension(name).to_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}

fn check_supported(name: &str) -> Result<(), IngestError> {
    if is_supported(name) {
        Ok(())
    } else {
        tracing::warn!(file = name, "rejected unsupported file type");
        Err(IngestError::UnsupportedType {
            name: name.to_string(),
        })
    }
}

/// Cut `content` to `max_len` characters, appending an omission marker
pub fn truncate_content(content: &str, max_len: usize) -> String {
    let total = content.chars().count();
    if total <= max_len {
        return content.to_string();
    }

    let cut = content
        .char_indices()
        .nth(max_len)
        .map(|(idx, _)| idx)
        .unwrap_or(content.len());
    let omitted = total - max_len;

    format!(
        "{}\n\n[Content truncated: {} characters omitted due to length]",
        &content[..cut],
        omitted
    )
}

/// Turn an uploaded file into an attachment
pub fn ingest(file: SourceFile, max_len: usize) -> Result<Attachment, IngestError> {
    check_supported(&file.name)?;

    let SourceFile { name, size, bytes } = file;
    let text = String::from_utf8(bytes).map_err(|e| IngestError::ReadError {
        name: name.clone(),
        reason: format!("not valid UTF-8 text ({})", e.utf8_error()),
    })?;

    let content = truncate_content(&text, max_len);
    if content.len() != text.len() {
        tracing::debug!(file = %name, max_len, "attachment truncated");
    }
    tracing::info!(file = %name, size, "file attached");

    Ok(Attachment::new(name, content, size))
}

/// Read a file from disk and ingest it.
///
/// The type check runs first, so unsupported files are never opened.
pub async fn ingest_path(path: &Path, max_len: usize) -> Result<Attachment, IngestError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());

    check_supported(&name)?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| IngestError::ReadError {
            name: name.clone(),
            reason: e.to_string(),
        })?;

    ingest(SourceFile::new(name, bytes), max_len)
}
