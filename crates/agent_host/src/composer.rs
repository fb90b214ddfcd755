//! Draft attachments waiting to go out with the next message.

use shared::conversation::Attachment;

#[derive(Debug, Default, Clone)]
pub struct Composer {
    pending: Vec<Attachment>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, file: Attachment) {
        self.pending.push(file);
    }

    /// Drop a pending file by id. Returns false when no such file is pending.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|f| f.id != id);
        self.pending.len() != before
    }

    pub fn pending(&self) -> &[Attachment] {
        &self.pending
    }

    /// A message goes out only with text or at least one file
    pub fn is_sendable(&self, text: &str) -> bool {
        !text.trim().is_empty() || !self.pending.is_empty()
    }

    /// Hand over every pending file, leaving the draft empty
    pub fn take(&mut self) -> Vec<Attachment> {
        std::mem::take(&mut self.pending)
    }
}
