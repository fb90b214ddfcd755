//! Agent Host - conversation logic between the UI and the completion provider
//!
//! This crate provides:
//! - Assembly of the completion request from history and attached files
//! - The chat session the UI drives (send, reset, credential updates)
//! - The draft composer holding files until the next send

pub mod assembler;
pub mod composer;
pub mod prompts;
pub mod session;

pub use assembler::assemble;
pub use composer::Composer;
pub use session::{ChatEvent, ChatSession};
