//! Local services: attachment ingestion and on-disk key-value storage.

pub mod file_ingest;
pub mod kv_store;

pub use file_ingest::{ingest, ingest_path, SourceFile, SUPPORTED_EXTENSIONS};
pub use kv_store::JsonFileStore;
