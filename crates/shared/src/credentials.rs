//! API credential storage.
//!
//! A single credential string lives under a fixed key in a key-value
//! backend. The store is passed explicitly to whatever needs it; there is
//! no process-global key.

use anyhow::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Key the credential is persisted under
pub const CREDENTIAL_KEY: &str = "openai_api_key";

const CREDENTIAL_PREFIX: &str = "sk-";
const MIN_CREDENTIAL_LEN: usize = 10;

/// Persistent string key-value backend
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-lifetime backend, used by tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Format check for OpenAI-style secret keys.
///
/// True iff the trimmed key is non-empty, the key starts with `sk-` and is
/// longer than 10 characters.
pub fn is_valid(key: &str) -> bool {
    !key.trim().is_empty()
        && key.starts_with(CREDENTIAL_PREFIX)
        && key.chars().count() > MIN_CREDENTIAL_LEN
}

/// Handle to the single stored credential. Cheap to clone.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Store backed by memory only
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Stored credential, or an empty string when none is saved
    pub fn get(&self) -> String {
        self.backend.get(CREDENTIAL_KEY).unwrap_or_default()
    }

    pub fn save(&self, key: &str) -> Result<()> {
        self.backend.set(CREDENTIAL_KEY, key)?;
        tracing::info!("API credential saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.backend.remove(CREDENTIAL_KEY)?;
        tracing::info!("API credential cleared");
        Ok(())
    }

    pub fn is_valid(key: &str) -> bool {
        is_valid(key)
    }

    /// The stored credential, only if it passes the format check
    pub fn valid_credential(&self) -> Option<String> {
        let key = self.get();
        is_valid(&key).then_some(key)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("has_credential", &!self.get().is_empty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_format() {
        assert!(!is_valid(""));
        assert!(!is_valid("   "));
        assert!(!is_valid("abc"));
        assert!(!is_valid("pk-1234567890"));
        // Length boundary: 10 characters is too short, 11 passes
        assert!(!is_valid("sk-1234567"));
        assert!(is_valid("sk-12345678"));
        assert!(is_valid("sk-1234567890"));
    }

    #[test]
    fn test_absent_credential_is_empty() {
        let store = CredentialStore::in_memory();
        assert_eq!(store.get(), "");
        assert!(store.valid_credential().is_none());
    }

    #[test]
    fn test_save_overwrites_and_clear_erases() {
        let store = CredentialStore::in_memory();
        store.save("sk-first-key-000").unwrap();
        store.save("sk-second-key-00").unwrap();
        assert_eq!(store.get(), "sk-second-key-00");
        assert_eq!(store.valid_credential().as_deref(), Some("sk-second-key-00"));

        store.clear().unwrap();
        assert_eq!(store.get(), "");
        // Clearing twice is harmless
        store.clear().unwrap();
    }

    #[test]
    fn test_clones_share_backend() {
        let store = CredentialStore::in_memory();
        let other = store.clone();
        store.save("sk-shared-key-99").unwrap();
        assert_eq!(other.get(), "sk-shared-key-99");
    }

    #[test]
    fn test_debug_hides_secret() {
        let store = CredentialStore::in_memory();
        store.save("sk-do-not-print-me").unwrap();
        let shown = format!("{:?}", store);
        assert!(!shown.contains("do-not-print-me"));
    }
}
