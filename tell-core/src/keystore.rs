//! Session-scoped API key holder.

use std::fmt;

/// Holds the provider API key for the lifetime of the session.
///
/// Nothing is persisted. An empty key means "not configured".
#[derive(Clone, Default, PartialEq, Eq)]
pub struct KeyStore {
    key: String,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `key`.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn get(&self) -> &str {
        &self.key
    }

    /// Replace the key. No validation is done.
    pub fn set(&mut self, value: impl Into<String>) {
        self.key = value.into();
    }

    pub fn is_configured(&self) -> bool {
        !self.key.is_empty()
    }

    /// The key with every character masked, for display in settings.
    pub fn masked(&self) -> String {
        "•".repeat(self.key.chars().count())
    }
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("configured", &self.is_configured())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let store = KeyStore::new();
        assert_eq!(store.get(), "");
        assert!(!store.is_configured());
    }

    #[test]
    fn test_set_then_get() {
        let mut store = KeyStore::new();
        store.set("sk-test");
        assert_eq!(store.get(), "sk-test");
        assert!(store.is_configured());

        store.set("");
        assert!(!store.is_configured());
    }

    #[test]
    fn test_debug_hides_key() {
        let store = KeyStore::with_key("sk-secret");
        let debug = format!("{store:?}");
        assert!(!debug.contains("sk-secret"));
        assert_eq!(store.masked().chars().count(), 9);
    }
}
