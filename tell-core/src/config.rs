//! Session configuration and provider selection.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use llm::{Gemini, OpenAi, Provider};
use thiserror::Error;

use crate::keystore::KeyStore;

/// Errors from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No API key configured - set one in settings or via TELL_API_KEY")]
    NoApiKey,

    #[error("Unknown provider '{0}' (expected 'openai' or 'gemini')")]
    UnknownProvider(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Which text generation backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Gemini,
}

impl ProviderKind {
    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o",
            ProviderKind::Gemini => "gemini-2.5-flash",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "gpt" => Ok(ProviderKind::OpenAi),
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Gemini => write!(f, "gemini"),
        }
    }
}

/// Configuration for the assistant side of a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Backend to use.
    pub provider: ProviderKind,

    /// Model override; the provider default is used when unset.
    pub model: Option<String>,

    /// Alternative API base URL (OpenAI-compatible servers, proxies).
    pub base_url: Option<String>,

    /// Maximum tokens per reply.
    pub max_tokens: usize,

    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            base_url: None,
            max_tokens: 1024,
            temperature: Some(0.8),
        }
    }
}

impl SessionConfig {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    /// Load overrides from `TELL_PROVIDER`, `TELL_MODEL`, `TELL_BASE_URL`
    /// and `TELL_MAX_TOKENS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(provider) = lookup("TELL_PROVIDER") {
            config.provider = provider.parse()?;
        }
        config.model = lookup("TELL_MODEL").filter(|m| !m.trim().is_empty());
        config.base_url = lookup("TELL_BASE_URL").filter(|u| !u.trim().is_empty());
        if let Some(tokens) = lookup("TELL_MAX_TOKENS") {
            config.max_tokens = tokens.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "TELL_MAX_TOKENS",
                value: tokens.clone(),
            })?;
        }

        Ok(config)
    }

    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// The model that will actually be used.
    pub fn effective_model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Build a provider client using the key currently in `keys`.
    pub fn build_provider(&self, keys: &KeyStore) -> Result<Arc<dyn Provider>, ConfigError> {
        if !keys.is_configured() {
            return Err(ConfigError::NoApiKey);
        }
        let model = self.effective_model().to_string();

        let provider: Arc<dyn Provider> = match self.provider {
            ProviderKind::OpenAi => {
                let mut client = OpenAi::new(keys.get()).with_model(model);
                if let Some(url) = &self.base_url {
                    client = client.with_base_url(url.clone());
                }
                Arc::new(client)
            }
            ProviderKind::Gemini => {
                let mut client = Gemini::new(keys.get()).with_model(model);
                if let Some(url) = &self.base_url {
                    client = client.with_base_url(url.clone());
                }
                Arc::new(client)
            }
        };
        Ok(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_provider_names() {
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" Gemini ".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert!(matches!(
            "claude".parse::<ProviderKind>(),
            Err(ConfigError::UnknownProvider(_))
        ));
        assert_eq!(ProviderKind::Gemini.to_string(), "gemini");
    }

    #[test]
    fn test_defaults_without_env() {
        let config = SessionConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.effective_model(), "gpt-4o");
        assert_eq!(config.max_tokens, 1024);
    }

    #[test]
    fn test_env_overrides() {
        let config = SessionConfig::from_lookup(lookup_from(&[
            ("TELL_PROVIDER", "gemini"),
            ("TELL_MODEL", ""),
            ("TELL_MAX_TOKENS", "300"),
        ]))
        .unwrap();
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.effective_model(), "gemini-2.5-flash");
        assert_eq!(config.max_tokens, 300);
    }

    #[test]
    fn test_bad_max_tokens() {
        let result = SessionConfig::from_lookup(lookup_from(&[("TELL_MAX_TOKENS", "lots")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_build_provider_requires_key() {
        let config = SessionConfig::default();
        assert!(matches!(
            config.build_provider(&KeyStore::new()),
            Err(ConfigError::NoApiKey)
        ));

        let provider = config
            .with_provider(ProviderKind::Gemini)
            .build_provider(&KeyStore::with_key("k"))
            .unwrap();
        assert_eq!(provider.name(), "gemini");
    }
}
