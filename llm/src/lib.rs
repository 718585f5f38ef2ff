//! Minimal chat completion client.
//!
//! This crate provides a focused client for text-only chat completion with:
//! - One [`Provider`] trait over interchangeable backends
//! - OpenAI Chat Completions ([`OpenAi`]) and Google Gemini ([`Gemini`])
//! - [`Chat`], a client-side session handle that keeps the conversation history

mod gemini;
mod openai;

pub use gemini::Gemini;
pub use openai::OpenAi;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when talking to a provider.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// A text generation backend.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send a completion request and return the full response.
    async fn complete(&self, request: Request) -> Result<Response, Error>;

    /// Short provider name used in logs.
    fn name(&self) -> &str;
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Turn a non-success HTTP response into an [`Error::Api`].
pub(crate) async fn api_error(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    Error::Api { status, message }
}

// ============================================================================
// Public types
// ============================================================================

/// A completion request.
#[derive(Debug, Clone)]
pub struct Request {
    pub model: Option<String>,
    pub max_tokens: usize,
    pub system: Option<String>,
    pub messages: Vec<Message>,
    pub temperature: Option<f32>,
}

impl Request {
    /// Create a new request with the given messages.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            model: None,
            max_tokens: 1024,
            system: None,
            messages,
            temperature: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// A completion response.
#[derive(Debug, Clone)]
pub struct Response {
    pub model: String,
    pub text: String,
    pub usage: Option<Usage>,
}

/// Token usage information, when the provider reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

// ============================================================================
// Chat session handle
// ============================================================================

/// An established conversation with a provider.
///
/// Providers are stateless over HTTP, so the handle carries the system prompt
/// and every exchange that completed successfully. Failed exchanges are never
/// recorded and therefore never replayed as context.
#[derive(Debug, Clone)]
pub struct Chat {
    system: String,
    history: Vec<Message>,
}

impl Chat {
    /// Start a conversation with the given system instruction.
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            history: Vec::new(),
        }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Build the request that sends `text` as the next user message.
    pub fn request_for(&self, text: &str) -> Request {
        let mut messages = self.history.clone();
        messages.push(Message::user(text));
        Request::new(messages).with_system(self.system.clone())
    }

    /// Record a completed exchange.
    pub fn record(&mut self, user: impl Into<String>, reply: impl Into<String>) {
        self.history.push(Message::user(user));
        self.history.push(Message::assistant(reply));
    }
}
