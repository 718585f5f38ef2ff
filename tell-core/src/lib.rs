//! Scan & Tell story engine with an AI story assistant.
//!
//! This crate provides:
//! - Template-based story generation from an object name
//! - A storybook of saved stories
//! - A co-writing session with a text generation provider (OpenAI or Gemini)
//! - A headless driver for scripting and tests
//!
//! # Quick Start
//!
//! ```ignore
//! use tell_core::{AssistantSession, GameController, KeyStore, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut game = GameController::new();
//!     game.scan("lamp");
//!     game.save();
//!
//!     let config = SessionConfig::from_env()?;
//!     let keys = KeyStore::with_key(std::env::var("TELL_API_KEY")?);
//!     let provider = config.build_provider(&keys)?;
//!
//!     let mut session = AssistantSession::new(&config);
//!     session.start(provider.as_ref(), "a lamp that grants wishes").await;
//!     session.send(provider.as_ref(), "Make the lamp grumpy").await;
//!     for turn in session.transcript() {
//!         println!("{:?}: {}", turn.role, turn.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod config;
pub mod controller;
pub mod headless;
pub mod keystore;
pub mod story;
pub mod testing;

// Primary public API
pub use assistant::{
    AssistantSession, ConversationTurn, PendingRequest, Reply, ReplyTicket, RequestKind,
    SessionState, TurnRole,
};
pub use config::{ConfigError, ProviderKind, SessionConfig};
pub use controller::GameController;
pub use headless::{Command, HeadlessGame};
pub use keystore::KeyStore;
pub use llm::Provider;
pub use story::{Story, StoryTemplateEngine};
pub use testing::{MockProvider, MockReply};
