//! Headless interface for programmatic use.
//!
//! This module drives the game controller and the story assistant from plain
//! text lines. It's designed for:
//! - Automated testing against a scripted provider
//! - Piping a session through stdin/stdout
//!
//! # Example
//!
//! ```ignore
//! use tell_core::headless::{Command, HeadlessGame};
//! use tell_core::SessionConfig;
//!
//! # async fn run() {
//! let mut game = HeadlessGame::new(SessionConfig::default());
//! for line in ["#scan lamp", "#save", "#book"] {
//!     if let Some(command) = Command::parse(line) {
//!         let output = game.execute(command).await;
//!         for line in output.lines {
//!             println!("{line}");
//!         }
//!     }
//! }
//! # }
//! ```

use std::sync::Arc;

use llm::Provider;
use rand::rngs::StdRng;
use rand::Rng;

use crate::assistant::{AssistantSession, ConversationTurn, TurnRole};
use crate::config::{ConfigError, SessionConfig};
use crate::controller::GameController;
use crate::keystore::KeyStore;

/// Help text listing every command.
pub const HELP: &[&str] = &[
    "  #scan <object>   - Generate a story about an object",
    "  #save            - Save the current story to the storybook",
    "  #story           - Show the current story",
    "  #book [json]     - List the storybook",
    "  #key [value]     - Set (or clear) the API key",
    "  #settings        - Toggle the settings panel",
    "  #assist [idea]   - Start a story session (defaults to the object name)",
    "  #complete        - Ask for a conclusion and close the session",
    "  #new             - Discard the story session",
    "  #status          - Show current status",
    "  #help            - Show this help",
    "  #quit            - Exit",
    "  (anything else is sent to the story assistant)",
];

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Scan(String),
    Save,
    Story,
    Book { json: bool },
    Key(String),
    Settings,
    Assist(Option<String>),
    Complete,
    NewSession,
    Status,
    Help,
    Quit,
    /// Free text for the assistant.
    Say(String),
    Unknown(String),
}

impl Command {
    /// Parse one line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let Some(rest) = line.strip_prefix('#') else {
            return Some(Command::Say(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match name.to_lowercase().as_str() {
            "scan" => Command::Scan(arg.to_string()),
            "save" => Command::Save,
            "story" => Command::Story,
            "book" => Command::Book {
                json: arg.eq_ignore_ascii_case("json"),
            },
            "key" => Command::Key(arg.to_string()),
            "settings" => Command::Settings,
            "assist" => Command::Assist((!arg.is_empty()).then(|| arg.to_string())),
            "complete" => Command::Complete,
            "new" => Command::NewSession,
            "status" => Command::Status,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }
}

/// Lines produced by one command.
#[derive(Debug, Default)]
pub struct Output {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Output {
    fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    fn error(message: impl std::fmt::Display) -> Self {
        Self::default().line(format!("[ERROR] {message}"))
    }
}

/// A game plus story assistant without any UI.
pub struct HeadlessGame<R = StdRng> {
    controller: GameController<R>,
    keys: KeyStore,
    config: SessionConfig,
    assistant: AssistantSession,
    provider: Option<Arc<dyn Provider>>,
}

impl HeadlessGame<StdRng> {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_controller(config, GameController::new())
    }
}

impl<R: Rng> HeadlessGame<R> {
    /// Create a game around an existing controller (e.g. seeded).
    pub fn with_controller(config: SessionConfig, controller: GameController<R>) -> Self {
        Self {
            controller,
            keys: KeyStore::new(),
            assistant: AssistantSession::new(&config),
            config,
            provider: None,
        }
    }

    /// Use this provider instead of building one from the configuration.
    ///
    /// The API key is still required.
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.keys.set(key);
        self
    }

    pub fn controller(&self) -> &GameController<R> {
        &self.controller
    }

    pub fn assistant(&self) -> &AssistantSession {
        &self.assistant
    }

    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    fn provider(&self) -> Result<Arc<dyn Provider>, ConfigError> {
        if !self.keys.is_configured() {
            return Err(ConfigError::NoApiKey);
        }
        match &self.provider {
            Some(provider) => Ok(Arc::clone(provider)),
            None => self.config.build_provider(&self.keys),
        }
    }

    /// Run one command.
    pub async fn execute(&mut self, command: Command) -> Output {
        match command {
            Command::Scan(name) => {
                if !self.controller.scan(&name) {
                    return Output::error("Usage: #scan <object>");
                }
                self.controller.set_input(name);
                self.story_output()
            }
            Command::Save => {
                if self.controller.save() {
                    Output::default().line(format!(
                        "[SAVED] Storybook now has {} stories",
                        self.controller.storybook().len()
                    ))
                } else {
                    Output::error("Nothing to save - scan an object first")
                }
            }
            Command::Story => match self.controller.current_story() {
                Some(_) => self.story_output(),
                None => Output::default().line("[STORY] (none)"),
            },
            Command::Book { json } => self.book_output(json),
            Command::Key(value) => {
                self.keys.set(value);
                if self.keys.is_configured() {
                    Output::default().line("[SETTINGS] API key set")
                } else {
                    Output::default().line("[SETTINGS] API key cleared")
                }
            }
            Command::Settings => {
                self.controller.toggle_settings();
                let visible = if self.controller.settings_visible() { "shown" } else { "hidden" };
                let key = if self.keys.is_configured() {
                    self.keys.masked()
                } else {
                    "(not set)".to_string()
                };
                Output::default()
                    .line(format!("[SETTINGS] Panel {visible}"))
                    .line(format!("  Provider: {} ({})", self.config.provider, self.config.effective_model()))
                    .line(format!("  API key: {key}"))
            }
            Command::Assist(idea) => self.assist(idea).await,
            Command::Say(text) => self.say(&text).await,
            Command::Complete => self.complete().await,
            Command::NewSession => {
                self.assistant = AssistantSession::new(&self.config);
                Output::default().line("[ASSISTANT] Session discarded")
            }
            Command::Status => self.status_output(),
            Command::Help => {
                let mut output = Output::default().line("[HELP]");
                output.lines.extend(HELP.iter().map(|l| l.to_string()));
                output
            }
            Command::Quit => Output {
                lines: vec!["Goodbye!".to_string()],
                quit: true,
            },
            Command::Unknown(name) => {
                Output::error(format!("Unknown command '#{name}'. Type #help for help."))
            }
        }
    }

    async fn assist(&mut self, idea: Option<String>) -> Output {
        let provider = match self.provider() {
            Ok(p) => p,
            Err(e) => return Output::error(e),
        };
        if self.assistant.is_active() || self.assistant.is_completed() {
            return Output::error("A story session already exists - use #new to discard it");
        }

        let idea = idea.unwrap_or_else(|| self.controller.input().to_string());
        if idea.trim().is_empty() {
            return Output::error("Usage: #assist <idea> (or #scan an object first)");
        }

        let before = self.assistant.transcript().len();
        self.assistant.start(provider.as_ref(), &idea).await;
        self.turns_since(before)
    }

    async fn say(&mut self, text: &str) -> Output {
        let provider = match self.provider() {
            Ok(p) => p,
            Err(e) => return Output::error(e),
        };
        if self.assistant.is_completed() {
            return Output::error("The story session is complete - use #new to start over");
        }
        if !self.assistant.is_active() {
            return Output::error("No story session - start one with #assist <idea>");
        }

        let before = self.assistant.transcript().len();
        self.assistant.send(provider.as_ref(), text).await;
        self.turns_since(before)
    }

    async fn complete(&mut self) -> Output {
        if self.assistant.is_completed() {
            return Output::error("The story session is already complete");
        }
        if !self.assistant.can_complete() {
            return Output::error("No story session to complete - start one with #assist <idea>");
        }
        let provider = match self.provider() {
            Ok(p) => p,
            Err(e) => return Output::error(e),
        };

        let before = self.assistant.transcript().len();
        self.assistant.complete(provider.as_ref()).await;

        let mut output = self.turns_since(before);
        output
            .lines
            .push("[COMPLETE] Your story building session has concluded!".to_string());
        output
    }

    fn turns_since(&self, start: usize) -> Output {
        let mut output = Output::default();
        for turn in &self.assistant.transcript()[start..] {
            output.lines.push(format_turn(turn));
        }
        output
    }

    fn story_output(&self) -> Output {
        match self.controller.current_story() {
            Some(story) => Output::default()
                .line(format!("[STORY] {}", story.title))
                .line(story.content.clone()),
            None => Output::default(),
        }
    }

    fn book_output(&self, json: bool) -> Output {
        let book = self.controller.storybook();
        if json {
            return match serde_json::to_string_pretty(book) {
                Ok(text) => Output::default().line(text),
                Err(e) => Output::error(e),
            };
        }

        let mut output = Output::default().line(format!("[BOOK] {} stories", book.len()));
        for (i, story) in book.iter().enumerate() {
            output
                .lines
                .push(format!("  {}. {}: {}", i + 1, story.title, story.content));
        }
        output
    }

    fn status_output(&self) -> Output {
        let story = self
            .controller
            .current_story()
            .map(|s| s.title.clone())
            .unwrap_or_else(|| "(none)".to_string());
        Output::default()
            .line("[STATUS]")
            .line(format!("  Current story: {story}"))
            .line(format!("  Storybook: {} stories", self.controller.storybook().len()))
            .line(format!(
                "  API key: {}",
                if self.keys.is_configured() { "configured" } else { "not configured" }
            ))
            .line(format!("  Assistant: {:?}", self.assistant.state()))
            .line(format!("  Transcript: {} turns", self.assistant.transcript().len()))
    }
}

fn format_turn(turn: &ConversationTurn) -> String {
    match turn.role {
        TurnRole::User => format!("[YOU] {}", turn.text),
        TurnRole::Model => format!("[ASSISTANT] {}", turn.text),
    }
}
