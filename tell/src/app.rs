//! Main application state and logic

use std::cell::Cell;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tell_core::{
    AssistantSession, ConfigError, GameController, KeyStore, PendingRequest, Provider, Reply,
    SessionConfig,
};
use tokio::sync::mpsc;

use crate::ui::theme::StoryTheme;
use crate::ui::Overlay;

/// Quiet period after the last edit of the object name before the assistant
/// starts a session from it.
pub const SEED_DEBOUNCE: Duration = Duration::from_secs(1);

/// Which text field receives typing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Object,
    Key,
    Message,
}

/// A single-line text buffer with a character-indexed cursor.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    text: String,
    cursor: usize,
}

impl LineBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Insert a character at the cursor (unicode-safe)
    pub fn type_char(&mut self, c: char) {
        let byte_pos = self
            .text
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len());
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    /// Handle backspace (unicode-safe)
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            if let Some((byte_pos, ch)) = self.text.char_indices().nth(self.cursor) {
                self.text.replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
            }
        }
    }

    /// Handle delete (unicode-safe)
    pub fn delete(&mut self) {
        if let Some((byte_pos, ch)) = self.text.char_indices().nth(self.cursor) {
            self.text.replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.text.chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// Main application state
pub struct App {
    // Game state
    pub game: GameController,
    pub keys: KeyStore,
    config: SessionConfig,
    pub assistant: AssistantSession,
    provider_override: Option<Arc<dyn Provider>>,

    // Replies from spawned provider calls
    reply_tx: mpsc::Sender<Reply>,
    reply_rx: mpsc::Receiver<Reply>,

    // UI state
    pub theme: StoryTheme,
    pub focus: Focus,
    overlay: Option<Overlay>,
    pub show_assistant: bool,
    pub transcript_scroll: usize,
    transcript_max_scroll: Cell<usize>,

    // Input fields
    object: LineBuffer,
    key: LineBuffer,
    message: LineBuffer,
    seed_edited_at: Option<Instant>,

    // Status
    status_message: Option<String>,
    pub should_quit: bool,

    // Animation
    pub animation_frame: u8,
}

impl App {
    pub fn new(config: SessionConfig, keys: KeyStore) -> Self {
        let (reply_tx, reply_rx) = mpsc::channel(16);
        Self {
            game: GameController::new(),
            key: LineBuffer::new(keys.get()),
            keys,
            assistant: AssistantSession::new(&config),
            config,
            provider_override: None,
            reply_tx,
            reply_rx,
            theme: StoryTheme::default(),
            focus: Focus::Object,
            overlay: None,
            show_assistant: false,
            transcript_scroll: 0,
            transcript_max_scroll: Cell::new(0),
            object: LineBuffer::default(),
            message: LineBuffer::default(),
            seed_edited_at: None,
            status_message: Some("Type an object name and press Enter to scan it".to_string()),
            should_quit: false,
            animation_frame: 0,
        }
    }

    /// Use this provider instead of building one from the configuration.
    #[cfg(test)]
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider_override = Some(provider);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // =========================================================================
    // Input editing
    // =========================================================================

    pub fn buffer(&self, focus: Focus) -> &LineBuffer {
        match focus {
            Focus::Object => &self.object,
            Focus::Key => &self.key,
            Focus::Message => &self.message,
        }
    }

    fn focused_buffer(&mut self) -> &mut LineBuffer {
        match self.focus {
            Focus::Object => &mut self.object,
            Focus::Key => &mut self.key,
            Focus::Message => &mut self.message,
        }
    }

    /// Apply an edit to the focused field and propagate the new value.
    fn edit(&mut self, f: impl FnOnce(&mut LineBuffer)) {
        let buffer = self.focused_buffer();
        let before = buffer.text.len();
        let before_cursor = buffer.cursor;
        f(buffer);
        let changed = buffer.text.len() != before || buffer.cursor != before_cursor;
        if !changed {
            return;
        }

        match self.focus {
            Focus::Object => {
                self.game.set_input(self.object.text());
                self.seed_edited_at = Some(Instant::now());
            }
            Focus::Key => self.keys.set(self.key.text()),
            Focus::Message => {}
        }
    }

    pub fn type_char(&mut self, c: char) {
        self.edit(|b| b.type_char(c));
    }

    pub fn backspace(&mut self) {
        self.edit(LineBuffer::backspace);
    }

    pub fn delete(&mut self) {
        self.edit(LineBuffer::delete);
    }

    pub fn cursor_left(&mut self) {
        self.focused_buffer().cursor_left();
    }

    pub fn cursor_right(&mut self) {
        self.focused_buffer().cursor_right();
    }

    pub fn cursor_home(&mut self) {
        self.focused_buffer().cursor_home();
    }

    pub fn cursor_end(&mut self) {
        self.focused_buffer().cursor_end();
    }

    /// Whether the assistant panel is shown and usable.
    pub fn assistant_ready(&self) -> bool {
        self.show_assistant && self.keys.is_configured()
    }

    /// Cycle focus through the visible fields
    pub fn cycle_focus(&mut self) {
        let settings = self.game.settings_visible();
        let assistant = self.assistant_ready();
        self.focus = match self.focus {
            Focus::Object if settings => Focus::Key,
            Focus::Object | Focus::Key if assistant => Focus::Message,
            _ => Focus::Object,
        };
    }

    // =========================================================================
    // Story actions
    // =========================================================================

    pub fn scan(&mut self) {
        if self.game.scan_input() {
            let title = self
                .game
                .current_story()
                .map(|s| s.title.clone())
                .unwrap_or_default();
            self.set_status(format!("Scanned: {title} (Ctrl+S to save)"));
        } else {
            self.set_status("Type an object name to scan");
        }
    }

    pub fn save(&mut self) {
        if self.game.save() {
            self.object.clear();
            self.seed_edited_at = None;
            self.set_status(format!(
                "Saved to storybook ({} stories)",
                self.game.storybook().len()
            ));
        } else {
            self.set_status("Nothing to save - scan an object first");
        }
    }

    pub fn toggle_settings(&mut self) {
        self.game.toggle_settings();
        if self.game.settings_visible() {
            self.focus = Focus::Key;
        } else if self.focus == Focus::Key {
            self.focus = Focus::Object;
        }
    }

    pub fn toggle_assistant(&mut self) {
        self.show_assistant = !self.show_assistant;
        if self.show_assistant {
            // Opening the panel counts as a fresh look at the current object name.
            if !self.object.text().trim().is_empty() {
                self.seed_edited_at = Some(Instant::now());
            }
        } else if self.focus == Focus::Message {
            self.focus = Focus::Object;
        }
    }

    // =========================================================================
    // Assistant
    // =========================================================================

    fn provider(&self) -> Result<Arc<dyn Provider>, ConfigError> {
        if !self.keys.is_configured() {
            return Err(ConfigError::NoApiKey);
        }
        match &self.provider_override {
            Some(provider) => Ok(Arc::clone(provider)),
            None => self.config.build_provider(&self.keys),
        }
    }

    /// Run a provider request on a background task.
    ///
    /// The reply comes back through the channel and is applied by
    /// [`App::drain_replies`]. A reply whose session is gone is rejected by
    /// its ticket.
    fn dispatch(&self, pending: PendingRequest, provider: Arc<dyn Provider>) {
        let tx = self.reply_tx.clone();
        tokio::spawn(async move {
            let reply = pending.execute(provider.as_ref()).await;
            // The app may have exited already.
            let _ = tx.send(reply).await;
        });
    }

    /// Start the assistant from the object name once the debounce has passed.
    ///
    /// Returns whether a start request was issued.
    pub fn maybe_start_assistant(&mut self, now: Instant) -> bool {
        if !self.assistant_ready() || self.assistant.is_active() || self.assistant.is_completed() {
            return false;
        }
        let settled = self
            .seed_edited_at
            .is_some_and(|at| now.saturating_duration_since(at) >= SEED_DEBOUNCE);
        if !settled {
            return false;
        }
        self.seed_edited_at = None;

        let provider = match self.provider() {
            Ok(p) => p,
            Err(e) => {
                self.set_status(e.to_string());
                return false;
            }
        };
        match self.assistant.begin_start(self.object.text()) {
            Some(pending) => {
                self.dispatch(pending, provider);
                true
            }
            None => false,
        }
    }

    pub fn send_message(&mut self) {
        if !self.assistant.can_send(self.message.text()) {
            if self.assistant.is_completed() {
                self.set_status("The story is complete - Ctrl+N starts a new session");
            } else if self.assistant.is_pending() {
                self.set_status("Waiting for the assistant...");
            }
            return;
        }
        let provider = match self.provider() {
            Ok(p) => p,
            Err(e) => {
                self.set_status(e.to_string());
                return;
            }
        };

        if let Some(pending) = self.assistant.begin_send(self.message.text()) {
            self.message.clear();
            self.scroll_to_bottom();
            self.dispatch(pending, provider);
        }
    }

    pub fn complete_story(&mut self) {
        if !self.assistant.can_complete() {
            if !self.assistant.is_active() {
                self.set_status("Nothing to complete yet - wait for the assistant to start");
            } else if self.assistant.is_pending() {
                self.set_status("Waiting for the assistant...");
            }
            return;
        }
        let provider = match self.provider() {
            Ok(p) => p,
            Err(e) => {
                self.set_status(e.to_string());
                return;
            }
        };

        if let Some(pending) = self.assistant.begin_complete() {
            self.dispatch(pending, provider);
        }
        if self.focus == Focus::Message {
            self.focus = Focus::Object;
        }
        self.set_status("Story session completed");
    }

    /// Discard the story session. Replies still in flight are dropped.
    pub fn new_session(&mut self) {
        self.assistant = AssistantSession::new(&self.config);
        self.message.clear();
        self.transcript_scroll = 0;
        if !self.object.text().trim().is_empty() {
            self.seed_edited_at = Some(Instant::now());
        }
        self.set_status("Started a new story session");
    }

    /// Apply every reply that has arrived. Returns how many were accepted.
    pub fn drain_replies(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(reply) = self.reply_rx.try_recv() {
            if self.assistant.apply(reply) {
                applied += 1;
            }
        }
        if applied > 0 {
            self.scroll_to_bottom();
        }
        applied
    }

    // =========================================================================
    // Transcript scrolling
    // =========================================================================

    /// Scroll transcript to bottom; the widget caps it to the real maximum
    pub fn scroll_to_bottom(&mut self) {
        self.transcript_scroll = usize::MAX / 2;
    }

    pub fn scroll_up(&mut self, lines: usize) {
        let max_scroll = self.transcript_max_scroll.get();
        if self.transcript_scroll > max_scroll {
            self.transcript_scroll = max_scroll;
        }
        self.transcript_scroll = self.transcript_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max_scroll = self.transcript_max_scroll.get();
        self.transcript_scroll = self.transcript_scroll.saturating_add(lines).min(max_scroll);
    }

    /// Record the scroll limit of the transcript as last laid out
    pub fn set_transcript_max_scroll(&self, max_scroll: usize) {
        self.transcript_max_scroll.set(max_scroll);
    }

    // =========================================================================
    // Ticks, overlays and status
    // =========================================================================

    /// Tick for animations and the seed debounce
    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
        self.maybe_start_assistant(Instant::now());
    }

    pub fn toggle_help(&mut self) {
        self.overlay = match self.overlay {
            Some(Overlay::Help) => None,
            None => Some(Overlay::Help),
        };
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tell_core::assistant::START_FALLBACK;
    use tell_core::{MockProvider, MockReply, SessionState, TurnRole};

    fn app_with(provider: &MockProvider, key: &str) -> App {
        App::new(SessionConfig::default(), KeyStore::with_key(key))
            .with_provider(Arc::new(provider.clone()))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.type_char(c);
        }
    }

    async fn wait_for_reply(app: &mut App) {
        let reply = app.reply_rx.recv().await.expect("reply");
        app.assistant.apply(reply);
    }

    #[test]
    fn test_line_buffer_unicode_editing() {
        let mut buffer = LineBuffer::default();
        for c in "café".chars() {
            buffer.type_char(c);
        }
        buffer.cursor_left();
        buffer.type_char('x');
        assert_eq!(buffer.text(), "cafxé");
        assert_eq!(buffer.cursor(), 4);

        buffer.delete();
        assert_eq!(buffer.text(), "cafx");
        buffer.cursor_home();
        buffer.backspace();
        assert_eq!(buffer.text(), "cafx");
        buffer.cursor_end();
        buffer.backspace();
        assert_eq!(buffer.text(), "caf");
    }

    #[test]
    fn test_scan_and_save_through_input() {
        let provider = MockProvider::default();
        let mut app = app_with(&provider, "");

        type_str(&mut app, "lamp");
        assert_eq!(app.game.input(), "lamp");
        app.scan();
        assert_eq!(
            app.game.current_story().map(|s| s.title.as_str()),
            Some("The Tale of the lamp")
        );

        app.save();
        assert_eq!(app.game.storybook().len(), 1);
        assert!(app.game.current_story().is_none());
        assert_eq!(app.buffer(Focus::Object).text(), "");
        assert_eq!(app.game.input(), "");

        app.save();
        assert_eq!(app.game.storybook().len(), 1);
    }

    #[test]
    fn test_settings_key_is_bound_to_store() {
        let provider = MockProvider::default();
        let mut app = app_with(&provider, "");

        app.toggle_settings();
        assert_eq!(app.focus, Focus::Key);
        type_str(&mut app, "sk-1");
        assert_eq!(app.keys.get(), "sk-1");
        app.backspace();
        assert_eq!(app.keys.get(), "sk-");

        app.toggle_settings();
        assert_eq!(app.focus, Focus::Object);
    }

    #[test]
    fn test_assistant_needs_key_and_panel() {
        let provider = MockProvider::default();
        let mut app = app_with(&provider, "");
        type_str(&mut app, "lamp");

        let later = Instant::now() + SEED_DEBOUNCE * 2;
        assert!(!app.maybe_start_assistant(later));
        app.toggle_assistant();
        assert!(!app.assistant_ready());
        assert!(!app.maybe_start_assistant(later));
        assert_eq!(app.assistant.state(), SessionState::Uninitialized);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_seed_is_debounced() {
        let provider = MockProvider::new(vec![MockReply::fail("offline")]);
        let mut app = app_with(&provider, "sk-test");
        app.toggle_assistant();
        type_str(&mut app, "music box");

        assert!(!app.maybe_start_assistant(Instant::now()));
        assert!(app.maybe_start_assistant(Instant::now() + SEED_DEBOUNCE));
        assert_eq!(app.assistant.state(), SessionState::Starting);

        // Only one start per session.
        assert!(!app.maybe_start_assistant(Instant::now() + SEED_DEBOUNCE * 3));

        wait_for_reply(&mut app).await;
        assert_eq!(app.assistant.state(), SessionState::Idle);
        assert_eq!(app.assistant.transcript()[0].text, START_FALLBACK);
        assert!(provider.requests()[0].messages[0].text.contains("music box"));
    }

    #[tokio::test]
    async fn test_send_and_complete_from_ui() {
        let provider = MockProvider::new(vec![
            MockReply::text("Opening."),
            MockReply::text("Middle."),
            MockReply::text("Ending."),
        ]);
        let mut app = app_with(&provider, "sk-test");
        app.toggle_assistant();
        type_str(&mut app, "kite");
        app.maybe_start_assistant(Instant::now() + SEED_DEBOUNCE);
        wait_for_reply(&mut app).await;

        app.cycle_focus();
        assert_eq!(app.focus, Focus::Message);
        type_str(&mut app, "add wind");
        app.send_message();
        assert_eq!(app.buffer(Focus::Message).text(), "");
        assert!(app.assistant.is_pending());

        // A second send while the first is in flight does nothing.
        type_str(&mut app, "again");
        app.send_message();
        assert_eq!(app.buffer(Focus::Message).text(), "again");

        wait_for_reply(&mut app).await;
        app.complete_story();
        assert!(app.assistant.is_completed());
        wait_for_reply(&mut app).await;

        let last = app.assistant.transcript().last().unwrap();
        assert_eq!(last.role, TurnRole::Model);
        assert_eq!(last.text, "Ending.");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_reply_for_discarded_session_is_dropped() {
        let provider = MockProvider::new(vec![MockReply::text("Too late.")]);
        let mut app = app_with(&provider, "sk-test");
        app.toggle_assistant();
        type_str(&mut app, "umbrella");
        app.maybe_start_assistant(Instant::now() + SEED_DEBOUNCE);

        app.new_session();
        let reply = app.reply_rx.recv().await.expect("reply");
        assert!(!app.assistant.apply(reply));
        assert!(app.assistant.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_early_complete_does_not_block_auto_start() {
        let provider = MockProvider::new(vec![MockReply::text("Opening.")]);
        let mut app = app_with(&provider, "sk-test");
        app.toggle_assistant();
        type_str(&mut app, "kite");

        app.complete_story();
        assert_eq!(app.assistant.state(), SessionState::Uninitialized);
        assert_eq!(provider.call_count(), 0);

        assert!(app.maybe_start_assistant(Instant::now() + SEED_DEBOUNCE));
        wait_for_reply(&mut app).await;
        assert_eq!(app.assistant.transcript()[0].text, "Opening.");
    }
}
