//! AssistantSession - one co-writing dialogue with a text generation provider.
//!
//! The session is a small state machine:
//!
//! ```text
//! Uninitialized -> Starting -> Idle <-> Sending
//!                               |
//!                               v
//!                           Completed
//! ```
//!
//! Every provider round trip is split into `begin_*`, which validates the
//! action, updates the transcript and hands back a [`PendingRequest`], and
//! [`AssistantSession::resolve`], which applies the outcome. Front ends that
//! must not block (the TUI) run the request on a task and resolve when the
//! reply arrives; everything else uses the async helpers [`start`], [`send`]
//! and [`complete`], which do both halves in one call.
//!
//! [`start`]: AssistantSession::start
//! [`send`]: AssistantSession::send
//! [`complete`]: AssistantSession::complete

use llm::{Chat, Provider, Request};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SessionConfig;

/// System instruction sent when a session is established.
pub const SYSTEM_PROMPT: &str =
    "You are a creative writing assistant. Help users turn ideas into compelling stories.";

/// Final request sent when the user completes the story.
pub const CONCLUDE_PROMPT: &str = "Based on our conversation so far, please provide a concise and satisfying conclusion or summary for this story. Make it feel complete.";

/// Shown when the opening request fails.
pub const START_FALLBACK: &str =
    "Oops! Something went wrong while starting the story. Please try again.";

/// Shown when a user message cannot be answered.
pub const SEND_FALLBACK: &str = "I encountered an issue. Could you please rephrase or try again?";

/// Shown when the concluding request fails.
pub const COMPLETE_FALLBACK: &str = "I had trouble generating a final conclusion.";

/// Opening message built from the seed idea.
pub fn seed_prompt(idea: &str) -> String {
    format!(
        "I want to write a story about: \"{idea}\". Let's begin building it. Please start by suggesting an opening paragraph or a few key elements to get us started."
    )
}

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One entry of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No provider session yet; transcript is empty.
    #[default]
    Uninitialized,
    /// Opening request in flight.
    Starting,
    /// Ready for a send or a complete.
    Idle,
    /// User message in flight.
    Sending,
    /// Closed to further user messages.
    Completed,
}

/// What an outstanding request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Start,
    Send,
    Conclude,
}

impl RequestKind {
    fn fallback(self) -> &'static str {
        match self {
            RequestKind::Start => START_FALLBACK,
            RequestKind::Send => SEND_FALLBACK,
            RequestKind::Conclude => COMPLETE_FALLBACK,
        }
    }
}

/// Identifies one outstanding request of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTicket {
    pub session: Uuid,
    pub seq: u64,
    pub kind: RequestKind,
}

/// A provider request the caller must run and feed back through `resolve`.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub ticket: ReplyTicket,
    pub request: Request,
}

impl PendingRequest {
    /// Run the request against `provider`.
    pub async fn execute(self, provider: &dyn Provider) -> Reply {
        let result = provider
            .complete(self.request)
            .await
            .map(|response| response.text);
        Reply {
            ticket: self.ticket,
            result,
        }
    }
}

/// Outcome of a [`PendingRequest`].
#[derive(Debug)]
pub struct Reply {
    pub ticket: ReplyTicket,
    pub result: Result<String, llm::Error>,
}

#[derive(Debug, Clone)]
struct InFlight {
    ticket: ReplyTicket,
    prompt: String,
}

/// One dialogue with the provider.
#[derive(Debug)]
pub struct AssistantSession {
    id: Uuid,
    state: SessionState,
    transcript: Vec<ConversationTurn>,
    chat: Option<Chat>,
    pending: Option<InFlight>,
    next_seq: u64,
    max_tokens: usize,
    temperature: Option<f32>,
}

impl Default for AssistantSession {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

impl AssistantSession {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Uninitialized,
            transcript: Vec::new(),
            chat: None,
            pending: None,
            next_seq: 0,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transcript(&self) -> &[ConversationTurn] {
        &self.transcript
    }

    /// Whether a provider session has been established.
    pub fn is_active(&self) -> bool {
        self.chat.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// Whether a provider request is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether a send of `message` would be accepted right now.
    pub fn can_send(&self, message: &str) -> bool {
        self.state == SessionState::Idle
            && self.chat.is_some()
            && self.pending.is_none()
            && !message.trim().is_empty()
    }

    /// Whether `begin_complete` would be accepted right now.
    ///
    /// Only an established, idle session can be completed.
    pub fn can_complete(&self) -> bool {
        self.state == SessionState::Idle && self.chat.is_some() && self.pending.is_none()
    }

    /// Establish the provider session from a seed idea.
    ///
    /// Only the first non-blank seed observed by an uninitialized session
    /// starts it; anything else is ignored.
    pub fn begin_start(&mut self, seed: &str) -> Option<PendingRequest> {
        let seed = seed.trim();
        if self.state != SessionState::Uninitialized || self.pending.is_some() || seed.is_empty() {
            return None;
        }

        tracing::info!(session = %self.id, "starting story session");
        self.chat = Some(Chat::new(SYSTEM_PROMPT));
        self.state = SessionState::Starting;
        self.issue(RequestKind::Start, seed_prompt(seed))
    }

    /// Send a user message.
    ///
    /// Rejected when the message is blank, a request is outstanding, the
    /// session is not established, or the session is completed.
    pub fn begin_send(&mut self, message: &str) -> Option<PendingRequest> {
        if !self.can_send(message) {
            tracing::debug!(session = %self.id, state = ?self.state, "send rejected");
            return None;
        }

        let text = message.trim().to_string();
        self.transcript.push(ConversationTurn::user(text.clone()));
        self.state = SessionState::Sending;
        self.issue(RequestKind::Send, text)
    }

    /// Close the session to further messages.
    ///
    /// Accepted only from `Idle`. The session is `Completed` as soon as this
    /// is accepted, and the returned request asks for the concluding reply.
    pub fn begin_complete(&mut self) -> Option<PendingRequest> {
        if !self.can_complete() {
            tracing::debug!(session = %self.id, state = ?self.state, "complete rejected");
            return None;
        }

        tracing::info!(session = %self.id, "completing story session");
        self.state = SessionState::Completed;
        self.issue(RequestKind::Conclude, CONCLUDE_PROMPT.to_string())
    }

    /// Apply the outcome of the outstanding request.
    ///
    /// Replies whose ticket does not match the outstanding request are
    /// dropped and `false` is returned.
    pub fn resolve(&mut self, ticket: ReplyTicket, result: Result<String, llm::Error>) -> bool {
        let matches = self
            .pending
            .as_ref()
            .is_some_and(|in_flight| in_flight.ticket == ticket);
        if !matches {
            tracing::debug!(session = %self.id, ?ticket, "discarding stale reply");
            return false;
        }
        let Some(in_flight) = self.pending.take() else {
            return false;
        };

        match result {
            Ok(text) => {
                if let Some(chat) = self.chat.as_mut() {
                    chat.record(in_flight.prompt, text.clone());
                }
                self.transcript.push(ConversationTurn::model(text));
            }
            Err(e) => {
                tracing::warn!(session = %self.id, kind = ?ticket.kind, error = %e, "provider call failed");
                self.transcript
                    .push(ConversationTurn::model(ticket.kind.fallback()));
            }
        }

        if ticket.kind != RequestKind::Conclude {
            self.state = SessionState::Idle;
        }
        true
    }

    /// Apply a [`Reply`].
    pub fn apply(&mut self, reply: Reply) -> bool {
        self.resolve(reply.ticket, reply.result)
    }

    /// Start the session and wait for the opening reply.
    ///
    /// Returns whether a request was made.
    pub async fn start(&mut self, provider: &dyn Provider, seed: &str) -> bool {
        match self.begin_start(seed) {
            Some(pending) => {
                let reply = pending.execute(provider).await;
                self.apply(reply)
            }
            None => false,
        }
    }

    /// Send a message and wait for the reply.
    pub async fn send(&mut self, provider: &dyn Provider, message: &str) -> bool {
        match self.begin_send(message) {
            Some(pending) => {
                let reply = pending.execute(provider).await;
                self.apply(reply)
            }
            None => false,
        }
    }

    /// Complete the session and wait for the concluding reply.
    ///
    /// Returns whether the session was completed by this call.
    pub async fn complete(&mut self, provider: &dyn Provider) -> bool {
        match self.begin_complete() {
            Some(pending) => {
                let reply = pending.execute(provider).await;
                self.apply(reply);
                true
            }
            None => false,
        }
    }

    fn issue(&mut self, kind: RequestKind, prompt: String) -> Option<PendingRequest> {
        let chat = self.chat.as_ref()?;

        self.next_seq += 1;
        let ticket = ReplyTicket {
            session: self.id,
            seq: self.next_seq,
            kind,
        };

        let mut request = chat.request_for(&prompt).with_max_tokens(self.max_tokens);
        if let Some(temp) = self.temperature {
            request = request.with_temperature(temp);
        }

        self.pending = Some(InFlight { ticket, prompt });
        Some(PendingRequest { ticket, request })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> Result<String, llm::Error> {
        Err(llm::Error::Network("connection reset".to_string()))
    }

    fn started() -> AssistantSession {
        let mut session = AssistantSession::default();
        let pending = session.begin_start("a lost key").unwrap();
        assert!(session.resolve(pending.ticket, Ok("Opening".to_string())));
        session
    }

    #[test]
    fn test_initial_state() {
        let session = AssistantSession::default();
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(session.transcript().is_empty());
        assert!(!session.is_active());
        assert!(!session.is_pending());
    }

    #[test]
    fn test_blank_seed_does_not_start() {
        let mut session = AssistantSession::default();
        assert!(session.begin_start("   ").is_none());
        assert_eq!(session.state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_start_request_carries_system_and_seed() {
        let mut session = AssistantSession::default();
        let pending = session.begin_start("  a lost key ").unwrap();

        assert_eq!(session.state(), SessionState::Starting);
        assert!(session.is_pending());
        assert_eq!(pending.request.system.as_deref(), Some(SYSTEM_PROMPT));
        assert_eq!(pending.request.messages.len(), 1);
        assert_eq!(pending.request.messages[0].text, seed_prompt("a lost key"));
        assert_eq!(pending.ticket.kind, RequestKind::Start);
    }

    #[test]
    fn test_failed_start_leaves_idle_with_fallback() {
        let mut session = AssistantSession::default();
        let pending = session.begin_start("a lost key").unwrap();
        session.resolve(pending.ticket, failure());

        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.transcript(), &[ConversationTurn::model(START_FALLBACK)]);
        assert!(session.is_active());
        assert!(session.can_send("hello"));
    }

    #[test]
    fn test_start_only_once() {
        let mut session = started();
        assert!(session.begin_start("another idea").is_none());
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_send_appends_user_turn_before_reply() {
        let mut session = started();
        let pending = session.begin_send("  make it spooky ").unwrap();

        assert_eq!(session.state(), SessionState::Sending);
        assert_eq!(session.transcript().last(), Some(&ConversationTurn::user("make it spooky")));

        session.resolve(pending.ticket, Ok("The key glowed.".to_string()));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(
            session.transcript(),
            &[
                ConversationTurn::model("Opening"),
                ConversationTurn::user("make it spooky"),
                ConversationTurn::model("The key glowed."),
            ]
        );
    }

    #[test]
    fn test_send_while_pending_rejected() {
        let mut session = started();
        let _pending = session.begin_send("first").unwrap();
        let len = session.transcript().len();

        assert!(session.begin_send("second").is_none());
        assert_eq!(session.transcript().len(), len);
    }

    #[test]
    fn test_send_before_start_rejected() {
        let mut session = AssistantSession::default();
        assert!(session.begin_send("hello").is_none());
        assert!(session.transcript().is_empty());

        let _pending = session.begin_start("idea").unwrap();
        assert!(session.begin_send("hello").is_none());
    }

    #[test]
    fn test_blank_send_rejected() {
        let mut session = started();
        assert!(session.begin_send(" \n ").is_none());
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_failed_send_appends_fallback() {
        let mut session = started();
        let pending = session.begin_send("continue").unwrap();
        session.resolve(pending.ticket, failure());

        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.transcript().last(), Some(&ConversationTurn::model(SEND_FALLBACK)));
        assert!(!session.is_pending());
    }

    #[test]
    fn test_failed_exchange_not_replayed() {
        let mut session = started();
        let pending = session.begin_send("lost message").unwrap();
        session.resolve(pending.ticket, failure());

        let next = session.begin_send("next message").unwrap();
        let texts: Vec<&str> = next.request.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec![seed_prompt("a lost key").as_str(), "Opening", "next message"]);
    }

    #[test]
    fn test_complete_rejects_later_sends() {
        let mut session = started();
        let pending = session.begin_complete().unwrap();
        assert!(session.is_completed());
        assert_eq!(pending.request.messages.last().unwrap().text, CONCLUDE_PROMPT);

        session.resolve(pending.ticket, Ok("The end.".to_string()));
        assert!(session.is_completed());
        assert!(session.begin_send("one more thing").is_none());
        assert!(session.begin_complete().is_none());
        assert_eq!(session.transcript().last(), Some(&ConversationTurn::model("The end.")));
    }

    #[test]
    fn test_failed_complete_still_completed() {
        let mut session = started();
        let pending = session.begin_complete().unwrap();
        session.resolve(pending.ticket, failure());

        assert!(session.is_completed());
        assert_eq!(
            session.transcript().last(),
            Some(&ConversationTurn::model(COMPLETE_FALLBACK))
        );
    }

    #[test]
    fn test_complete_before_start_is_rejected() {
        let mut session = AssistantSession::default();
        assert!(!session.can_complete());
        assert!(session.begin_complete().is_none());
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(session.transcript().is_empty());

        // The session can still be started afterwards.
        assert!(session.begin_start("a lost key").is_some());
        assert!(session.begin_complete().is_none());
        assert_eq!(session.state(), SessionState::Starting);
    }

    #[test]
    fn test_complete_while_pending_rejected() {
        let mut session = started();
        let _pending = session.begin_send("wait").unwrap();
        assert!(session.begin_complete().is_none());
        assert_eq!(session.state(), SessionState::Sending);
    }

    #[test]
    fn test_stale_ticket_discarded() {
        let mut session = started();
        let first = session.begin_send("first").unwrap();
        session.resolve(first.ticket, Ok("reply".to_string()));

        let second = session.begin_send("second").unwrap();
        let len = session.transcript().len();

        // A duplicate of the first reply must not complete the second send.
        assert!(!session.resolve(first.ticket, Ok("late".to_string())));
        assert_eq!(session.transcript().len(), len);
        assert_eq!(session.state(), SessionState::Sending);

        assert!(session.resolve(second.ticket, Ok("on time".to_string())));
    }

    #[test]
    fn test_reply_for_other_session_discarded() {
        let mut old = AssistantSession::default();
        let pending = old.begin_start("old idea").unwrap();
        drop(old);

        let mut fresh = AssistantSession::default();
        let _ = fresh.begin_start("new idea").unwrap();
        assert!(!fresh.resolve(pending.ticket, Ok("late".to_string())));
        assert!(fresh.transcript().is_empty());
        assert_eq!(fresh.state(), SessionState::Starting);
    }

    #[test]
    fn test_request_uses_config_options() {
        let config = SessionConfig::default().with_max_tokens(200).with_temperature(0.3);
        let mut session = AssistantSession::new(&config);
        let pending = session.begin_start("kite").unwrap();
        assert_eq!(pending.request.max_tokens, 200);
        assert_eq!(pending.request.temperature, Some(0.3));
    }
}
