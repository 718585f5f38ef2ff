//! Testing utilities.
//!
//! This module provides tools for tests that must not touch the network:
//! - `MockProvider`, a scripted [`Provider`] that records every request
//! - `MockReply` for scripting successes and failures

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use llm::{Error, Provider, Request, Response};

/// A scripted reply from the mock provider.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this text.
    Text(String),
    /// Fail with a network error carrying this message.
    Fail(String),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        MockReply::Fail(message.into())
    }
}

#[derive(Debug, Default)]
struct MockState {
    replies: VecDeque<MockReply>,
    requests: Vec<Request>,
}

/// A provider that returns scripted replies in order.
///
/// Clones share the same script and request log, so a test can keep one
/// handle while another is owned by the code under test.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a mock with scripted replies.
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                replies: replies.into(),
                requests: Vec::new(),
            })),
        }
    }

    /// Create a mock whose every call fails.
    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    /// Add a reply to the end of the script.
    pub fn queue(&self, reply: MockReply) -> &Self {
        self.lock().replies.push_back(reply);
        self
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<Request> {
        self.lock().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the script from the others.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: Request) -> Result<Response, Error> {
        let reply = {
            let mut state = self.lock();
            state.requests.push(request);
            state.replies.pop_front()
        };

        match reply {
            Some(MockReply::Text(text)) => Ok(Response {
                model: "mock".to_string(),
                text,
                usage: None,
            }),
            Some(MockReply::Fail(message)) => Err(Error::Network(message)),
            None => Err(Error::Network("mock provider has no more scripted replies".to_string())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
