//! Bridge Test Utilities
//!
//! Shared mock backend for unit and integration tests: scripted replies and
//! failures, captured requests, injected latency, and optional streamed
//! partial content. No real bridge process is involved.
//!
//! # Usage
//!
//! ```ignore
//! use tandem_core::backend::test_utils::MockBridge;
//! use tandem_core::backend::BackendReply;
//!
//! let bridge = MockBridge::new();
//! bridge.enqueue_reply(BackendReply::text("looks good"));
//! bridge.enqueue_failure("network down");
//!
//! // After the test, inspect what the controller sent.
//! assert_eq!(bridge.request_count(), 2);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::backend::traits::{AssistantBackend, BackendReply, BackendRequest, ReplyOutcome};

#[derive(Debug, Default)]
struct MockState {
    /// Scripted outcomes, oldest first. `Err` strings become call failures.
    replies: VecDeque<Result<BackendReply, String>>,
    /// Content replacements streamed before each terminal outcome.
    partials: Vec<String>,
    /// Simulated call latency.
    delay: Option<Duration>,
    /// Requests the controller dispatched, in order.
    requests: Vec<BackendRequest>,
    /// Health check answer.
    healthy: bool,
}

/// Mock assistant backend with scripted behavior.
///
/// Cheap to clone; clones share state, so a test can keep a handle for
/// assertions after moving another into a controller.
#[derive(Debug, Clone)]
pub struct MockBridge {
    state: Arc<Mutex<MockState>>,
}

impl MockBridge {
    /// Mock that answers every call with `"mock reply"` until scripted
    /// otherwise.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                healthy: true,
                ..MockState::default()
            })),
        }
    }

    /// Mock pre-loaded with one reply.
    pub fn with_reply(reply: BackendReply) -> Self {
        let bridge = Self::new();
        bridge.enqueue_reply(reply);
        bridge
    }

    /// Script the next reply.
    pub fn enqueue_reply(&self, reply: BackendReply) {
        self.state.lock().unwrap().replies.push_back(Ok(reply));
    }

    /// Script the next call to fail.
    pub fn enqueue_failure(&self, reason: &str) {
        self.state
            .lock()
            .unwrap()
            .replies
            .push_back(Err(reason.to_string()));
    }

    /// Stream these content replacements before every terminal outcome.
    pub fn set_partials(&self, partials: Vec<String>) {
        self.state.lock().unwrap().partials = partials;
    }

    /// Delay every call by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    /// Change the health check answer.
    pub fn set_healthy(&self, healthy: bool) {
        self.state.lock().unwrap().healthy = healthy;
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<BackendRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Number of requests received.
    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<BackendRequest> {
        self.state.lock().unwrap().requests.last().cloned()
    }
}

impl Default for MockBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssistantBackend for MockBridge {
    fn name(&self) -> &str {
        "mock-bridge"
    }

    async fn health_check(&self) -> bool {
        self.state.lock().unwrap().healthy
    }

    async fn invoke(&self, request: &BackendRequest) -> anyhow::Result<BackendReply> {
        let (scripted, delay) = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request.clone());
            (state.replies.pop_front(), state.delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match scripted {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(reason)) => anyhow::bail!("{reason}"),
            None => Ok(BackendReply::text("mock reply")),
        }
    }

    async fn invoke_with_updates(
        &self,
        request: BackendRequest,
        updates: mpsc::Sender<ReplyOutcome>,
    ) {
        let partials = self.state.lock().unwrap().partials.clone();
        for partial in partials {
            if updates.send(ReplyOutcome::Partial(partial)).await.is_err() {
                return;
            }
        }
        let outcome = match self.invoke(&request).await {
            Ok(reply) => ReplyOutcome::Finished(reply),
            Err(error) => ReplyOutcome::Failed(error.to_string()),
        };
        let _ = updates.send(outcome).await;
    }
}
