//! Backend Trait Definitions
//!
//! The session controller's view of an assistant backend: one request in, one
//! reply out, with progress reported over a channel so the controller never
//! blocks on a call. Implementations are not assumed to be cancellable; when
//! a session resets mid-call, the controller drops the eventual outcome
//! instead of interrupting the call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use crate::encode::ModelMessage;
use crate::events::BridgeCommand;
use crate::joule::{CodeInfo, StopReason};
use crate::messages::UsageMetrics;

/// One outbound call to the assistant backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendRequest {
    /// Bridge command being dispatched.
    pub command: BridgeCommand,
    /// Message payload; empty for commands that carry none.
    pub message: String,
    /// Encoder-projected prior transcript, for multi-turn context.
    pub context: Vec<ModelMessage>,
}

impl BackendRequest {
    /// Request with no prior context.
    pub fn new(command: BridgeCommand, message: impl Into<String>) -> Self {
        Self {
            command,
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Attach encoded transcript context.
    #[must_use]
    pub fn with_context(mut self, context: Vec<ModelMessage>) -> Self {
        self.context = context;
        self
    }
}

/// A resolved backend reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BackendReply {
    /// Assistant text.
    pub message: String,
    /// Usage counters, when the bridge reports them.
    #[serde(default)]
    pub usage: Option<UsageMetrics>,
    /// Code payload; its presence makes the reply a code change.
    #[serde(default)]
    pub code: Option<CodeInfo>,
    /// Why the assistant stopped; treated as end-turn when absent.
    #[serde(default)]
    pub stop: Option<StopReason>,
}

impl BackendReply {
    /// Plain text reply with no usage and no code payload.
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Progress of one dispatched call, delivered on the outcome channel.
///
/// Single-resolution backends produce exactly one `Finished` or `Failed`.
/// Streaming-capable dispatchers may precede the terminal outcome with any
/// number of `Partial` content replacements.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    /// Replacement content for the in-flight assistant turn.
    Partial(String),
    /// The call resolved with a reply.
    Finished(BackendReply),
    /// The call failed, with a human-readable reason.
    Failed(String),
}

/// An assistant backend the session controller can dispatch commands to.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Implementation name for logs.
    fn name(&self) -> &str;

    /// Whether the backend is currently reachable.
    async fn health_check(&self) -> bool;

    /// Resolve one request to one reply.
    async fn invoke(&self, request: &BackendRequest) -> anyhow::Result<BackendReply>;

    /// Dispatch a request, reporting progress on `updates`.
    ///
    /// The default implementation performs [`AssistantBackend::invoke`] and
    /// reports a single terminal outcome; backends that can stream override
    /// this to issue `Partial` replacements first. The controller runs this
    /// on its own task, so implementations may take as long as the call
    /// takes.
    async fn invoke_with_updates(
        &self,
        request: BackendRequest,
        updates: mpsc::Sender<ReplyOutcome>,
    ) {
        let outcome = match self.invoke(&request).await {
            Ok(reply) => ReplyOutcome::Finished(reply),
            Err(error) => ReplyOutcome::Failed(error.to_string()),
        };
        if updates.send(outcome).await.is_err() {
            debug!("session dropped the outcome channel before resolution");
        }
    }
}
