//! Outbound Surface Messages
//!
//! Messages the session controller emits to its display surface. Every
//! transcript mutation and every flag change maps to exactly one message, in
//! commit order, so a surface that applies them in sequence is always an
//! eventually-consistent projection of controller state and never a second
//! source of truth.
//!
//! `Notify` is the one advisory message that reports no state: it carries
//! busy rejections and warnings a surface may present however it likes.

use serde::{Deserialize, Serialize};

use crate::joule::{Author, Joule, JouleId};

// ============================================================================
// Usage Metrics
// ============================================================================

/// Token and cost counters reported by the bridge alongside a reply.
///
/// Informational only; never part of turn identity. Field names match the
/// bridge wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageMetrics {
    /// Cost of the last call.
    #[serde(default)]
    pub cost_call: f64,
    /// Accumulated cost of the session.
    #[serde(default)]
    pub cost_session: f64,
    /// Tokens received in the last reply.
    #[serde(default)]
    pub tokens_received: u64,
}

// ============================================================================
// Notifications
// ============================================================================

/// Severity of an advisory notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    /// Informational.
    Info,
    /// Something the user should notice, like a rejected command.
    Warning,
    /// Something went wrong outside the transcript.
    Error,
}

// ============================================================================
// Outbound Messages
// ============================================================================

/// Message from the controller to a display surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PanelMessage {
    /// A turn was appended to the transcript.
    #[serde(rename_all = "camelCase")]
    AppendTurn {
        /// Identity of the appended turn.
        id: JouleId,
        /// Author of the turn.
        role: Author,
        /// Display text.
        text: String,
    },
    /// The streaming turn's content changed. Surfaces create the streaming
    /// element if it does not exist yet; the text is a full replacement,
    /// never a delta.
    #[serde(rename_all = "camelCase")]
    ReplaceStreamingTurn {
        /// Identity of the streaming turn.
        id: JouleId,
        /// Full replacement text.
        text: String,
    },
    /// The streaming turn reached a terminal state and will not change again.
    #[serde(rename_all = "camelCase")]
    FinalizeStreamingTurn {
        /// Identity of the turn that finished streaming.
        id: JouleId,
    },
    /// The thinking indicator changed.
    #[serde(rename_all = "camelCase")]
    SetThinking {
        /// New indicator value.
        value: bool,
    },
    /// Fresh usage counters arrived with a reply.
    #[serde(rename_all = "camelCase")]
    UpdateUsage {
        /// The counters, forwarded as reported.
        usage: UsageMetrics,
    },
    /// The transcript was cleared.
    ClearTranscript,
    /// Full transcript resync, sent when a surface reports ready.
    #[serde(rename_all = "camelCase")]
    SetTranscript {
        /// Every turn, oldest first.
        turns: Vec<Joule>,
    },
    /// Advisory not tied to transcript state.
    #[serde(rename_all = "camelCase")]
    Notify {
        /// Severity.
        level: NotifyLevel,
        /// Human-readable text.
        message: String,
    },
}

impl PanelMessage {
    /// Short name of the message for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PanelMessage::AppendTurn { .. } => "appendTurn",
            PanelMessage::ReplaceStreamingTurn { .. } => "replaceStreamingTurn",
            PanelMessage::FinalizeStreamingTurn { .. } => "finalizeStreamingTurn",
            PanelMessage::SetThinking { .. } => "setThinking",
            PanelMessage::UpdateUsage { .. } => "updateUsage",
            PanelMessage::ClearTranscript => "clearTranscript",
            PanelMessage::SetTranscript { .. } => "setTranscript",
            PanelMessage::Notify { .. } => "notify",
        }
    }
}
