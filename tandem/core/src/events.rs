//! Inbound Surface Events
//!
//! Events a display surface sends to its session controller. The vocabulary
//! is deliberately small: submit a command, answer a confirmation, reset the
//! session, or ask for a full resync after (re)loading.
//!
//! Surfaces never mutate session state directly; these events are the only
//! path in, and the outbound [`crate::messages::PanelMessage`] stream is the
//! only path out.

use serde::{Deserialize, Serialize};

/// Commands the assistant bridge understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeCommand {
    /// Ask a question without editing files.
    Ask,
    /// Add files to the assistant's working set.
    Add,
    /// Drop files from the working set.
    Drop,
    /// Show the current diff. Carries no message payload.
    Diff,
    /// Request a code change.
    Code,
}

impl BridgeCommand {
    /// Wire name of the command; also the display prefix of the recorded
    /// human turn (`"ask: fix bug"`).
    pub fn as_str(self) -> &'static str {
        match self {
            BridgeCommand::Ask => "ask",
            BridgeCommand::Add => "add",
            BridgeCommand::Drop => "drop",
            BridgeCommand::Diff => "diff",
            BridgeCommand::Code => "code",
        }
    }

    /// Whether dispatching this command forwards the typed message.
    ///
    /// `diff` takes no payload; the typed text is still recorded in the
    /// transcript, it just is not sent to the bridge.
    pub fn carries_payload(self) -> bool {
        !matches!(self, BridgeCommand::Diff)
    }
}

impl std::fmt::Display for BridgeCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event from a display surface to the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PanelEvent {
    /// The user submitted a command with message text.
    #[serde(rename_all = "camelCase")]
    SendMessage {
        /// Which bridge command to dispatch.
        command: BridgeCommand,
        /// The typed message.
        message: String,
    },
    /// The user confirmed or declined a pending code change.
    #[serde(rename_all = "camelCase")]
    ConfirmCode {
        /// True to proceed.
        confirmed: bool,
    },
    /// Clear the session and start over.
    ResetChat,
    /// The surface finished loading and wants a full resync.
    Ready,
}
