//! Turn Model
//!
//! A conversation is an ordered sequence of immutable turns, called joules.
//! Four variants exist: two authored by the human (free-form message,
//! confirmation of a pending code change) and two authored by the assistant
//! (conversational reply, code change). The variant set is closed: every
//! projection over turns is an exhaustive match, so a turn outside the set is
//! unrepresentable rather than a runtime error.
//!
//! Identity is assigned exactly once, at construction. A turn is never
//! mutated after the fact; the single sanctioned exception is the trailing
//! streaming turn of a transcript, whose content is replaced in place while
//! the assistant is still producing it (see [`crate::transcript`]).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Sentinel Strings
// ============================================================================

/// Text a confirmation turn contributes when projected to the upstream API
/// or a display surface, chosen when `confirmed` is true.
pub const CONFIRMATION_ACCEPTED: &str = "[user confirmed okay to proceed]";

/// Counterpart of [`CONFIRMATION_ACCEPTED`] for a declined confirmation.
pub const CONFIRMATION_DECLINED: &str = "[user declined to proceed]";

/// Fixed raw output recorded on error turns.
///
/// The human-readable failure lives in the turn's display text; the raw
/// output seen by the upstream API on replay is always this marker.
pub const ERROR_RAW_OUTPUT: &str = "[error encountered]";

// ============================================================================
// Identity
// ============================================================================

/// Process-unique identity of a turn.
///
/// Minted exactly once when the turn is constructed, never reused. When the
/// transcript replaces its trailing streaming turn with a finalized form, the
/// replacement keeps this identity; everything else about a turn is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JouleId(Uuid);

impl JouleId {
    /// Wrap a raw UUID as a turn identity.
    pub fn from_uuid(raw: Uuid) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for JouleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Authorship and State
// ============================================================================

/// Who authored a turn.
///
/// Authorship is a pure function of the variant: human variants are always
/// [`Author::Human`], bot variants always [`Author::Bot`]. The mapping never
/// branches on content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    /// The person driving the session.
    Human,
    /// The assistant.
    Bot,
}

/// Lifecycle state of a [`Joule::BotMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotMessageState {
    /// The turn reached its final content.
    #[default]
    Complete,
    /// Content is still streaming in and will be replaced.
    Partial,
    /// The turn records a failure. Terminal: never transitioned further.
    Error,
}

/// Lifecycle state of a [`Joule::BotCodeChange`].
///
/// Deliberately narrower than [`BotMessageState`]: a code change cannot be an
/// error turn, and the parameter type makes that unrepresentable instead of a
/// runtime check. Failures are recorded through
/// [`crate::factory::JouleFactory::error_turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotCodeState {
    /// The change reached its final content.
    #[default]
    Complete,
    /// Content is still streaming in and will be replaced.
    Partial,
}

/// Variant-independent view of a turn's lifecycle state.
///
/// Human turns are always complete; bot turns report their stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JouleState {
    /// Final content.
    Complete,
    /// In-flight streaming content.
    Partial,
    /// Recorded failure.
    Error,
}

impl From<BotMessageState> for JouleState {
    fn from(state: BotMessageState) -> Self {
        match state {
            BotMessageState::Complete => JouleState::Complete,
            BotMessageState::Partial => JouleState::Partial,
            BotMessageState::Error => JouleState::Error,
        }
    }
}

impl From<BotCodeState> for JouleState {
    fn from(state: BotCodeState) -> Self {
        match state {
            BotCodeState::Complete => JouleState::Complete,
            BotCodeState::Partial => JouleState::Partial,
        }
    }
}

/// Why the assistant stopped producing a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// The assistant finished its turn normally.
    EndTurn,
    /// The assistant is waiting for the user to confirm a code change.
    ConfirmCode,
}

// ============================================================================
// Payload Types
// ============================================================================

/// Filesystem locations a bot turn referred to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPaths {
    /// Workspace root the paths are relative to; empty when unknown.
    pub root: String,
    /// Files the assistant read or touched.
    pub paths: Vec<String>,
}

impl ContextPaths {
    /// Placeholder for turns that carry no real code context.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Execution record attached to every bot turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecInfo {
    /// Verbatim backend output. This is what the upstream API sees when the
    /// transcript is replayed; the turn's `text` may be post-processed for
    /// display and is never sent back.
    pub raw_output: String,
    /// Code context the output referred to.
    pub context_paths: ContextPaths,
}

impl ExecInfo {
    /// Execution record carrying output and no code context.
    pub fn from_output(raw_output: impl Into<String>) -> Self {
        Self {
            raw_output: raw_output.into(),
            context_paths: ContextPaths::empty(),
        }
    }
}

/// Code payload: a change proposed by the assistant, or context attached to a
/// human message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeInfo {
    /// Unified diff of the change.
    pub diff: String,
    /// Files the change touches.
    pub paths: Vec<String>,
}

// ============================================================================
// The Turn
// ============================================================================

/// One immutable step in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Joule {
    /// Free-form text from the user.
    #[serde(rename_all = "camelCase")]
    HumanMessage {
        /// Turn identity.
        id: JouleId,
        /// What the user submitted, as displayed.
        text: String,
        /// Code context attached to the message, if any.
        code_context: Option<CodeInfo>,
    },
    /// The user letting a pending code change proceed, or stopping it.
    #[serde(rename_all = "camelCase")]
    HumanConfirmation {
        /// Turn identity.
        id: JouleId,
        /// True to proceed, false to decline.
        confirmed: bool,
    },
    /// A conversational reply from the assistant.
    #[serde(rename_all = "camelCase")]
    BotMessage {
        /// Turn identity.
        id: JouleId,
        /// Display text, possibly post-processed for humans.
        text: String,
        /// Verbatim execution record used on API replay.
        exec_info: ExecInfo,
        /// Lifecycle state; error is terminal.
        state: BotMessageState,
        /// Why the assistant stopped, when it said.
        stop_reason: Option<StopReason>,
    },
    /// A code change proposed or applied by the assistant.
    #[serde(rename_all = "camelCase")]
    BotCodeChange {
        /// Turn identity.
        id: JouleId,
        /// Display text describing the change.
        text: String,
        /// The change itself.
        code_info: CodeInfo,
        /// Verbatim execution record used on API replay.
        exec_info: ExecInfo,
        /// Lifecycle state; cannot express an error.
        state: BotCodeState,
    },
}

impl Joule {
    /// Identity of this turn.
    pub fn id(&self) -> JouleId {
        match self {
            Joule::HumanMessage { id, .. }
            | Joule::HumanConfirmation { id, .. }
            | Joule::BotMessage { id, .. }
            | Joule::BotCodeChange { id, .. } => *id,
        }
    }

    /// Who authored this turn. Pure over the variant, blind to content.
    pub fn author(&self) -> Author {
        match self {
            Joule::HumanMessage { .. } | Joule::HumanConfirmation { .. } => Author::Human,
            Joule::BotMessage { .. } | Joule::BotCodeChange { .. } => Author::Bot,
        }
    }

    /// Lifecycle state of this turn. Human turns are always complete.
    pub fn state(&self) -> JouleState {
        match self {
            Joule::HumanMessage { .. } | Joule::HumanConfirmation { .. } => JouleState::Complete,
            Joule::BotMessage { state, .. } => (*state).into(),
            Joule::BotCodeChange { state, .. } => (*state).into(),
        }
    }

    /// True while this turn's content is still streaming in.
    pub fn is_partial(&self) -> bool {
        self.state() == JouleState::Partial
    }

    /// Text a display surface shows for this turn.
    ///
    /// Confirmations display their sentinel line; every other variant shows
    /// its `text` field.
    pub fn display_text(&self) -> &str {
        match self {
            Joule::HumanMessage { text, .. }
            | Joule::BotMessage { text, .. }
            | Joule::BotCodeChange { text, .. } => text,
            Joule::HumanConfirmation { confirmed, .. } => {
                if *confirmed {
                    CONFIRMATION_ACCEPTED
                } else {
                    CONFIRMATION_DECLINED
                }
            }
        }
    }

    /// Same turn under a different identity.
    ///
    /// Used by the transcript when a finalized turn takes over the position
    /// and identity of the streaming turn it replaces.
    pub(crate) fn with_id(mut self, new_id: JouleId) -> Self {
        match &mut self {
            Joule::HumanMessage { id, .. }
            | Joule::HumanConfirmation { id, .. }
            | Joule::BotMessage { id, .. }
            | Joule::BotCodeChange { id, .. } => *id = new_id,
        }
        self
    }

    /// Replace the content of a streaming bot turn in place.
    ///
    /// Both the display text and the raw output are overwritten; human turns
    /// are left untouched (the transcript never marks them as streaming).
    pub(crate) fn replace_streaming_content(&mut self, new_text: &str) {
        match self {
            Joule::BotMessage {
                text, exec_info, ..
            }
            | Joule::BotCodeChange {
                text, exec_info, ..
            } => {
                *text = new_text.to_string();
                exec_info.raw_output = new_text.to_string();
            }
            Joule::HumanMessage { .. } | Joule::HumanConfirmation { .. } => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
