//! Turn Factory
//!
//! One constructor per turn variant. Every constructor mints a fresh identity
//! from an injected [`IdentitySource`] and performs no I/O; constraints are
//! carried by parameter types (a code-change turn takes the narrower state
//! enum, so an errored code change does not typecheck).
//!
//! The identity source is a capability rather than ambient state so tests can
//! substitute [`SequentialIds`] and assert on exact identities.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use crate::joule::{
    BotCodeState, BotMessageState, CodeInfo, ContextPaths, ExecInfo, Joule, JouleId, StopReason,
    ERROR_RAW_OUTPUT,
};

/// Capability that mints turn identities.
pub trait IdentitySource: Send + Sync {
    /// Mint a fresh, never-repeated identity.
    fn mint(&self) -> JouleId;
}

/// Default identity source: random version-4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdentitySource for RandomIds {
    fn mint(&self) -> JouleId {
        JouleId::from_uuid(Uuid::new_v4())
    }
}

/// Deterministic identity source for tests: mints 1, 2, 3, ... as UUIDs.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Source whose first identity is 1.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// The identity a counter value `n` maps to.
    pub fn id_for(n: u64) -> JouleId {
        JouleId::from_uuid(Uuid::from_u128(u128::from(n)))
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentitySource for SequentialIds {
    fn mint(&self) -> JouleId {
        Self::id_for(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Builds well-formed turns.
///
/// Cheap to clone; clones share the identity source, so identities stay
/// unique across every factory handle in a session.
#[derive(Clone)]
pub struct JouleFactory {
    ids: Arc<dyn IdentitySource>,
}

impl std::fmt::Debug for JouleFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JouleFactory").finish_non_exhaustive()
    }
}

impl JouleFactory {
    /// Factory with the default random identity source.
    pub fn new() -> Self {
        Self::with_identity_source(Arc::new(RandomIds))
    }

    /// Factory minting identities from the given source.
    pub fn with_identity_source(ids: Arc<dyn IdentitySource>) -> Self {
        Self { ids }
    }

    /// Free-form human message. Always complete.
    pub fn human_message(&self, text: impl Into<String>, code_context: Option<CodeInfo>) -> Joule {
        Joule::HumanMessage {
            id: self.ids.mint(),
            text: text.into(),
            code_context,
        }
    }

    /// Confirmation of a pending code change. Always complete.
    pub fn human_confirmation(&self, confirmed: bool) -> Joule {
        Joule::HumanConfirmation {
            id: self.ids.mint(),
            confirmed,
        }
    }

    /// Conversational bot turn in the given state.
    pub fn bot_message(
        &self,
        text: impl Into<String>,
        exec_info: ExecInfo,
        state: BotMessageState,
        stop_reason: Option<StopReason>,
    ) -> Joule {
        Joule::BotMessage {
            id: self.ids.mint(),
            text: text.into(),
            exec_info,
            state,
            stop_reason,
        }
    }

    /// Code-change bot turn in the given state.
    pub fn bot_code_change(
        &self,
        text: impl Into<String>,
        code_info: CodeInfo,
        exec_info: ExecInfo,
        state: BotCodeState,
    ) -> Joule {
        Joule::BotCodeChange {
            id: self.ids.mint(),
            text: text.into(),
            code_info,
            exec_info,
            state,
        }
    }

    /// The single path by which backend and transport failures become
    /// transcript entries.
    ///
    /// Produces a terminal error [`Joule::BotMessage`] whose raw output is
    /// the fixed [`ERROR_RAW_OUTPUT`] marker; the human-readable failure goes
    /// in the display text. Infallible.
    pub fn error_turn(&self, error_message: impl Into<String>) -> Joule {
        Joule::BotMessage {
            id: self.ids.mint(),
            text: error_message.into(),
            exec_info: ExecInfo {
                raw_output: ERROR_RAW_OUTPUT.to_string(),
                context_paths: ContextPaths::empty(),
            },
            state: BotMessageState::Error,
            stop_reason: None,
        }
    }
}

impl Default for JouleFactory {
    fn default() -> Self {
        Self::new()
    }
}
