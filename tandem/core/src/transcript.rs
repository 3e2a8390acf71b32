//! Session Transcript
//!
//! The ordered sequence of turns owned by one session controller. The
//! transcript is append-mostly: the single exception to append-only is
//! in-place replacement of the trailing partial bot turn while the assistant
//! is streaming. It is cleared whole on reset and never partially truncated.
//!
//! The streaming marker tracks the identity of the in-flight partial turn.
//! Content replacements preserve that identity; finalization swaps the
//! partial turn out for its terminal form under the same identity.

use tracing::warn;

use crate::joule::{Joule, JouleId};

/// Ordered turn sequence with trailing streaming-turn mechanics.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Joule>,
    streaming_id: Option<JouleId>,
}

impl Transcript {
    /// Empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[Joule] {
        &self.turns
    }

    /// Most recent turn.
    pub fn last(&self) -> Option<&Joule> {
        self.turns.last()
    }

    /// Identity of the in-flight streaming turn, if any.
    pub fn streaming_id(&self) -> Option<JouleId> {
        self.streaming_id
    }

    /// Append a turn. Returns its identity.
    pub fn append(&mut self, turn: Joule) -> JouleId {
        let id = turn.id();
        self.turns.push(turn);
        id
    }

    /// Append a partial bot turn and mark it as the streaming turn.
    ///
    /// The turn must be partial; the controller only ever starts streaming
    /// with freshly built partial turns.
    pub fn begin_streaming(&mut self, turn: Joule) -> JouleId {
        debug_assert!(turn.is_partial(), "streaming turn must be partial");
        if self.streaming_id.is_some() {
            warn!("beginning a new streaming turn while one is already active");
        }
        let id = self.append(turn);
        self.streaming_id = Some(id);
        id
    }

    /// Replace the streaming turn's content in place, preserving identity.
    ///
    /// Returns the streaming identity, or `None` when nothing is streaming or
    /// the marker no longer points at the tail (both are controller bugs and
    /// are logged).
    pub fn replace_streaming(&mut self, text: &str) -> Option<JouleId> {
        let id = self.streaming_id?;
        match self.turns.last_mut() {
            Some(turn) if turn.id() == id => {
                turn.replace_streaming_content(text);
                Some(id)
            }
            _ => {
                warn!(%id, "streaming marker does not point at the transcript tail");
                self.streaming_id = None;
                None
            }
        }
    }

    /// Replace the streaming turn with its finalized form and clear the
    /// marker.
    ///
    /// The finalized turn takes over the streaming turn's identity and
    /// position, whatever identity it was built with. Returns the preserved
    /// identity, or `None` when nothing is streaming.
    pub fn finalize_streaming(&mut self, finalized: Joule) -> Option<JouleId> {
        let id = self.streaming_id.take()?;
        match self.turns.last_mut() {
            Some(turn) if turn.id() == id => {
                *turn = finalized.with_id(id);
                Some(id)
            }
            _ => {
                warn!(%id, "streaming marker does not point at the transcript tail");
                None
            }
        }
    }

    /// Drop every turn and the streaming marker.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.streaming_id = None;
    }
}
