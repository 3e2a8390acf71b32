//! API Encoder
//!
//! Pure projection from turns to the role/content shape the upstream
//! language-model API consumes. Human turns become `user` messages, bot turns
//! become `assistant` messages; the exact lowercase role strings are an API
//! compatibility contract and must not drift.
//!
//! Content rules: a human message contributes its text verbatim, a
//! confirmation contributes one of two fixed sentinel strings, and a bot turn
//! contributes its verbatim `raw_output` rather than the display text (which
//! may have been post-processed for humans).
//!
//! Encoding is side-effect free and order-preserving; the controller applies
//! it to the whole transcript when building a backend request.

use serde::{Deserialize, Serialize};

use crate::joule::{Joule, CONFIRMATION_ACCEPTED, CONFIRMATION_DECLINED};

/// Placeholder substituted for empty content before transmission.
///
/// The upstream API rejects empty message content. Substitution is a caller
/// obligation when building a request (see [`padded_for_transmission`]); the
/// encoder itself reports content verbatim, empty or not.
pub const EMPTY_CONTENT_PLACEHOLDER: &str = "...";

/// Role vocabulary of the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelRole {
    /// Human-authored turns; serializes as `"user"`.
    User,
    /// Assistant-authored turns; serializes as `"assistant"`.
    Assistant,
}

/// One transcript entry in the shape the upstream API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMessage {
    /// API role.
    pub role: ModelRole,
    /// Message content; may be empty until padded for transmission.
    pub content: String,
}

/// Project one turn into the upstream API shape.
///
/// Total over the closed variant set: there is no failure path.
pub fn encode_joule(joule: &Joule) -> ModelMessage {
    match joule {
        Joule::HumanMessage { text, .. } => ModelMessage {
            role: ModelRole::User,
            content: text.clone(),
        },
        Joule::HumanConfirmation { confirmed, .. } => ModelMessage {
            role: ModelRole::User,
            content: if *confirmed {
                CONFIRMATION_ACCEPTED.to_string()
            } else {
                CONFIRMATION_DECLINED.to_string()
            },
        },
        Joule::BotMessage { exec_info, .. } | Joule::BotCodeChange { exec_info, .. } => {
            ModelMessage {
                role: ModelRole::Assistant,
                content: exec_info.raw_output.clone(),
            }
        }
    }
}

/// Project a whole transcript, preserving order.
pub fn encode_transcript(turns: &[Joule]) -> Vec<ModelMessage> {
    turns.iter().map(encode_joule).collect()
}

/// Apply the empty-content substitution the upstream API requires.
#[must_use]
pub fn padded_for_transmission(mut messages: Vec<ModelMessage>) -> Vec<ModelMessage> {
    for message in &mut messages {
        if message.content.is_empty() {
            message.content = EMPTY_CONTENT_PLACEHOLDER.to_string();
        }
    }
    messages
}
