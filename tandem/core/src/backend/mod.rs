//! Assistant Backend Integration
//!
//! This module provides abstracted access to the assistant backend through a
//! common trait interface. The controller depends only on the trait; the
//! shipped implementation relays commands to an aider-style HTTP bridge.
//!
//! # Usage
//!
//! ```ignore
//! use tandem_core::backend::{AiderBridge, AssistantBackend, BackendRequest};
//! use tandem_core::events::BridgeCommand;
//!
//! let bridge = AiderBridge::from_config(&config.bridge)?;
//! let request = BackendRequest::new(BridgeCommand::Ask, "what does main do?");
//! let reply = bridge.invoke(&request).await?;
//! ```

mod aider;
mod traits;

pub mod test_utils;

pub use aider::AiderBridge;
pub use traits::{AssistantBackend, BackendReply, BackendRequest, ReplyOutcome};
