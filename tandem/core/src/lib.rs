//! Tandem Core - Headless Pair-Programming Chat Orchestration
//!
//! This crate provides the conversation core for tandem, completely
//! independent of any UI framework. It can drive an editor webview panel, a
//! TUI, or run headless for testing, while an aider-style assistant bridge
//! does the actual code work over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Chat Panels                          │
//! │   ┌───────────────┐  ┌─────────┐  ┌───────────────────────┐  │
//! │   │ editor webview│  │   TUI   │  │  headless / tests     │  │
//! │   └───────┬───────┘  └────┬────┘  └───────────┬───────────┘  │
//! │           └───────────────┴───────────────────┘              │
//! │                           │                                  │
//! │                    PanelEvent (up)                           │
//! │                   PanelMessage (down)                        │
//! │                           │                                  │
//! └───────────────────────────┼──────────────────────────────────┘
//!                             │
//! ┌───────────────────────────┼──────────────────────────────────┐
//! │                     TANDEM CORE                              │
//! │  ┌────────────────────────┴───────────────────────────────┐  │
//! │  │                  SessionController                     │  │
//! │  │  ┌────────────┐ ┌─────────┐ ┌─────────┐ ┌────────────┐ │  │
//! │  │  │ Transcript │ │ Factory │ │ Encoder │ │  Backend   │ │  │
//! │  │  │  (joules)  │ │  (ids)  │ │ (wire)  │ │  (bridge)  │ │  │
//! │  │  └────────────┘ └─────────┘ └─────────┘ └─────┬──────┘ │  │
//! │  └────────────────────────────────────────────────┼───────┘  │
//! └───────────────────────────────────────────────────┼──────────┘
//!                                                     │ HTTP
//!                                          assistant bridge process
//! ```
//!
//! # Key Types
//!
//! - [`SessionController`]: The main orchestration struct that owns the session
//! - [`Joule`]: One immutable conversation turn
//! - [`PanelMessage`]: Messages sent from the controller to panels
//! - [`PanelEvent`]: Events sent from panels to the controller
//! - [`AssistantBackend`]: Abstraction over the assistant bridge
//! - [`Transcript`]: Ordered turn storage with the streaming marker
//!
//! # Quick Start
//!
//! ```ignore
//! use tandem_core::{
//!     SessionController,
//!     backend::AiderBridge,
//!     config::load_config,
//!     events::{BridgeCommand, PanelEvent},
//! };
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let backend = AiderBridge::from_config(&config.bridge)?;
//!
//!     // Channels for communication with the panel
//!     let (tx, mut rx) = mpsc::channel(100);
//!     let (event_tx, event_rx) = mpsc::channel(100);
//!
//!     let mut controller = SessionController::new(backend, config, tx);
//!     controller.start().await?;
//!     tokio::spawn(controller.drive(event_rx));
//!
//!     // Send a command on behalf of the user
//!     event_tx
//!         .send(PanelEvent::SendMessage {
//!             command: BridgeCommand::Ask,
//!             message: "what does this function do?".to_string(),
//!         })
//!         .await?;
//!
//!     // Render messages as they arrive
//!     while let Some(msg) = rx.recv().await {
//!         println!("{}", msg.kind());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`joule`]: Immutable conversation turns and their states
//! - [`factory`]: Turn construction with injectable identity
//! - [`encode`]: Projection of turns into bridge wire messages
//! - [`transcript`]: Ordered turn storage with the streaming marker
//! - [`events`]: Events from panels to the controller
//! - [`messages`]: Messages from the controller to panels
//! - [`controller`]: Main session controller
//! - [`backend`]: Assistant backend abstraction and the aider HTTP bridge
//! - [`config`]: TOML configuration file and environment overrides
//! - [`transport`]: In-process channel transport for embedded panels
//!
//! # No UI Dependencies
//!
//! This crate has **zero** dependencies on any UI framework. It's pure
//! conversation logic that can be embedded anywhere.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod config;
pub mod controller;
pub mod encode;
pub mod events;
pub mod factory;
pub mod joule;
pub mod messages;
pub mod transcript;
pub mod transport;

// Re-exports for convenience
pub use backend::{AiderBridge, AssistantBackend, BackendReply, BackendRequest, ReplyOutcome};
pub use controller::SessionController;
pub use encode::{
    encode_joule, encode_transcript, padded_for_transmission, ModelMessage, ModelRole,
    EMPTY_CONTENT_PLACEHOLDER,
};
pub use events::{BridgeCommand, PanelEvent};
pub use factory::{IdentitySource, JouleFactory, RandomIds, SequentialIds};
pub use joule::{
    Author, BotCodeState, BotMessageState, CodeInfo, ContextPaths, ExecInfo, Joule, JouleId,
    JouleState, StopReason, CONFIRMATION_ACCEPTED, CONFIRMATION_DECLINED, ERROR_RAW_OUTPUT,
};
pub use messages::{NotifyLevel, PanelMessage, UsageMetrics};
pub use transcript::Transcript;

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, BridgeSettings, BridgeToml,
    ConfigError, ConfigSource, LimitsToml, SessionConfig, SessionToml,
};

// Transport exports
pub use transport::{
    SessionTransport, SurfaceHandle, TransportError, DEFAULT_CHANNEL_CAPACITY,
};
