//! In-Process Transport
//!
//! Direct channel-based communication between a chat panel and the session
//! controller when both live in the same process. One side holds the
//! [`SessionTransport`] (controller), the other the [`SurfaceHandle`] (panel).
//!
//! Each direction preserves send order. A panel that applies messages in
//! arrival order therefore sees controller state in commit order; this is a
//! contract of the transport, not an accident of scheduling.
//!
//! # Usage
//!
//! ```ignore
//! let (transport, surface) = SessionTransport::new_pair();
//!
//! // Give the transport to the controller, keep the surface in the panel.
//! let (events, messages) = transport.into_parts();
//! ```

use thiserror::Error;
use tokio::sync::mpsc;

use crate::events::PanelEvent;
use crate::messages::PanelMessage;

/// Default channel capacity for a transport pair
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Errors that can occur on the transport
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer dropped its end of the channel
    #[error("Connection closed")]
    ConnectionClosed,

    /// Failed to send on the channel
    #[error("Send failed: {0}")]
    SendFailed(String),
}

/// Controller side of an in-process transport pair
///
/// Owns the inbound event stream and the outbound message channel. Hand it to
/// a session controller, or call [`SessionTransport::into_parts`] to drive the
/// ends directly.
#[derive(Debug)]
pub struct SessionTransport {
    /// Events arriving from the panel
    event_rx: mpsc::Receiver<PanelEvent>,
    /// Channel for messages going back to the panel
    msg_tx: mpsc::Sender<PanelMessage>,
}

impl SessionTransport {
    /// Create a new transport pair with the default capacity
    #[must_use]
    pub fn new_pair() -> (Self, SurfaceHandle) {
        Self::new_pair_with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a transport pair with custom channel capacity
    #[must_use]
    pub fn new_pair_with_capacity(capacity: usize) -> (Self, SurfaceHandle) {
        let (event_tx, event_rx) = mpsc::channel(capacity);
        let (msg_tx, msg_rx) = mpsc::channel(capacity);

        let transport = Self { event_rx, msg_tx };
        let surface = SurfaceHandle { event_tx, msg_rx };

        (transport, surface)
    }

    /// Split into the raw channel ends
    #[must_use]
    pub fn into_parts(self) -> (mpsc::Receiver<PanelEvent>, mpsc::Sender<PanelMessage>) {
        (self.event_rx, self.msg_tx)
    }
}

/// Panel side of an in-process transport pair
#[derive(Debug)]
pub struct SurfaceHandle {
    /// Channel for events going to the controller
    event_tx: mpsc::Sender<PanelEvent>,
    /// Messages arriving from the controller
    msg_rx: mpsc::Receiver<PanelMessage>,
}

impl SurfaceHandle {
    /// Send an event to the controller
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::SendFailed`] if the controller dropped its
    /// end of the channel.
    pub async fn send_event(&self, event: PanelEvent) -> Result<(), TransportError> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| TransportError::SendFailed("Channel closed".to_string()))
    }

    /// Receive the next message from the controller
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ConnectionClosed`] once the controller side
    /// has been dropped and the channel is drained.
    pub async fn recv_message(&mut self) -> Result<PanelMessage, TransportError> {
        self.msg_rx
            .recv()
            .await
            .ok_or(TransportError::ConnectionClosed)
    }

    /// Receive a message without waiting
    pub fn try_recv_message(&mut self) -> Option<PanelMessage> {
        self.msg_rx.try_recv().ok()
    }
}
