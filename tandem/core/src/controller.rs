//! Session Controller - The Conversation Core
//!
//! The controller owns the transcript and mediates between a chat panel and
//! the assistant bridge. One human command is in flight at a time; while a
//! call runs the session is awaiting and new commands are rejected.
//!
//! # Design Philosophy
//!
//! The controller is UI-agnostic. It doesn't know or care whether it's talking
//! to an editor panel, a TUI, or a test harness. It communicates through:
//! - `PanelMessage`: messages sent TO the panel
//! - `PanelEvent`: events received FROM the panel
//!
//! Assistant calls resolve asynchronously. Every call is tagged with the
//! session generation at dispatch time; a reset bumps the generation, so a
//! result that arrives after a reset no longer matches and is discarded
//! instead of resurrecting cleared state.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::backend::{AssistantBackend, BackendReply, BackendRequest, ReplyOutcome};
use crate::config::SessionConfig;
use crate::encode::{encode_transcript, padded_for_transmission, ModelMessage};
use crate::events::{BridgeCommand, PanelEvent};
use crate::factory::JouleFactory;
use crate::joule::{BotCodeState, BotMessageState, ExecInfo, Joule, StopReason};
use crate::messages::{NotifyLevel, PanelMessage};
use crate::transcript::Transcript;

/// Buffer for outcomes flowing back from one assistant call
const OUTCOME_CHANNEL_CAPACITY: usize = 16;

/// Failure text used when a call task dies without sending an outcome
const CALL_LOST: &str = "assistant call ended without a reply";

/// An assistant call that has been dispatched but not yet resolved
struct PendingCall {
    /// Session generation at dispatch time
    generation: u64,
    /// Outcome stream from the call task
    rx: mpsc::Receiver<ReplyOutcome>,
}

/// The session controller - headless chat core
pub struct SessionController<B: AssistantBackend> {
    /// Configuration
    config: SessionConfig,
    /// Assistant backend
    backend: Arc<B>,
    /// Turn factory
    factory: JouleFactory,
    /// The conversation so far
    transcript: Transcript,
    /// Whether a call is in flight (the panel's thinking indicator)
    thinking: bool,
    /// Session generation, bumped on every reset
    generation: u64,
    /// The in-flight call, if any
    pending: Option<PendingCall>,
    /// Channel to send messages to the panel
    tx: mpsc::Sender<PanelMessage>,
}

impl<B: AssistantBackend + 'static> SessionController<B> {
    /// Create a new controller with the given backend
    pub fn new(backend: B, config: SessionConfig, tx: mpsc::Sender<PanelMessage>) -> Self {
        Self::with_factory(backend, config, JouleFactory::new(), tx)
    }

    /// Create a controller with an explicit turn factory
    ///
    /// Lets tests inject a deterministic identity source.
    pub fn with_factory(
        backend: B,
        config: SessionConfig,
        factory: JouleFactory,
        tx: mpsc::Sender<PanelMessage>,
    ) -> Self {
        Self {
            config,
            backend: Arc::new(backend),
            factory,
            transcript: Transcript::new(),
            thinking: false,
            generation: 0,
            pending: None,
            tx,
        }
    }

    /// Get the transcript
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether a call is currently in flight
    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    /// Current session generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start the controller
    ///
    /// Probes the backend and warns the panel when it is not reachable; the
    /// session still starts, commands just fail until the bridge comes up.
    ///
    /// # Errors
    ///
    /// Currently never fails.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        if !self.backend.health_check().await {
            tracing::warn!(backend = self.backend.name(), "Assistant backend not reachable");
            self.notify(
                NotifyLevel::Warning,
                "Assistant bridge not reachable - commands will fail until it comes up",
            )
            .await;
        }
        Ok(())
    }

    /// Handle an event from the panel
    ///
    /// # Errors
    ///
    /// Currently always returns `Ok`; delivery failures toward the panel are
    /// logged rather than propagated.
    pub async fn handle_event(&mut self, event: PanelEvent) -> anyhow::Result<()> {
        match event {
            PanelEvent::SendMessage { command, message } => {
                self.handle_send_message(command, message).await;
            }

            PanelEvent::ConfirmCode { confirmed } => {
                self.handle_confirmation(confirmed).await;
            }

            PanelEvent::ResetChat => {
                // Anything in flight resolved against the old generation and
                // will be discarded on arrival. The pending receiver stays so
                // the late outcome is drained rather than leaked.
                self.generation = self.generation.wrapping_add(1);
                self.transcript.clear();
                self.send(PanelMessage::ClearTranscript).await;
                self.set_thinking(false).await;
            }

            PanelEvent::Ready => {
                // Full resync: absolute state, not edge-triggered changes
                self.send(PanelMessage::SetTranscript {
                    turns: self.transcript.turns().to_vec(),
                })
                .await;
                self.send(PanelMessage::SetThinking {
                    value: self.thinking,
                })
                .await;
            }
        }

        Ok(())
    }

    /// Handle a user message for a bridge command
    async fn handle_send_message(&mut self, command: BridgeCommand, message: String) {
        if self.thinking {
            tracing::warn!(command = %command, "Rejected message while a call is in flight");
            self.notify(
                NotifyLevel::Warning,
                "The assistant is still responding - message not sent",
            )
            .await;
            return;
        }

        if message.len() > self.config.max_message_bytes {
            tracing::warn!(
                size = message.len(),
                limit = self.config.max_message_bytes,
                "Rejected oversized message"
            );
            self.notify(
                NotifyLevel::Warning,
                &format!(
                    "Message is too large ({} bytes, limit {})",
                    message.len(),
                    self.config.max_message_bytes
                ),
            )
            .await;
            return;
        }

        // Context is the conversation before this turn
        let context = self.build_context();

        let display = format!("{command}: {message}");
        let turn = self.factory.human_message(display, None);
        let announcement = Self::turn_announcement(&turn);
        self.transcript.append(turn);
        self.send(announcement).await;

        self.set_thinking(true).await;

        let payload = if command.carries_payload() {
            message
        } else {
            String::new()
        };
        self.dispatch(command, payload, context);
    }

    /// Handle a confirmation of a pending code change
    ///
    /// The decision is recorded as a confirmation turn and relayed to the
    /// bridge as a `code` call whose payload is the decision sentinel, which
    /// tells the assistant to proceed or abandon the change.
    async fn handle_confirmation(&mut self, confirmed: bool) {
        if self.thinking {
            tracing::warn!(confirmed, "Rejected confirmation while a call is in flight");
            self.notify(
                NotifyLevel::Warning,
                "The assistant is still responding - confirmation not sent",
            )
            .await;
            return;
        }

        let context = self.build_context();

        let turn = self.factory.human_confirmation(confirmed);
        let payload = turn.display_text().to_string();
        let announcement = Self::turn_announcement(&turn);
        self.transcript.append(turn);
        self.send(announcement).await;

        self.set_thinking(true).await;

        self.dispatch(BridgeCommand::Code, payload, context);
    }

    /// Dispatch an assistant call on a background task
    fn dispatch(&mut self, command: BridgeCommand, message: String, context: Vec<ModelMessage>) {
        tracing::debug!(
            command = %command,
            context_turns = context.len(),
            generation = self.generation,
            "Dispatching assistant call"
        );

        let request = BackendRequest::new(command, message).with_context(context);
        let (tx, rx) = mpsc::channel(OUTCOME_CHANNEL_CAPACITY);
        self.pending = Some(PendingCall {
            generation: self.generation,
            rx,
        });

        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            backend.invoke_with_updates(request, tx).await;
        });
    }

    /// Poll the in-flight call for outcomes
    ///
    /// Call this regularly when driving the controller by hand (see
    /// [`SessionController::drive`] for the self-contained loop).
    /// Returns true if there was activity.
    pub async fn poll_backend(&mut self) -> bool {
        // Collect first, apply after, to keep the receiver borrow short
        let (generation, outcomes) = {
            let pending = match self.pending.as_mut() {
                Some(pending) => pending,
                None => return false,
            };

            let mut collected = Vec::new();
            loop {
                match pending.rx.try_recv() {
                    Ok(outcome) => {
                        let terminal = !matches!(outcome, ReplyOutcome::Partial(_));
                        collected.push(outcome);
                        if terminal {
                            break;
                        }
                    }
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        collected.push(ReplyOutcome::Failed(CALL_LOST.to_string()));
                        break;
                    }
                }
            }
            (pending.generation, collected)
        };

        if outcomes.is_empty() {
            return false;
        }

        for outcome in outcomes {
            self.apply_outcome(generation, outcome).await;
        }

        true
    }

    /// Run the controller until the panel hangs up
    ///
    /// Consumes the controller and processes panel events and call outcomes
    /// as they arrive. Returns when the event channel closes.
    ///
    /// # Errors
    ///
    /// Propagates errors from event handling.
    pub async fn drive(mut self, mut events: mpsc::Receiver<PanelEvent>) -> anyhow::Result<()> {
        enum Step {
            Event(Option<PanelEvent>),
            Outcome(u64, Option<ReplyOutcome>),
        }

        loop {
            let step = match self.pending.as_mut() {
                Some(pending) => tokio::select! {
                    event = events.recv() => Step::Event(event),
                    outcome = pending.rx.recv() => Step::Outcome(pending.generation, outcome),
                },
                None => Step::Event(events.recv().await),
            };

            match step {
                Step::Event(Some(event)) => self.handle_event(event).await?,
                Step::Event(None) => break,
                Step::Outcome(generation, Some(outcome)) => {
                    self.apply_outcome(generation, outcome).await;
                }
                Step::Outcome(generation, None) => {
                    self.apply_outcome(generation, ReplyOutcome::Failed(CALL_LOST.to_string()))
                        .await;
                }
            }
        }

        Ok(())
    }

    /// Apply one call outcome, discarding it when the generation is stale
    async fn apply_outcome(&mut self, generation: u64, outcome: ReplyOutcome) {
        if generation != self.generation {
            tracing::debug!(
                stale = generation,
                current = self.generation,
                "Discarding outcome from a superseded call"
            );
            if !matches!(outcome, ReplyOutcome::Partial(_)) {
                self.pending = None;
            }
            return;
        }

        match outcome {
            ReplyOutcome::Partial(text) => self.apply_partial(text).await,
            ReplyOutcome::Finished(reply) => {
                self.pending = None;
                self.apply_reply(reply).await;
            }
            ReplyOutcome::Failed(error) => {
                self.pending = None;
                self.apply_failure(&error).await;
            }
        }
    }

    /// Replace the streaming turn's content, creating it on the first update
    async fn apply_partial(&mut self, text: String) {
        let id = if self.transcript.streaming_id().is_some() {
            self.transcript.replace_streaming(&text)
        } else {
            let turn = self.factory.bot_message(
                text.clone(),
                ExecInfo::from_output(text.clone()),
                BotMessageState::Partial,
                None,
            );
            Some(self.transcript.begin_streaming(turn))
        };

        if let Some(id) = id {
            self.send(PanelMessage::ReplaceStreamingTurn { id, text }).await;
        }
    }

    /// Land a successful reply as a terminal bot turn
    async fn apply_reply(&mut self, reply: BackendReply) {
        let BackendReply {
            message,
            usage,
            code,
            stop,
        } = reply;

        let turn = match code {
            Some(code_info) => self.factory.bot_code_change(
                message.clone(),
                code_info,
                ExecInfo::from_output(message),
                BotCodeState::Complete,
            ),
            None => self.factory.bot_message(
                message.clone(),
                ExecInfo::from_output(message),
                BotMessageState::Complete,
                Some(stop.unwrap_or(StopReason::EndTurn)),
            ),
        };

        self.land_bot_turn(turn).await;

        if let Some(usage) = usage {
            self.send(PanelMessage::UpdateUsage { usage }).await;
        }

        self.set_thinking(false).await;
    }

    /// Land a failed call as a terminal error turn
    async fn apply_failure(&mut self, error: &str) {
        tracing::warn!(error, "Assistant call failed");

        let turn = self.factory.error_turn(error);
        self.land_bot_turn(turn).await;
        self.set_thinking(false).await;
    }

    /// Put a terminal bot turn into the transcript and announce it
    ///
    /// Takes over the streaming turn when one is active, so a streamed reply
    /// keeps its identity and position; otherwise appends.
    async fn land_bot_turn(&mut self, turn: Joule) {
        if self.transcript.streaming_id().is_some() {
            let text = turn.display_text().to_string();
            if let Some(id) = self.transcript.finalize_streaming(turn.clone()) {
                self.send(PanelMessage::ReplaceStreamingTurn { id, text }).await;
                self.send(PanelMessage::FinalizeStreamingTurn { id }).await;
                return;
            }
            // marker desync, land it as a fresh turn
        }

        let announcement = Self::turn_announcement(&turn);
        self.transcript.append(turn);
        self.send(announcement).await;
    }

    /// Encode the conversation so far for transmission, newest turns last
    fn build_context(&self) -> Vec<ModelMessage> {
        let turns = self.transcript.turns();
        let start = turns.len().saturating_sub(self.config.max_context_turns);
        padded_for_transmission(encode_transcript(&turns[start..]))
    }

    /// The append announcement for a freshly created turn
    fn turn_announcement(turn: &Joule) -> PanelMessage {
        PanelMessage::AppendTurn {
            id: turn.id(),
            role: turn.author(),
            text: turn.display_text().to_string(),
        }
    }

    /// Flip the thinking indicator, emitting only on change
    async fn set_thinking(&mut self, value: bool) {
        if self.thinking == value {
            return;
        }
        self.thinking = value;
        self.send(PanelMessage::SetThinking { value }).await;
    }

    /// Send a notification
    async fn notify(&self, level: NotifyLevel, message: &str) {
        self.send(PanelMessage::Notify {
            level,
            message: message.to_string(),
        })
        .await;
    }

    /// Send a message to the panel
    async fn send(&self, msg: PanelMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to panel: {}", e);
        }
    }
}
