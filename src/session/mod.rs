//! Chat session state machine.
//!
//! `LoggedOut -> Idle -> Pending -> Idle ...`, back to `LoggedOut` on logout.
//! The in-flight slot is the only guard against overlapping sends: a send
//! issued while one is outstanding is dropped, not queued. Login and logout
//! empty the slot, and a turn that no longer owns it is discarded on finish.


use log::{ debug, error, info, warn };
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{ AtomicU64, Ordering };
use uuid::Uuid;

use crate::audio::{ self, AudioCapture };
use crate::codec::{ encode_audio, encode_outbound, InboundEnvelope, OutboundEnvelope };
use crate::error::ChatError;
use crate::models::chat::{ AudioRef, ChatMessage, MessageKind };
use crate::store::NameStore;
use crate::webhook::WebhookClient;

/// Shown as a bot message when a turn fails in transport or decoding.
pub const ERROR_REPLY_TEXT: &str = "Error al procesar tu mensaje.";

/// Slot value meaning no turn is in flight.
const IDLE: u64 = 0;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub audio_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { audio_enabled: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Idle,
    Pending,
}

#[derive(Debug)]
pub enum Outgoing {
    Text(String),
    Audio(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Another send was in flight; nothing happened.
    Skipped,
    Replied,
    /// The webhook answered without a usable reply; the turn is dropped.
    NoReply,
    /// Transport or decode failure; the fixed error message was appended.
    Failed,
    /// The session logged out or in again while the turn was in flight.
    Stale,
}

/// Ownership of the in-flight slot. Releases the slot when dropped, unless
/// a newer turn or a login/logout has already taken it over.
struct InFlight {
    slot: Arc<AtomicU64>,
    turn: u64,
}

impl InFlight {
    fn is_current(&self) -> bool {
        self.slot.load(Ordering::SeqCst) == self.turn
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let _ = self.slot.compare_exchange(self.turn, IDLE, Ordering::SeqCst, Ordering::SeqCst);
    }
}

/// A send that has been accepted and is waiting on the webhook. Dropping it
/// (or a `send` future holding it) returns the session to idle.
#[must_use]
pub struct PendingTurn {
    envelope: Result<OutboundEnvelope, ChatError>,
    in_flight: InFlight,
}

impl PendingTurn {
    pub async fn dispatch(self, webhook: &dyn WebhookClient) -> TurnResult {
        let result = match self.envelope {
            Ok(envelope) => webhook.post(&envelope).await,
            Err(e) => Err(e),
        };
        TurnResult { result, in_flight: self.in_flight }
    }
}

#[must_use]
pub struct TurnResult {
    result: Result<InboundEnvelope, ChatError>,
    in_flight: InFlight,
}

pub struct ChatSession {
    webhook: Arc<dyn WebhookClient>,
    store: Arc<dyn NameStore>,
    config: SessionConfig,
    user_name: String,
    logged_in: bool,
    messages: Vec<ChatMessage>,
    in_flight: Arc<AtomicU64>,
    next_turn: u64,
    clips: HashMap<String, Vec<u8>>,
}

impl ChatSession {
    pub fn new(
        webhook: Arc<dyn WebhookClient>,
        store: Arc<dyn NameStore>,
        config: SessionConfig
    ) -> Self {
        Self {
            webhook,
            store,
            config,
            user_name: String::new(),
            logged_in: false,
            messages: Vec::new(),
            in_flight: Arc::new(AtomicU64::new(IDLE)),
            next_turn: IDLE,
            clips: HashMap::new(),
        }
    }

    /// Picks up a name persisted by a previous run. Returns whether the
    /// session is now logged in.
    pub fn restore(&mut self) -> Result<bool, ChatError> {
        if let Some(saved) = self.store.load()? {
            let saved = saved.trim();
            if !saved.is_empty() {
                info!("Restored session for '{}'", saved);
                self.user_name = saved.to_string();
                self.logged_in = true;
            }
        }
        Ok(self.logged_in)
    }

    pub fn login(&mut self, name: &str) -> Result<(), ChatError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChatError::validation("Por favor, introduce tu nombre"));
        }
        self.store.save(name)?;
        self.reset();
        self.user_name = name.to_string();
        self.logged_in = true;
        info!("Logged in as '{}'", name);
        Ok(())
    }

    /// In-memory state is always cleared; a failure to clear the persisted
    /// name is still reported.
    pub fn logout(&mut self) -> Result<(), ChatError> {
        info!("Logging out '{}'", self.user_name);
        self.reset();
        self.store.clear()
    }

    fn reset(&mut self) {
        if self.is_pending() {
            info!("Abandoning in-flight send");
        }
        self.in_flight.store(IDLE, Ordering::SeqCst);
        self.user_name.clear();
        self.logged_in = false;
        self.messages.clear();
        self.clips.clear();
    }

    /// Validates the input, appends the user's message and marks the session
    /// pending. `Ok(None)` means a send is already outstanding.
    pub fn begin_send(&mut self, input: Outgoing) -> Result<Option<PendingTurn>, ChatError> {
        if self.is_pending() {
            debug!("Send ignored: a request is already in flight");
            return Ok(None);
        }
        if !self.logged_in {
            return Err(ChatError::validation("Not logged in"));
        }

        let envelope = match input {
            Outgoing::Text(text) => {
                if text.trim().is_empty() {
                    return Err(ChatError::validation("Message is empty"));
                }
                let envelope = encode_outbound(MessageKind::Text, &text, &self.user_name);
                self.messages.push(ChatMessage::user_text(text));
                envelope
            }
            Outgoing::Audio(bytes) => {
                if !self.config.audio_enabled {
                    return Err(ChatError::validation("Audio messages are disabled"));
                }
                let envelope = encode_audio(&bytes, &self.user_name);
                let audio_ref = AudioRef {
                    id: format!("clip-{}", Uuid::new_v4()),
                    size: bytes.len(),
                };
                self.clips.insert(audio_ref.id.clone(), bytes);
                self.messages.push(ChatMessage::user_audio(audio_ref));
                envelope
            }
        };

        self.next_turn += 1;
        self.in_flight.store(self.next_turn, Ordering::SeqCst);
        Ok(
            Some(PendingTurn {
                envelope,
                in_flight: InFlight {
                    slot: Arc::clone(&self.in_flight),
                    turn: self.next_turn,
                },
            })
        )
    }

    pub fn finish_send(&mut self, turn: TurnResult) -> SendOutcome {
        if !turn.in_flight.is_current() {
            info!("Discarding reply for turn {}: session was reset", turn.in_flight.turn);
            return SendOutcome::Stale;
        }

        // `turn.in_flight` releases the slot when it goes out of scope.
        match turn.result {
            Ok(reply) => {
                if let Some(session_id) = reply.session_id.as_deref() {
                    debug!("Webhook session {}", session_id);
                }
                match reply.into_bot_message() {
                    Some(msg) => {
                        self.messages.push(msg);
                        SendOutcome::Replied
                    }
                    None => {
                        info!("Webhook returned no reply text; dropping turn");
                        SendOutcome::NoReply
                    }
                }
            }
            Err(e) => {
                match e.status() {
                    Some(status) => error!("Error sending message (HTTP {}): {}", status, e),
                    None => error!("Error sending message: {}", e),
                }
                self.messages.push(ChatMessage::bot_text(ERROR_REPLY_TEXT, chrono::Utc::now()));
                SendOutcome::Failed
            }
        }
    }

    pub async fn send(&mut self, input: Outgoing) -> Result<SendOutcome, ChatError> {
        let Some(turn) = self.begin_send(input)? else {
            return Ok(SendOutcome::Skipped);
        };
        let webhook = Arc::clone(&self.webhook);
        let result = turn.dispatch(webhook.as_ref()).await;
        Ok(self.finish_send(result))
    }

    pub async fn send_text(&mut self, text: &str) -> Result<SendOutcome, ChatError> {
        self.send(Outgoing::Text(text.to_string())).await
    }

    /// Records a clip and sends it. Capture errors surface before anything
    /// is appended, so the session stays idle.
    pub async fn send_recording(
        &mut self,
        capture: &dyn AudioCapture
    ) -> Result<SendOutcome, ChatError> {
        if self.is_pending() {
            return Ok(SendOutcome::Skipped);
        }
        if !self.config.audio_enabled {
            return Err(ChatError::validation("Audio messages are disabled"));
        }
        let bytes = audio::record(capture).await?;
        self.send(Outgoing::Audio(bytes)).await
    }

    pub fn state(&self) -> SessionState {
        match (self.logged_in, self.is_pending()) {
            (false, _) => SessionState::LoggedOut,
            (true, false) => SessionState::Idle,
            (true, true) => SessionState::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) != IDLE
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn clip(&self, id: &str) -> Option<&[u8]> {
        self.clips.get(id).map(|b| b.as_slice())
    }

    /// Bytes of the most recent audio message in the log.
    pub fn latest_clip(&self) -> Option<&[u8]> {
        self.messages
            .iter()
            .rev()
            .find_map(|m| m.audio.as_ref())
            .and_then(|audio| self.clip(&audio.id))
    }
}
