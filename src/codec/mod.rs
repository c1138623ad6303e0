//! Conversion between session messages and the webhook wire format.

#[cfg(test)]
mod tests;

use base64::{ engine::general_purpose::STANDARD, Engine as _ };
use chrono::{ DateTime, Utc };
use log::warn;

use crate::error::ChatError;
use crate::models::chat::{ ChatMessage, MessageKind };
use crate::models::webhook::{ Contact, WebhookBody, WebhookRequest, WebhookResponse, WireMessage };

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEnvelope {
    pub message_type: MessageKind,
    /// Raw text, or base64 bytes for audio.
    pub payload: String,
    pub sender_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEnvelope {
    pub success: bool,
    pub response_text: Option<String>,
    pub timestamp: Option<String>,
    pub session_id: Option<String>,
}

pub fn encode_outbound(
    kind: MessageKind,
    content: &str,
    sender_id: &str
) -> Result<OutboundEnvelope, ChatError> {
    if kind == MessageKind::Audio && content.is_empty() {
        return Err(ChatError::Encoding("audio message has no content".to_string()));
    }
    Ok(OutboundEnvelope {
        message_type: kind,
        payload: content.to_string(),
        sender_id: sender_id.to_string(),
    })
}

pub fn encode_audio(bytes: &[u8], sender_id: &str) -> Result<OutboundEnvelope, ChatError> {
    encode_outbound(MessageKind::Audio, &STANDARD.encode(bytes), sender_id)
}

impl OutboundEnvelope {
    pub fn to_request(&self) -> WebhookRequest {
        let (text, audio) = match self.message_type {
            MessageKind::Text => (Some(self.payload.clone()), None),
            MessageKind::Audio => (None, Some(self.payload.clone())),
        };
        WebhookRequest {
            body: WebhookBody {
                messages: vec![WireMessage {
                    kind: self.message_type,
                    text,
                    audio,
                    from: self.sender_id.clone(),
                }],
                contacts: vec![Contact { wa_id: self.sender_id.clone() }],
            },
        }
    }
}

pub fn decode_inbound(raw: &[u8]) -> Result<InboundEnvelope, ChatError> {
    let reply: WebhookResponse = serde_json::from_slice(raw)?;
    let metadata = reply.metadata.unwrap_or_default();
    Ok(InboundEnvelope {
        success: reply.success,
        response_text: reply.response,
        timestamp: metadata.timestamp,
        session_id: metadata.session_id,
    })
}

impl InboundEnvelope {
    /// Reply text worth showing, or `None` for the empty-reply case.
    pub fn reply_text(&self) -> Option<&str> {
        if !self.success {
            return None;
        }
        self.response_text.as_deref().filter(|text| !text.is_empty())
    }

    pub fn into_bot_message(self) -> Option<ChatMessage> {
        let text = self.reply_text()?.to_string();
        let sent_at = self.sent_at();
        Some(ChatMessage::bot_text(text, sent_at))
    }

    fn sent_at(&self) -> DateTime<Utc> {
        match self.timestamp.as_deref() {
            Some(raw) =>
                match DateTime::parse_from_rfc3339(raw) {
                    Ok(ts) => ts.with_timezone(&Utc),
                    Err(e) => {
                        warn!("Reply timestamp '{}' is not RFC 3339 ({}); using local time", raw, e);
                        Utc::now()
                    }
                }
            None => Utc::now(),
        }
    }
}
