use chrono::{ DateTime, Utc };
use serde::{ Serialize, Deserialize };
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Audio,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Audio => "audio",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// Handle to a clip retained by the session, standing in for a playable object URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioRef {
    pub id: String,
    pub size: usize,
}

/// One entry of the session log.
#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub kind: MessageKind,
    pub sender: Sender,
    pub content: String,
    pub audio: Option<AudioRef>,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user_text(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            sender: Sender::User,
            content: content.into(),
            audio: None,
            sent_at: Utc::now(),
        }
    }

    pub fn user_audio(audio: AudioRef) -> Self {
        Self {
            kind: MessageKind::Audio,
            sender: Sender::User,
            content: String::new(),
            audio: Some(audio),
            sent_at: Utc::now(),
        }
    }

    pub fn bot_text(content: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            kind: MessageKind::Text,
            sender: Sender::Bot,
            content: content.into(),
            audio: None,
            sent_at,
        }
    }
}
