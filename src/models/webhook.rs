use serde::{ Serialize, Deserialize };
use serde_json::Value as JsonValue;

use super::chat::MessageKind;

/// Request body posted to the automation webhook.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WebhookRequest {
    pub body: WebhookBody,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WebhookBody {
    pub messages: Vec<WireMessage>,
    pub contacts: Vec<Contact>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    pub from: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Contact {
    pub wa_id: String,
}

/// Reply shape of the webhook. Everything but `success` is optional so a
/// partial reply decodes into the "empty reply" case instead of failing.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub metadata: Option<ReplyMetadata>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ReplyMetadata {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}

// --- Relay route ---

/// Body accepted by the inbound relay route. Messages are optional so the
/// handler can answer a missing list with 400 instead of a parse failure.
#[derive(Deserialize, Debug)]
pub struct RelayRequest {
    #[serde(default)]
    pub body: Option<RelayRequestBody>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RelayRequestBody {
    #[serde(default)]
    pub messages: Option<Vec<RelayInboundMessage>>,
    #[serde(default)]
    pub contacts: Option<Vec<Contact>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RelayInboundMessage {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub from: String,
}

/// Internal shape handed to the relay client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RelayMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

impl From<RelayInboundMessage> for RelayMessage {
    fn from(msg: RelayInboundMessage) -> Self {
        Self {
            kind: msg.kind,
            message: msg.text,
            user_id: msg.from,
        }
    }
}

/// Body forwarded to the relay URL: same message list as the webhook but
/// without the `body` wrapper.
#[derive(Serialize, Debug, Clone)]
pub struct RelayForward {
    pub messages: Vec<RelayForwardMessage>,
    pub contacts: Vec<Contact>,
}

#[derive(Serialize, Debug, Clone)]
pub struct RelayForwardMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub from: String,
}

impl From<&RelayMessage> for RelayForward {
    fn from(msg: &RelayMessage) -> Self {
        Self {
            messages: vec![RelayForwardMessage {
                kind: msg.kind.clone(),
                text: msg.message.clone(),
                from: msg.user_id.clone(),
            }],
            contacts: vec![Contact { wa_id: msg.user_id.clone() }],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
