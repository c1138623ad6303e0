
use async_trait::async_trait;
use log::{ debug, error, info };
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE } };
use serde_json::Value as JsonValue;

use crate::codec::{ decode_inbound, InboundEnvelope, OutboundEnvelope };
use crate::error::ChatError;
use crate::models::webhook::{ RelayForward, RelayMessage, RelayResponse };

#[async_trait]
pub trait WebhookClient: Send + Sync {
    async fn post(&self, envelope: &OutboundEnvelope) -> Result<InboundEnvelope, ChatError>;
}

fn json_http_client() -> Result<HttpClient, ChatError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    HttpClient::builder()
        .default_headers(headers)
        .build()
        .map_err(ChatError::from)
}

/// Posts envelopes to the automation webhook. One attempt per call.
#[derive(Clone)]
pub struct HttpWebhookClient {
    http: HttpClient,
    url: String,
}

impl HttpWebhookClient {
    pub fn new(url: impl Into<String>) -> Result<Self, ChatError> {
        Ok(Self {
            http: json_http_client()?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl WebhookClient for HttpWebhookClient {
    async fn post(&self, envelope: &OutboundEnvelope) -> Result<InboundEnvelope, ChatError> {
        debug!(
            "POST {} ({} message, {} payload bytes)",
            self.url,
            envelope.message_type,
            envelope.payload.len()
        );
        let resp = self.http.post(&self.url).json(&envelope.to_request()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            error!("Webhook answered HTTP {}", status.as_u16());
            return Err(ChatError::Transport {
                status: Some(status.as_u16()),
                message: format!("HTTP error! status: {}", status.as_u16()),
            });
        }

        let body = resp.bytes().await?;
        decode_inbound(&body)
    }
}

/// Forwards relay-route messages to the second fixed URL.
#[derive(Clone)]
pub struct RelayClient {
    http: HttpClient,
    url: String,
}

impl RelayClient {
    pub fn new(url: impl Into<String>) -> Result<Self, ChatError> {
        Ok(Self {
            http: json_http_client()?,
            url: url.into(),
        })
    }

    /// A non-2xx answer is reported inside the response, not as an error;
    /// only network and body-parse failures are errors.
    pub async fn forward(&self, message: &RelayMessage) -> Result<RelayResponse, ChatError> {
        let resp = self.http.post(&self.url).json(&RelayForward::from(message)).send().await?;

        let status = resp.status();
        if !status.is_success() {
            info!("Relay target answered HTTP {}", status.as_u16());
            return Ok(RelayResponse {
                success: false,
                data: None,
                error: Some(format!("HTTP error! status: {}", status.as_u16())),
            });
        }

        let body = resp.bytes().await?;
        let data: JsonValue = serde_json::from_slice(&body)?;
        Ok(RelayResponse {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}
