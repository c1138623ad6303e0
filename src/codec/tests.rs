use super::*;
use crate::models::chat::Sender;
use base64::Engine as _;
use serde_json::json;

fn reply_fixture(success: bool, response: &str, timestamp: &str, session_id: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "success": success,
        "response": response,
        "metadata": { "timestamp": timestamp, "sessionId": session_id }
    })).unwrap()
}

#[test]
fn test_text_envelope_keeps_payload_verbatim() {
    let env = encode_outbound(MessageKind::Text, "  hola  ", "Ana").unwrap();
    assert_eq!(env.payload, "  hola  ");
    assert_eq!(env.sender_id, "Ana");
    assert_eq!(env.message_type, MessageKind::Text);
}

#[test]
fn test_empty_audio_is_an_encoding_error() {
    let err = encode_outbound(MessageKind::Audio, "", "Ana").unwrap_err();
    assert!(matches!(err, ChatError::Encoding(_)));
}

#[test]
fn test_text_request_shape() {
    let env = encode_outbound(MessageKind::Text, "Hola", "Ana").unwrap();
    let value = serde_json::to_value(env.to_request()).unwrap();
    assert_eq!(
        value,
        json!({
            "body": {
                "messages": [{ "type": "text", "text": "Hola", "from": "Ana" }],
                "contacts": [{ "wa_id": "Ana" }]
            }
        })
    );
}

#[test]
fn test_audio_request_carries_exact_base64_and_no_text() {
    let bytes: Vec<u8> = (0u8..=255).chain([0, 0, 7]).collect();
    let env = encode_audio(&bytes, "Ana").unwrap();
    let value = serde_json::to_value(env.to_request()).unwrap();
    let msg = &value["body"]["messages"][0];

    assert_eq!(msg["type"], "audio");
    assert!(msg.get("text").is_none());
    let encoded = msg["audio"].as_str().unwrap();
    assert_eq!(STANDARD.decode(encoded).unwrap(), bytes);
}

#[test]
fn test_decode_success_yields_bot_message_with_reply_time() {
    let raw = reply_fixture(true, "hola", "2024-01-01T00:00:00Z", "s1");
    let inbound = decode_inbound(&raw).unwrap();
    assert_eq!(inbound.session_id.as_deref(), Some("s1"));

    let msg = inbound.into_bot_message().unwrap();
    assert_eq!(msg.content, "hola");
    assert_eq!(msg.sender, Sender::Bot);
    assert_eq!(msg.kind, MessageKind::Text);
    assert_eq!(msg.sent_at, "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
}

#[test]
fn test_unsuccessful_reply_is_empty() {
    let raw = reply_fixture(false, "ignored", "2024-01-01T00:00:00Z", "s1");
    let inbound = decode_inbound(&raw).unwrap();
    assert!(inbound.reply_text().is_none());
    assert!(inbound.into_bot_message().is_none());
}

#[test]
fn test_missing_or_blank_response_is_empty() {
    let inbound = decode_inbound(br#"{"success": true}"#).unwrap();
    assert!(inbound.into_bot_message().is_none());

    let raw = reply_fixture(true, "", "2024-01-01T00:00:00Z", "s1");
    assert!(decode_inbound(&raw).unwrap().into_bot_message().is_none());
}

#[test]
fn test_missing_success_is_decode_error() {
    let err = decode_inbound(br#"{"response": "hola"}"#).unwrap_err();
    assert!(matches!(err, ChatError::Decode(_)));
}

#[test]
fn test_garbage_is_decode_error() {
    let err = decode_inbound(b"<html>502 Bad Gateway</html>").unwrap_err();
    assert!(matches!(err, ChatError::Decode(_)));
}

#[test]
fn test_bad_timestamp_falls_back_to_now() {
    let before = Utc::now();
    let raw = reply_fixture(true, "hola", "yesterday-ish", "s1");
    let msg = decode_inbound(&raw).unwrap().into_bot_message().unwrap();
    assert!(msg.sent_at >= before);
}
