//! Wire codec for channel frames.
//!
//! Inbound text is decoded as JSON with a raw-string fallback so that
//! non-JSON payloads (server heartbeats like `pong`) are never dropped.
//! Outbound payloads are either pre-serialized text passed through
//! unchanged, or structured values serialized on the way out. Neither
//! direction can fail; malformed input degrades to passing the original
//! value through.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// The frame parsed as JSON.
    Json(Value),
    /// The frame was not valid JSON; the raw text is delivered unchanged.
    Text(String),
}

impl Inbound {
    /// The structured value, if the frame parsed as JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Inbound::Json(value) => Some(value),
            Inbound::Text(_) => None,
        }
    }

    /// The raw text, if the frame did not parse.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Inbound::Json(_) => None,
            Inbound::Text(text) => Some(text),
        }
    }
}

/// An outbound payload, queued or handed directly to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Pre-serialized text, sent as-is.
    Text(String),
    /// A structured value, serialized at send time.
    Json(Value),
}

impl From<String> for Outbound {
    fn from(text: String) -> Self {
        Outbound::Text(text)
    }
}

impl From<&str> for Outbound {
    fn from(text: &str) -> Self {
        Outbound::Text(text.to_string())
    }
}

impl From<Value> for Outbound {
    fn from(value: Value) -> Self {
        Outbound::Json(value)
    }
}

/// The client-to-server event envelope: `{"type": ..., "payload": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// The event name, e.g. `card_update`.
    #[serde(rename = "type")]
    pub event: String,
    /// Arbitrary structured event data.
    pub payload: Value,
}

/// Decodes a raw inbound frame.
pub fn decode(raw: &str) -> Inbound {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Inbound::Json(value),
        Err(_) => Inbound::Text(raw.to_string()),
    }
}

/// Encodes an outbound payload to frame text.
pub fn encode(payload: &Outbound) -> String {
    match payload {
        Outbound::Text(text) => text.clone(),
        Outbound::Json(value) => value.to_string(),
    }
}

/// Builds the outbound event envelope for a named event.
pub fn event(name: impl Into<String>, payload: Value) -> Outbound {
    let envelope = EventEnvelope {
        event: name.into(),
        payload,
    };
    Outbound::Json(serde_json::to_value(envelope).unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_json_frame() {
        let decoded = decode(r#"{"a":1}"#);
        assert_eq!(decoded, Inbound::Json(json!({"a": 1})));
        assert_eq!(decoded.as_json().unwrap()["a"], 1);
    }

    #[test]
    fn test_decode_non_json_falls_back_to_text() {
        let decoded = decode("pong");
        assert_eq!(decoded, Inbound::Text("pong".to_string()));
        assert_eq!(decoded.as_text(), Some("pong"));
        assert!(decoded.as_json().is_none());
    }

    #[test]
    fn test_encode_text_passes_through() {
        let payload = Outbound::from("already serialized");
        assert_eq!(encode(&payload), "already serialized");
    }

    #[test]
    fn test_encode_json_serializes() {
        let payload = Outbound::from(json!({"id": 7}));
        let frame = encode(&payload);
        let round: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(round, json!({"id": 7}));
    }

    #[test]
    fn test_event_envelope_shape() {
        let payload = event("card_update", json!({"id": 3, "pos": 1}));
        let frame = encode(&payload);
        let envelope: EventEnvelope = serde_json::from_str(&frame).unwrap();

        assert_eq!(envelope.event, "card_update");
        assert_eq!(envelope.payload, json!({"id": 3, "pos": 1}));
    }
}
