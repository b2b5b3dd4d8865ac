//! Wire protocol for the signaling relay.
//!
//! Every frame is a JSON envelope `{ "type": ..., "payload": ... }` with
//! camelCase payload fields. Inbound text is converted into a typed
//! [`ClientMessage`] at this boundary so the router dispatches on a closed
//! set of variants instead of probing optional fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{RoomId, SessionId};

/// Raw envelope shared by both directions.
#[derive(Debug, Deserialize)]
struct Envelope {
    r#type: String,
    #[serde(default)]
    payload: Option<Value>,
}

/// `create_room` / `join_room` request payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoomRequest {
    room_id: String,
    name: String,
}

/// Probe for the `rtc_message` payload: exactly one of the three fields is
/// expected; which one is present decides the relay direction.
#[derive(Debug, Deserialize)]
struct RtcFields {
    #[serde(default)]
    offer: Option<Value>,
    #[serde(default)]
    answer: Option<Value>,
    #[serde(default)]
    ice: Option<Value>,
}

/// A handshake payload tagged by relay direction. The embedded value is
/// opaque to the relay and forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RtcSignal {
    Offer(Value),
    Answer(Value),
    Ice(Value),
}

impl RtcFields {
    fn into_signal(self) -> Option<RtcSignal> {
        if let Some(offer) = self.offer {
            Some(RtcSignal::Offer(offer))
        } else if let Some(answer) = self.answer {
            Some(RtcSignal::Answer(answer))
        } else {
            self.ice.map(RtcSignal::Ice)
        }
    }
}

/// Typed inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Heartbeat,
    CreateRoom { room_id: String, name: String },
    JoinRoom { room_id: String, name: String },
    Rtc(RtcSignal),
}

/// Inbound frames the relay refuses to act on. Both cases are logged and
/// dropped by the caller; neither ever terminates the connection.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown message type '{0}'")]
    UnknownType(String),
}

impl ClientMessage {
    /// Parse one inbound text frame.
    ///
    /// `Ok(None)` is the silent no-op case: an `rtc_message` carrying none
    /// of `offer`/`answer`/`ice`.
    pub fn parse(text: &str) -> Result<Option<Self>, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        let payload = envelope.payload.unwrap_or(Value::Null);

        match envelope.r#type.as_str() {
            "heartbeat" => Ok(Some(Self::Heartbeat)),
            "create_room" => {
                let request: RoomRequest = serde_json::from_value(payload)?;
                Ok(Some(Self::CreateRoom {
                    room_id: request.room_id,
                    name: request.name,
                }))
            }
            "join_room" => {
                let request: RoomRequest = serde_json::from_value(payload)?;
                Ok(Some(Self::JoinRoom {
                    room_id: request.room_id,
                    name: request.name,
                }))
            }
            "rtc_message" => {
                let fields: RtcFields = serde_json::from_value(payload)?;
                Ok(fields.into_signal().map(Self::Rtc))
            }
            other => Err(ProtocolError::UnknownType(other.to_string())),
        }
    }
}

/// Typed outbound message. Serializes to the same envelope shape; unit
/// variants omit the payload key entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    Heartbeat,
    #[serde(rename_all = "camelCase")]
    RoomInfo {
        name: String,
        room_id: RoomId,
        session_id: SessionId,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_host: Option<bool>,
    },
    BothJoined,
    RtcMessage(RtcSignal),
    Error {
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_heartbeat_without_payload() {
        // given / when:
        let msg = ClientMessage::parse(r#"{"type":"heartbeat"}"#).unwrap();

        // then:
        assert_eq!(msg, Some(ClientMessage::Heartbeat));
    }

    #[test]
    fn test_parse_create_room() {
        // given / when:
        let msg = ClientMessage::parse(
            r#"{"type":"create_room","payload":{"roomId":"abc","name":"Alice"}}"#,
        )
        .unwrap();

        // then:
        assert_eq!(
            msg,
            Some(ClientMessage::CreateRoom {
                room_id: "abc".to_string(),
                name: "Alice".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_join_room() {
        // given / when:
        let msg = ClientMessage::parse(
            r#"{"type":"join_room","payload":{"roomId":"abc","name":"Bob"}}"#,
        )
        .unwrap();

        // then:
        assert_eq!(
            msg,
            Some(ClientMessage::JoinRoom {
                room_id: "abc".to_string(),
                name: "Bob".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_rtc_offer() {
        // given / when:
        let msg =
            ClientMessage::parse(r#"{"type":"rtc_message","payload":{"offer":"O"}}"#).unwrap();

        // then:
        assert_eq!(msg, Some(ClientMessage::Rtc(RtcSignal::Offer(json!("O")))));
    }

    #[test]
    fn test_parse_rtc_answer_and_ice() {
        let answer =
            ClientMessage::parse(r#"{"type":"rtc_message","payload":{"answer":"R"}}"#).unwrap();
        assert_eq!(
            answer,
            Some(ClientMessage::Rtc(RtcSignal::Answer(json!("R"))))
        );

        let ice = ClientMessage::parse(r#"{"type":"rtc_message","payload":{"ice":"I"}}"#).unwrap();
        assert_eq!(ice, Some(ClientMessage::Rtc(RtcSignal::Ice(json!("I")))));
    }

    #[test]
    fn test_parse_rtc_without_signal_fields_is_noop() {
        // given: an rtc_message carrying none of offer/answer/ice
        // when:
        let msg = ClientMessage::parse(r#"{"type":"rtc_message","payload":{}}"#).unwrap();

        // then: silently dropped, not an error
        assert_eq!(msg, None);
    }

    #[test]
    fn test_parse_unknown_type() {
        // given / when:
        let result = ClientMessage::parse(r#"{"type":"teleport","payload":{}}"#);

        // then:
        assert!(matches!(result, Err(ProtocolError::UnknownType(t)) if t == "teleport"));
    }

    #[test]
    fn test_parse_malformed_json() {
        let result = ClientMessage::parse("not json at all");
        assert!(matches!(result, Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn test_parse_create_room_with_missing_payload() {
        // payload is required for create_room; its absence is malformed
        let result = ClientMessage::parse(r#"{"type":"create_room"}"#);
        assert!(matches!(result, Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn test_serialize_heartbeat_has_no_payload_key() {
        let json = serde_json::to_value(&ServerMessage::Heartbeat).unwrap();
        assert_eq!(json, json!({"type": "heartbeat"}));
    }

    #[test]
    fn test_serialize_room_info_for_host() {
        // given:
        let session_id = SessionId::generate();
        let msg = ServerMessage::RoomInfo {
            name: "Alice".to_string(),
            room_id: RoomId::new("abc"),
            session_id,
            is_host: Some(true),
        };

        // when:
        let json = serde_json::to_value(&msg).unwrap();

        // then:
        assert_eq!(
            json,
            json!({
                "type": "room_info",
                "payload": {
                    "name": "Alice",
                    "roomId": "abc",
                    "sessionId": session_id.to_string(),
                    "isHost": true,
                },
            })
        );
    }

    #[test]
    fn test_serialize_room_info_for_guest_omits_is_host() {
        // given:
        let msg = ServerMessage::RoomInfo {
            name: "Bob".to_string(),
            room_id: RoomId::new("abc"),
            session_id: SessionId::generate(),
            is_host: None,
        };

        // when:
        let json = serde_json::to_value(&msg).unwrap();

        // then:
        assert!(json["payload"].get("isHost").is_none());
    }

    #[test]
    fn test_serialize_rtc_message_preserves_signal_shape() {
        let msg = ServerMessage::RtcMessage(RtcSignal::Offer(json!({"sdp": "v=0"})));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "rtc_message",
                "payload": {"offer": {"sdp": "v=0"}},
            })
        );
    }

    #[test]
    fn test_serialize_error_message() {
        let msg = ServerMessage::Error {
            message: "room with specified id is not present".to_string(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "error",
                "payload": {"message": "room with specified id is not present"},
            })
        );
    }
}
