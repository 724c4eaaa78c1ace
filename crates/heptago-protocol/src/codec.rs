//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The server never calls `serde_json` directly; every inbound frame is
//! decoded and every outbound message encoded through a [`Codec`].

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is what browser clients speak: one JSON object per frame.
///
/// ```rust
/// use heptago_protocol::{ClientMessage, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let msg: ClientMessage = codec
///     .decode(br#"{"action":"join_room","room_code":" ab12cd "}"#)
///     .unwrap();
/// assert_eq!(
///     msg,
///     ClientMessage::JoinRoom { room_code: " ab12cd ".into() }
/// );
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientMessage, ServerMessage, Slot};

    #[test]
    fn test_decode_rejects_malformed_json() {
        let result: Result<ClientMessage, _> = JsonCodec.decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_unknown_action() {
        let result: Result<ClientMessage, _> = JsonCodec.decode(br#"{"action":"resign"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_rejects_missing_action() {
        let result: Result<ClientMessage, _> = JsonCodec.decode(br#"{"room_code":"ABC123"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_produces_action_tag() {
        let bytes = JsonCodec
            .encode(&ServerMessage::Error {
                message: "room is full".into(),
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["action"], "error");
        assert_eq!(value["message"], "room is full");
    }

    #[test]
    fn test_decode_place_stone() {
        let msg: ClientMessage = JsonCodec
            .decode(br#"{"action":"place_stone","room_code":"abc123","x":3,"y":4,"player_id":2}"#)
            .unwrap();
        assert_eq!(
            msg,
            ClientMessage::PlaceStone {
                room_code: "abc123".into(),
                x: 3,
                y: 4,
                player_id: Slot(2),
            }
        );
    }

    #[test]
    fn test_decode_place_stone_without_coordinates_fails() {
        let result: Result<ClientMessage, _> = JsonCodec
            .decode(br#"{"action":"place_stone","room_code":"abc123","player_id":0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_negative_coordinate_fails() {
        let result: Result<ClientMessage, _> = JsonCodec
            .decode(br#"{"action":"place_stone","room_code":"abc123","x":-1,"y":0,"player_id":0}"#);
        assert!(result.is_err());
    }
}
