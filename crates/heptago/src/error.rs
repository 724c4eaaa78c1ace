//! Unified error type for the Heptago server.

use heptago_protocol::ProtocolError;
use heptago_room::RoomError;
use heptago_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` conversions let `?` carry sub-crate errors upward.
#[derive(Debug, thiserror::Error)]
pub enum HeptagoError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, not found, already seated).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use heptago_protocol::{Codec, JsonCodec, RoomCode, ServerMessage};

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let err: HeptagoError = err.into();
        assert!(matches!(err, HeptagoError::Transport(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = JsonCodec.decode::<ServerMessage>(b"{").unwrap_err();
        let err: HeptagoError = err.into();
        assert!(matches!(err, HeptagoError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error_keeps_display() {
        let err = RoomError::NotFound(RoomCode::new_unchecked("ABC123".into()));
        let err: HeptagoError = err.into();
        assert!(matches!(err, HeptagoError::Room(_)));
        assert_eq!(err.to_string(), "room not found: ABC123");
    }
}
