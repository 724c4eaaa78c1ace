//! Error types for the room layer.

use heptago_protocol::{PeerId, RoomCode};

/// Errors that can occur during room operations.
///
/// The `Display` text of `NotFound`, `RoomFull` and `AlreadyInRoom` is
/// what the requesting client sees in its `error` reply.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No live room has this code.
    #[error("room not found: {0}")]
    NotFound(RoomCode),

    /// Every seat in the room has been handed out.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The peer already holds a seat in this room.
    #[error("{0} is already in room {1}")]
    AlreadyInRoom(PeerId, RoomCode),

    /// Every random draw collided with a live room.
    #[error("no free room code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },
}
