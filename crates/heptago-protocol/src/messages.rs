//! The JSON messages exchanged with clients.
//!
//! Every frame is a single JSON object whose `action` field names the
//! variant:
//!
//! ```text
//! client → server   {"action":"place_stone","room_code":"K3X9QA","x":3,"y":15,"player_id":2}
//! server → client   {"action":"game_update","game_state":{...},"move_info":{"type":"place",...}}
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::{RoomCode, Slot};

/// Requests a client can make.
///
/// Room codes are carried raw; the dispatcher normalizes them before any
/// lookup. A missing or `null` `room_code` decodes as the empty string so
/// that `join_room` can still answer with "room not found", and an all-digit
/// code sent as a JSON number is taken as its decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Open a new room and take slot 0 in it.
    CreateRoom,

    /// Take the next free slot in an existing room.
    JoinRoom {
        #[serde(default, deserialize_with = "room_code_text")]
        room_code: String,
    },

    /// Mark the sender ready.
    PlayerReady {
        #[serde(default, deserialize_with = "room_code_text")]
        room_code: String,
    },

    /// Put a stone on `(x, y)`; `x` selects the row.
    PlaceStone {
        #[serde(default, deserialize_with = "room_code_text")]
        room_code: String,
        x: usize,
        y: usize,
        player_id: Slot,
    },

    /// Skip the turn.
    PassTurn {
        #[serde(default, deserialize_with = "room_code_text")]
        room_code: String,
        player_id: Slot,
    },

    /// Start a fresh game with the same players.
    ResetGame {
        #[serde(default, deserialize_with = "room_code_text")]
        room_code: String,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRoomCode {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

fn room_code_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<RawRoomCode>::deserialize(deserializer)? {
        Some(RawRoomCode::Text(code)) => code,
        Some(RawRoomCode::Unsigned(n)) => n.to_string(),
        Some(RawRoomCode::Signed(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Reply to `create_room`.
    RoomCreated {
        room_code: RoomCode,
        player_id: Slot,
        message: String,
    },

    /// Reply to a successful `join_room`.
    JoinedRoom {
        room_code: RoomCode,
        player_id: Slot,
        message: String,
    },

    /// A domain error addressed to the requesting client only.
    Error { message: String },

    /// Roster changed (join, ready, or departure).
    RoomUpdate {
        player_count: usize,
        players: Vec<PlayerInfo>,
        all_ready: bool,
    },

    /// Every seat is filled and ready.
    GameStart { game_state: GameStateView },

    /// A placement or pass was accepted.
    GameUpdate {
        game_state: GameStateView,
        move_info: MoveInfo,
    },

    /// The board was cleared for a new game.
    GameReset { game_state: GameStateView },
}

/// A seated player as clients see them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: Slot,
    pub name: String,
    pub color: String,
    pub ready: bool,
}

/// The move that produced a `game_update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveInfo {
    Place { x: usize, y: usize, player_id: Slot },
    Pass { player_id: Slot },
}

/// Snapshot of one room's game, the only game representation sent to
/// clients.
///
/// `board[x][y]` holds the owning slot or `null`. `current_player` is the
/// slot whose turn it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub board: Vec<Vec<Option<Slot>>>,
    pub current_player: Slot,
    pub move_count: u32,
    pub scores: Vec<f64>,
    pub players: Vec<PlayerInfo>,
    pub game_over: bool,
}
