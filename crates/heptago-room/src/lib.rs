//! Rooms for Heptago: the board, the game rules, the registry of live
//! rooms, and broadcast fan-out.
//!
//! # Key types
//!
//! - [`Board`] — 19×19 cell ownership
//! - [`GameRoom`] — roster, turns, placement, capture, scoring, snapshots
//! - [`Room`] / [`SharedRoom`] — a game plus its peers' outbound channels
//! - [`Broadcaster`] — fan-out with pruning of unreachable peers
//! - [`RoomRegistry`] — code → room, creation and deletion

mod board;
mod broadcast;
mod config;
mod error;
mod game;
mod registry;
mod room;

pub use board::Board;
pub use broadcast::{Broadcaster, PeerSender};
pub use config::{
    PaletteEntry, RoomConfig, BOARD_SIZE, CAPTURE_REWARD, CAPTURE_SURROUND, MAX_PLAYERS, PALETTE,
    PASSES_TO_END, ROOM_CODE_ALPHABET,
};
pub use error::RoomError;
pub use game::{CaptureEvent, GameRoom};
pub use registry::RoomRegistry;
pub use room::{Room, SharedRoom};
