//! # Heptago
//!
//! Room server for Heptago, a Go variant for up to seven players on a
//! 19×19 board.
//!
//! Clients connect over WebSocket and exchange JSON messages. Each room
//! seats up to seven players; once all seven are ready, they take turns
//! placing stones or passing until two consecutive passes end the game
//! and the board is scored by area.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use heptago::prelude::*;
//!
//! # async fn start() -> Result<(), HeptagoError> {
//! let server = HeptagoServer::builder()
//!     .bind("127.0.0.1:8765")
//!     .room_config(RoomConfig::default())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::HeptagoError;
pub use server::{HeptagoServer, HeptagoServerBuilder, DEFAULT_BIND_ADDR};

pub use heptago_protocol as protocol;
pub use heptago_room as room;
pub use heptago_transport as transport;

/// Everything needed to start a server and talk its protocol.
pub mod prelude {
    pub use crate::{HeptagoError, HeptagoServer, HeptagoServerBuilder, DEFAULT_BIND_ADDR};
    pub use heptago_protocol::{
        ClientMessage, Codec, GameStateView, JsonCodec, MoveInfo, PeerId, PlayerInfo, RoomCode,
        ServerMessage, Slot,
    };
    pub use heptago_room::{RoomConfig, RoomError, BOARD_SIZE, MAX_PLAYERS};
}
