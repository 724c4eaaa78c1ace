//! Wire protocol for Heptago.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Identity** ([`PeerId`], [`Slot`], [`RoomCode`])
//! - **Messages** ([`ClientMessage`], [`ServerMessage`], [`GameStateView`])
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — bytes ↔ messages
//! - **Errors** ([`ProtocolError`])
//!
//! It knows nothing about connections or rooms.

mod codec;
mod error;
mod messages;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{ClientMessage, GameStateView, MoveInfo, PlayerInfo, ServerMessage};
pub use types::{PeerId, RoomCode, Slot};
