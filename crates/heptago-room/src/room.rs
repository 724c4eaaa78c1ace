//! A live room: the game plus the outbound channels of its players.

use std::sync::Arc;

use heptago_protocol::{PeerId, RoomCode, ServerMessage, Slot};
use tokio::sync::Mutex;

use crate::{Broadcaster, GameRoom, PeerSender, RoomError};

/// A room as shared between connection tasks.
///
/// Hold the lock for the whole of one request: mutate, snapshot,
/// broadcast. Never acquire the registry lock while holding it.
pub type SharedRoom = Arc<Mutex<Room>>;

/// A [`GameRoom`] together with the channels its seated peers listen on.
///
/// Seats and registered senders always move together: a join registers a
/// sender, a leave or a failed send removes both.
#[derive(Debug)]
pub struct Room {
    game: GameRoom,
    outbox: Broadcaster,
    closed: bool,
}

impl Room {
    pub fn new(code: RoomCode) -> Self {
        Self {
            game: GameRoom::new(code),
            outbox: Broadcaster::new(),
            closed: false,
        }
    }

    pub fn code(&self) -> &RoomCode {
        self.game.code()
    }

    pub fn game(&self) -> &GameRoom {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut GameRoom {
        &mut self.game
    }

    /// Seats `peer` and registers its outbound channel.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if the registry already dropped this room,
    /// otherwise whatever [`GameRoom::join`] reports.
    pub fn join(&mut self, peer: PeerId, sender: PeerSender) -> Result<Slot, RoomError> {
        if self.closed {
            return Err(RoomError::NotFound(self.code().clone()));
        }
        let slot = self.game.join(peer)?;
        self.outbox.register(peer, sender);
        Ok(slot)
    }

    /// Unseats `peer`. Returns the slot it held.
    pub fn leave(&mut self, peer: PeerId) -> Option<Slot> {
        self.outbox.unregister(peer);
        self.game.leave(peer)
    }

    pub fn is_empty(&self) -> bool {
        self.game.is_empty()
    }

    /// Whether the registry has removed this room.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Marks the room closed if nobody is seated. Returns whether it is
    /// now closed; a closed room never reopens.
    pub fn close_if_empty(&mut self) -> bool {
        if self.game.is_empty() {
            self.closed = true;
        }
        self.closed
    }

    /// Sends `msg` to every seated peer. Peers that cannot be reached lose
    /// their seat, and the survivors then get a `room_update` showing the
    /// smaller roster.
    pub fn broadcast(&mut self, msg: &ServerMessage) {
        let mut failed = self.outbox.broadcast(msg);
        while self.prune(&failed) && !self.game.is_empty() {
            let update = self.room_update();
            failed = self.outbox.broadcast(&update);
        }
    }

    /// Drops the seats of `peers`. Returns whether any seat was freed.
    fn prune(&mut self, peers: &[PeerId]) -> bool {
        let mut pruned = false;
        for &peer in peers {
            if let Some(slot) = self.game.leave(peer) {
                tracing::warn!(room = %self.code(), %peer, %slot, "pruned unreachable peer");
                pruned = true;
            }
        }
        pruned
    }

    /// The `room_update` message for the current roster.
    pub fn room_update(&self) -> ServerMessage {
        ServerMessage::RoomUpdate {
            player_count: self.game.player_count(),
            players: self.game.players(),
            all_ready: self.game.all_ready(),
        }
    }

    /// Broadcasts [`room_update`](Self::room_update).
    pub fn broadcast_room_update(&mut self) {
        let msg = self.room_update();
        self.broadcast(&msg);
    }
}
