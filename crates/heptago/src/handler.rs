//! Per-connection handling: decode requests, route them to rooms, and
//! clean up on disconnect.
//!
//! Each accepted connection runs two tasks:
//!   1. a writer that drains the peer's outbound queue onto the socket
//!   2. the reader loop below, which feeds every frame to a
//!      [`SessionDispatcher`]
//!
//! When the reader loop ends, the dispatcher removes the peer from every
//! room it joined and the writer is stopped.

use std::sync::Arc;

use heptago_protocol::{
    ClientMessage, Codec, MoveInfo, PeerId, RoomCode, ServerMessage, Slot,
};
use heptago_room::{PeerSender, Room, RoomError, SharedRoom};
use heptago_transport::{Connection, WebSocketConnection};
use tokio::sync::{mpsc, OwnedMutexGuard};

use crate::server::ServerState;
use crate::HeptagoError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), HeptagoError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let peer = PeerId(conn_id.into_inner());
    tracing::debug!(%conn_id, %peer, "handling new connection");

    let (outbox, mut inbox) = mpsc::unbounded_channel::<ServerMessage>();
    let writer = {
        let conn = Arc::clone(&conn);
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = inbox.recv().await {
                let bytes = match state.codec.encode(&msg) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(%peer, error = %e, "failed to encode message");
                        continue;
                    }
                };
                if let Err(e) = conn.send(&bytes).await {
                    tracing::debug!(%peer, error = %e, "send failed, stopping writer");
                    break;
                }
            }
        })
    };

    let mut dispatcher = SessionDispatcher::new(peer, outbox, Arc::clone(&state));
    let result = loop {
        match conn.recv().await {
            Ok(Some(data)) => dispatcher.handle_raw(&data).await,
            Ok(None) => {
                tracing::info!(%peer, "connection closed cleanly");
                break Ok(());
            }
            Err(e) => break Err(HeptagoError::Transport(e)),
        }
    };

    dispatcher.disconnect().await;
    writer.abort();
    let _ = conn.close().await;
    result
}

/// Routes one peer's requests to the rooms it is in.
///
/// The dispatcher only remembers which rooms the peer joined, so they can
/// be left on disconnect. Joining a second room leaves the first one
/// untouched.
pub(crate) struct SessionDispatcher<C: Codec> {
    peer: PeerId,
    outbox: PeerSender,
    memberships: Vec<RoomCode>,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> SessionDispatcher<C> {
    pub(crate) fn new(peer: PeerId, outbox: PeerSender, state: Arc<ServerState<C>>) -> Self {
        Self {
            peer,
            outbox,
            memberships: Vec::new(),
            state,
        }
    }

    /// Decodes one inbound frame and handles it. Undecodable frames are
    /// dropped.
    pub(crate) async fn handle_raw(&mut self, data: &[u8]) {
        match self.state.codec.decode::<ClientMessage>(data) {
            Ok(msg) => self.handle(msg).await,
            Err(e) => {
                tracing::debug!(peer = %self.peer, error = %e, "ignoring undecodable message");
            }
        }
    }

    pub(crate) async fn handle(&mut self, msg: ClientMessage) {
        match msg {
            ClientMessage::CreateRoom => self.create_room().await,
            ClientMessage::JoinRoom { room_code } => self.join_room(&room_code).await,
            ClientMessage::PlayerReady { room_code } => self.player_ready(&room_code).await,
            ClientMessage::PlaceStone {
                room_code,
                x,
                y,
                player_id,
            } => self.place_stone(&room_code, x, y, player_id).await,
            ClientMessage::PassTurn {
                room_code,
                player_id,
            } => self.pass_turn(&room_code, player_id).await,
            ClientMessage::ResetGame { room_code } => self.reset_game(&room_code).await,
        }
    }

    async fn create_room(&mut self) {
        let mut rooms = self.state.rooms.lock().await;
        let (code, shared) = match rooms.create_room() {
            Ok(created) => created,
            Err(e) => {
                tracing::warn!(peer = %self.peer, error = %e, "room creation failed");
                self.reply_error(&e);
                return;
            }
        };

        // Seat the creator before the registry lock is released, so no
        // other peer can see the room empty.
        let joined = shared.lock().await.join(self.peer, self.outbox.clone());
        match joined {
            Ok(slot) => {
                self.memberships.push(code.clone());
                self.reply(ServerMessage::RoomCreated {
                    message: format!("Room created, room code: {code}"),
                    room_code: code,
                    player_id: slot,
                });
            }
            Err(e) => {
                if shared.lock().await.close_if_empty() {
                    rooms.remove_closed(&code, &shared);
                }
                self.reply_error(&e);
            }
        }
    }

    async fn join_room(&mut self, raw: &str) {
        let Some(mut room) = self.lock_room(raw).await else {
            let code = RoomCode::normalize(raw)
                .unwrap_or_else(|| RoomCode::new_unchecked(String::new()));
            tracing::debug!(peer = %self.peer, room = %code, "join of unknown room");
            self.reply_error(&RoomError::NotFound(code));
            return;
        };

        match room.join(self.peer, self.outbox.clone()) {
            Ok(slot) => {
                let code = room.code().clone();
                self.memberships.push(code.clone());
                self.reply(ServerMessage::JoinedRoom {
                    message: format!("Joined room {code}"),
                    room_code: code,
                    player_id: slot,
                });
                room.broadcast_room_update();
                self.settle(room).await;
            }
            Err(e) => {
                tracing::debug!(
                    peer = %self.peer,
                    room = %room.code(),
                    error = %e,
                    "join rejected"
                );
                self.reply_error(&e);
            }
        }
    }

    async fn player_ready(&mut self, raw: &str) {
        let Some(mut room) = self.lock_room(raw).await else {
            return;
        };
        if !room.game_mut().set_ready(self.peer) {
            tracing::debug!(
                peer = %self.peer,
                room = %room.code(),
                "ready from non-member ignored"
            );
            return;
        }

        if room.game().all_ready() {
            tracing::info!(room = %room.code(), "game started");
            let msg = ServerMessage::GameStart {
                game_state: room.game().snapshot(),
            };
            room.broadcast(&msg);
        } else {
            room.broadcast_room_update();
        }
        self.settle(room).await;
    }

    async fn place_stone(&mut self, raw: &str, x: usize, y: usize, player_id: Slot) {
        let Some(mut room) = self.lock_turn_holder(raw, player_id).await else {
            return;
        };
        if !room.game_mut().place_stone(x, y, player_id) {
            tracing::debug!(room = %room.code(), x, y, %player_id, "illegal placement ignored");
            return;
        }

        let msg = ServerMessage::GameUpdate {
            game_state: room.game().snapshot(),
            move_info: MoveInfo::Place { x, y, player_id },
        };
        room.broadcast(&msg);
        self.settle(room).await;
    }

    async fn pass_turn(&mut self, raw: &str, player_id: Slot) {
        let Some(mut room) = self.lock_turn_holder(raw, player_id).await else {
            return;
        };
        if !room.game_mut().pass_turn(player_id) {
            tracing::debug!(room = %room.code(), %player_id, "pass after game over ignored");
            return;
        }

        let msg = ServerMessage::GameUpdate {
            game_state: room.game().snapshot(),
            move_info: MoveInfo::Pass { player_id },
        };
        room.broadcast(&msg);
        self.settle(room).await;
    }

    async fn reset_game(&mut self, raw: &str) {
        let Some(mut room) = self.lock_room(raw).await else {
            return;
        };
        if room.game().slot_of(self.peer).is_none() {
            tracing::debug!(
                peer = %self.peer,
                room = %room.code(),
                "reset from non-member ignored"
            );
            return;
        }

        room.game_mut().reset_game();
        let msg = ServerMessage::GameReset {
            game_state: room.game().snapshot(),
        };
        room.broadcast(&msg);
        self.settle(room).await;
    }

    /// Leaves every room this peer joined. Survivors get a `room_update`
    /// even if a failed send already cost this peer its seat; rooms left
    /// empty are deleted.
    pub(crate) async fn disconnect(&mut self) {
        for code in std::mem::take(&mut self.memberships) {
            let Some(mut room) = self.lock_room(code.as_str()).await else {
                continue;
            };
            room.leave(self.peer);
            if !room.is_empty() {
                room.broadcast_room_update();
            }
            self.settle(room).await;
        }
    }

    // -- Helpers --

    /// Looks the room up and locks it. The registry lock is released
    /// before the room lock is taken.
    async fn lock_room(&self, raw: &str) -> Option<OwnedMutexGuard<Room>> {
        let shared: SharedRoom = self.state.rooms.lock().await.get(raw)?;
        Some(shared.lock_owned().await)
    }

    /// Locks the room only if this peer is seated as `player_id` and it is
    /// that slot's turn.
    async fn lock_turn_holder(
        &self,
        raw: &str,
        player_id: Slot,
    ) -> Option<OwnedMutexGuard<Room>> {
        let room = self.lock_room(raw).await?;
        let game = room.game();
        if game.slot_of(self.peer) != Some(player_id) || !game.holds_turn(player_id) {
            tracing::debug!(
                peer = %self.peer,
                room = %room.code(),
                %player_id,
                current = ?game.current_slot(),
                "out-of-turn move ignored"
            );
            return None;
        }
        Some(room)
    }

    /// Releases the room. If nobody is left in it, it is closed under its
    /// own lock and then deleted from the registry.
    async fn settle(&self, mut room: OwnedMutexGuard<Room>) {
        if !room.close_if_empty() {
            return;
        }
        let shared = Arc::clone(OwnedMutexGuard::mutex(&room));
        let code = room.code().clone();
        drop(room);
        self.state.rooms.lock().await.remove_closed(&code, &shared);
    }

    fn reply(&self, msg: ServerMessage) {
        if self.outbox.send(msg).is_err() {
            tracing::debug!(peer = %self.peer, "reply dropped, writer gone");
        }
    }

    fn reply_error(&self, err: &RoomError) {
        self.reply(ServerMessage::Error {
            message: err.to_string(),
        });
    }
}
