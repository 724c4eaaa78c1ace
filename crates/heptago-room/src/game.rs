//! One room's game: roster, turn order, placement, capture and scoring.
//!
//! `GameRoom` is plain synchronous state. It never checks whose turn it is
//! on behalf of a caller; the dispatcher does that with
//! [`GameRoom::holds_turn`] before calling [`GameRoom::place_stone`] or
//! [`GameRoom::pass_turn`].

use std::collections::BTreeSet;

use heptago_protocol::{GameStateView, PeerId, PlayerInfo, RoomCode, Slot};

use crate::{
    Board, RoomError, CAPTURE_REWARD, CAPTURE_SURROUND, MAX_PLAYERS, PALETTE, PASSES_TO_END,
};

/// A stone removed by capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureEvent {
    pub x: usize,
    pub y: usize,
    /// Owner of the removed stone.
    pub captured: Slot,
    /// The four distinct surrounding players, ascending.
    pub captors: Vec<Slot>,
}

#[derive(Debug, Clone)]
struct Seat {
    peer: PeerId,
    player: PlayerInfo,
}

/// The state of one room's game.
///
/// ## Turn pointer
///
/// `current_player` indexes the roster (seated players in join order), so
/// it always lies in `[0, player_count)` while anyone is seated. With no
/// departures roster index and slot coincide. When a player leaves, the
/// turn stays with whoever held it; if the leaver held it, it moves to
/// the next seated player.
#[derive(Debug, Clone)]
pub struct GameRoom {
    code: RoomCode,
    board: Board,
    seats: Vec<Seat>,
    /// Slots are never reused, so this only grows.
    next_slot: u8,
    current_player: usize,
    move_count: u32,
    pass_count: u32,
    scores: [f64; MAX_PLAYERS],
    captures: Vec<CaptureEvent>,
    game_over: bool,
}

impl GameRoom {
    /// Creates an empty room with a fresh board.
    pub fn new(code: RoomCode) -> Self {
        Self {
            code,
            board: Board::new(),
            seats: Vec::with_capacity(MAX_PLAYERS),
            next_slot: 0,
            current_player: 0,
            move_count: 0,
            pass_count: 0,
            scores: [0.0; MAX_PLAYERS],
            captures: Vec::new(),
            game_over: false,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    // -- Roster --

    /// Seats `peer` in the next slot.
    ///
    /// # Errors
    /// [`RoomError::AlreadyInRoom`] if `peer` is seated already,
    /// [`RoomError::RoomFull`] once seven players are seated or all seven
    /// slots have been handed out.
    pub fn join(&mut self, peer: PeerId) -> Result<Slot, RoomError> {
        if self.slot_of(peer).is_some() {
            return Err(RoomError::AlreadyInRoom(peer, self.code.clone()));
        }
        let index = usize::from(self.next_slot);
        if self.seats.len() >= MAX_PLAYERS || index >= MAX_PLAYERS {
            return Err(RoomError::RoomFull(self.code.clone()));
        }

        let slot = Slot(self.next_slot);
        self.next_slot += 1;
        let palette = PALETTE[index];
        self.seats.push(Seat {
            peer,
            player: PlayerInfo {
                id: slot,
                name: palette.name.to_string(),
                color: palette.color.to_string(),
                ready: false,
            },
        });

        tracing::info!(
            room = %self.code,
            %peer,
            %slot,
            players = self.seats.len(),
            "player joined"
        );
        Ok(slot)
    }

    /// Removes `peer`'s seat and returns the slot it held.
    pub fn leave(&mut self, peer: PeerId) -> Option<Slot> {
        let position = self.seats.iter().position(|s| s.peer == peer)?;
        let seat = self.seats.remove(position);

        if position < self.current_player {
            self.current_player -= 1;
        }
        if self.current_player >= self.seats.len() {
            self.current_player = 0;
        }

        tracing::info!(
            room = %self.code,
            %peer,
            slot = %seat.player.id,
            players = self.seats.len(),
            "player left"
        );
        Some(seat.player.id)
    }

    /// Marks `peer` ready. Returns `false` if `peer` is not seated here.
    pub fn set_ready(&mut self, peer: PeerId) -> bool {
        match self.seats.iter_mut().find(|s| s.peer == peer) {
            Some(seat) => {
                seat.player.ready = true;
                true
            }
            None => false,
        }
    }

    /// True iff all seven seats are filled and every player is ready.
    pub fn all_ready(&self) -> bool {
        self.seats.len() == MAX_PLAYERS && self.seats.iter().all(|s| s.player.ready)
    }

    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// The slot `peer` holds, if seated.
    pub fn slot_of(&self, peer: PeerId) -> Option<Slot> {
        self.seats
            .iter()
            .find(|s| s.peer == peer)
            .map(|s| s.player.id)
    }

    /// Seated players in join order.
    pub fn players(&self) -> Vec<PlayerInfo> {
        self.seats.iter().map(|s| s.player.clone()).collect()
    }

    // -- Turn order --

    /// Roster index of the player to move.
    pub fn current_player(&self) -> usize {
        self.current_player
    }

    /// Slot of the player to move, `None` when the room is empty.
    pub fn current_slot(&self) -> Option<Slot> {
        self.seats.get(self.current_player).map(|s| s.player.id)
    }

    /// Whether `slot` is the player to move.
    pub fn holds_turn(&self, slot: Slot) -> bool {
        self.current_slot() == Some(slot)
    }

    fn advance_turn(&mut self) {
        if !self.seats.is_empty() {
            self.current_player = (self.current_player + 1) % self.seats.len();
        }
    }

    // -- Play --

    /// Places a stone for `slot` at `(x, y)`, resolves capture of that
    /// stone, and passes the turn on.
    ///
    /// Returns `false` without changing anything if the game is over or
    /// the cell is taken or off the board.
    pub fn place_stone(&mut self, x: usize, y: usize, slot: Slot) -> bool {
        if self.game_over || !self.board.place(x, y, slot) {
            return false;
        }
        self.move_count += 1;
        self.pass_count = 0;
        self.resolve_capture(x, y);
        self.advance_turn();
        true
    }

    /// A stone whose orthogonal neighbours belong to four different
    /// players is removed, and each of them earns [`CAPTURE_REWARD`].
    fn resolve_capture(&mut self, x: usize, y: usize) {
        let captors: BTreeSet<Slot> = self
            .board
            .neighbors4(x, y)
            .filter_map(|(nx, ny)| self.board.get(nx, ny))
            .collect();
        if captors.len() != CAPTURE_SURROUND {
            return;
        }
        let Some(captured) = self.board.get(x, y) else {
            return;
        };

        self.board.clear(x, y);
        for captor in &captors {
            if let Some(score) = self.scores.get_mut(captor.index()) {
                *score += CAPTURE_REWARD;
            }
        }

        let captors: Vec<Slot> = captors.into_iter().collect();
        tracing::info!(room = %self.code, x, y, %captured, ?captors, "stone captured");
        self.captures.push(CaptureEvent {
            x,
            y,
            captured,
            captors,
        });
    }

    /// Skips the turn of `slot`. The second consecutive pass ends the game
    /// and replaces the scores with area control.
    ///
    /// Returns `false` if the game was already over.
    pub fn pass_turn(&mut self, slot: Slot) -> bool {
        if self.game_over {
            return false;
        }
        self.move_count += 1;
        self.pass_count += 1;
        self.advance_turn();

        if self.pass_count >= PASSES_TO_END {
            self.game_over = true;
            self.score_area();
            tracing::info!(
                room = %self.code,
                last_pass = %slot,
                moves = self.move_count,
                scores = ?self.scores,
                "game finished"
            );
        }
        true
    }

    /// Each slot scores one point per stone it has on the board. Capture
    /// bonuses accrued during play are discarded.
    fn score_area(&mut self) {
        let counts = self.board.occupied_counts();
        for (score, count) in self.scores.iter_mut().zip(counts) {
            *score = f64::from(count);
        }
    }

    /// Clears the board, counters, scores and capture log. Seats and
    /// ready flags stay.
    pub fn reset_game(&mut self) {
        self.board = Board::new();
        self.current_player = 0;
        self.move_count = 0;
        self.pass_count = 0;
        self.scores = [0.0; MAX_PLAYERS];
        self.captures.clear();
        self.game_over = false;
        tracing::info!(room = %self.code, players = self.seats.len(), "game reset");
    }

    // -- Views --

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn pass_count(&self) -> u32 {
        self.pass_count
    }

    pub fn scores(&self) -> &[f64; MAX_PLAYERS] {
        &self.scores
    }

    /// Every capture since the last reset, oldest first.
    pub fn captures(&self) -> &[CaptureEvent] {
        &self.captures
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// The client-facing view of the game.
    pub fn snapshot(&self) -> GameStateView {
        GameStateView {
            board: self.board.rows(),
            current_player: self.current_slot().unwrap_or(Slot(0)),
            move_count: self.move_count,
            scores: self.scores.to_vec(),
            players: self.players(),
            game_over: self.game_over,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BOARD_SIZE;

    fn code() -> RoomCode {
        RoomCode::new_unchecked("TEST01".into())
    }

    /// A room with `n` seated peers, `PeerId(0)` .. `PeerId(n - 1)`.
    fn room_with(n: u64) -> GameRoom {
        let mut room = GameRoom::new(code());
        for p in 0..n {
            room.join(PeerId(p)).unwrap();
        }
        room
    }

    /// Writes a stone straight onto the board to set up a position.
    fn put(room: &mut GameRoom, x: usize, y: usize, slot: u8) {
        assert!(room.board.place(x, y, Slot(slot)));
    }

    // -- join / leave --

    #[test]
    fn test_join_assigns_sequential_slots_with_palette() {
        let mut room = GameRoom::new(code());
        assert_eq!(room.join(PeerId(10)).unwrap(), Slot(0));
        assert_eq!(room.join(PeerId(11)).unwrap(), Slot(1));

        let players = room.players();
        assert_eq!(players[0].name, "Red");
        assert_eq!(players[1].color, "#FF7700");
        assert!(players.iter().all(|p| !p.ready));
    }

    #[test]
    fn test_eighth_join_is_rejected_and_roster_unchanged() {
        let mut room = room_with(7);
        let before = room.players();

        let result = room.join(PeerId(99));
        assert!(matches!(result, Err(RoomError::RoomFull(_))));
        assert_eq!(room.players(), before);
        assert_eq!(room.player_count(), 7);
    }

    #[test]
    fn test_join_twice_is_rejected() {
        let mut room = room_with(1);
        assert!(matches!(
            room.join(PeerId(0)),
            Err(RoomError::AlreadyInRoom(PeerId(0), _))
        ));
        assert_eq!(room.player_count(), 1);
    }

    #[test]
    fn test_slots_are_not_reused_after_leave() {
        let mut room = room_with(3);
        assert_eq!(room.leave(PeerId(1)), Some(Slot(1)));
        assert_eq!(room.join(PeerId(50)).unwrap(), Slot(3));
        let ids: Vec<_> = room.players().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![Slot(0), Slot(2), Slot(3)]);
    }

    #[test]
    fn test_join_rejected_once_all_slots_handed_out() {
        let mut room = room_with(7);
        room.leave(PeerId(3));
        assert_eq!(room.player_count(), 6);
        assert!(matches!(room.join(PeerId(99)), Err(RoomError::RoomFull(_))));
    }

    #[test]
    fn test_leave_unknown_peer_is_noop() {
        let mut room = room_with(2);
        assert_eq!(room.leave(PeerId(42)), None);
        assert_eq!(room.player_count(), 2);
    }

    // -- readiness --

    #[test]
    fn test_all_ready_requires_full_room() {
        let mut room = room_with(6);
        for p in 0..6 {
            assert!(room.set_ready(PeerId(p)));
        }
        // Six ready players can never start.
        assert!(!room.all_ready());

        room.join(PeerId(6)).unwrap();
        assert!(!room.all_ready());
        room.set_ready(PeerId(6));
        assert!(room.all_ready());
    }

    #[test]
    fn test_set_ready_for_stranger_returns_false() {
        let mut room = room_with(1);
        assert!(!room.set_ready(PeerId(5)));
    }

    // -- turn pointer --

    #[test]
    fn test_turn_advances_by_one_modulo_player_count() {
        let mut room = room_with(3);
        assert_eq!(room.current_player(), 0);
        assert!(room.place_stone(5, 5, Slot(0)));
        assert_eq!(room.current_player(), 1);
        assert!(room.pass_turn(Slot(1)));
        assert_eq!(room.current_player(), 2);
        assert!(room.place_stone(6, 6, Slot(2)));
        assert_eq!(room.current_player(), 0);
    }

    #[test]
    fn test_rejected_placement_does_not_advance_turn() {
        let mut room = room_with(2);
        room.place_stone(1, 1, Slot(0));
        assert!(!room.place_stone(1, 1, Slot(1)));
        assert_eq!(room.current_player(), 1);
        assert_eq!(room.move_count(), 1);
    }

    #[test]
    fn test_leave_keeps_turn_with_same_player() {
        let mut room = room_with(4);
        room.pass_turn(Slot(0));
        room.place_stone(0, 0, Slot(1));
        assert_eq!(room.current_slot(), Some(Slot(2)));

        // Someone earlier in the roster leaves: slot 2 keeps the turn.
        room.leave(PeerId(0));
        assert_eq!(room.current_slot(), Some(Slot(2)));
        assert!(room.current_player() < room.player_count());
    }

    #[test]
    fn test_leave_of_turn_holder_passes_turn_on() {
        let mut room = room_with(3);
        room.place_stone(0, 0, Slot(0));
        room.place_stone(0, 1, Slot(1));
        assert_eq!(room.current_slot(), Some(Slot(2)));

        // Last in the roster leaves while holding the turn: wraps to front.
        room.leave(PeerId(2));
        assert_eq!(room.current_player(), 0);
        assert_eq!(room.current_slot(), Some(Slot(0)));
    }

    #[test]
    fn test_turn_pointer_stays_in_range_through_departures() {
        let mut room = room_with(7);
        for p in [6, 0, 3, 1, 5, 2] {
            room.pass_turn(room.current_slot().unwrap());
            room.reset_game();
            room.leave(PeerId(p));
            assert!(room.current_player() < room.player_count());
        }
        room.leave(PeerId(4));
        assert!(room.is_empty());
        assert_eq!(room.current_player(), 0);
        assert_eq!(room.current_slot(), None);
    }

    // -- placement --

    #[test]
    fn test_place_stone_updates_counters() {
        let mut room = room_with(2);
        room.pass_turn(Slot(0));
        assert_eq!(room.pass_count(), 1);

        assert!(room.place_stone(3, 3, Slot(1)));
        assert_eq!(room.board().get(3, 3), Some(Slot(1)));
        assert_eq!(room.move_count(), 2);
        assert_eq!(room.pass_count(), 0);
    }

    #[test]
    fn test_place_stone_rejected_after_game_over() {
        let mut room = room_with(2);
        room.pass_turn(Slot(0));
        room.pass_turn(Slot(1));
        assert!(room.is_game_over());

        assert!(!room.place_stone(9, 9, Slot(0)));
        assert_eq!(room.board().get(9, 9), None);
    }

    #[test]
    fn test_place_stone_out_of_bounds() {
        let mut room = room_with(2);
        assert!(!room.place_stone(BOARD_SIZE, 0, Slot(0)));
        assert_eq!(room.move_count(), 0);
    }

    // -- capture --

    #[test]
    fn test_capture_by_four_distinct_players() {
        let mut room = room_with(5);
        put(&mut room, 4, 5, 1);
        put(&mut room, 6, 5, 2);
        put(&mut room, 5, 4, 3);
        put(&mut room, 5, 6, 4);

        assert!(room.place_stone(5, 5, Slot(0)));
        assert_eq!(room.board().get(5, 5), None, "placed stone is removed");
        assert_eq!(room.move_count(), 1);
        assert_eq!(room.current_player(), 1);

        let scores = room.scores();
        assert_eq!(scores[0], 0.0);
        for captor in 1..=4 {
            assert_eq!(scores[captor], CAPTURE_REWARD);
        }
        assert_eq!(
            room.captures(),
            &[CaptureEvent {
                x: 5,
                y: 5,
                captured: Slot(0),
                captors: vec![Slot(1), Slot(2), Slot(3), Slot(4)],
            }]
        );
    }

    #[test]
    fn test_no_capture_with_repeated_neighbour() {
        let mut room = room_with(4);
        put(&mut room, 4, 5, 1);
        put(&mut room, 6, 5, 2);
        put(&mut room, 5, 4, 3);
        put(&mut room, 5, 6, 3);

        assert!(room.place_stone(5, 5, Slot(0)));
        assert_eq!(room.board().get(5, 5), Some(Slot(0)));
        assert!(room.captures().is_empty());
    }

    #[test]
    fn test_own_stones_count_toward_the_four() {
        let mut room = room_with(4);
        put(&mut room, 4, 5, 0);
        put(&mut room, 6, 5, 1);
        put(&mut room, 5, 4, 2);
        put(&mut room, 5, 6, 3);

        assert!(room.place_stone(5, 5, Slot(0)));
        assert_eq!(room.board().get(5, 5), None);
        assert_eq!(room.scores()[0], CAPTURE_REWARD);
    }

    #[test]
    fn test_edge_and_corner_cells_are_never_captured() {
        let mut room = room_with(5);
        // Corner: only two neighbours.
        put(&mut room, 0, 1, 1);
        put(&mut room, 1, 0, 2);
        assert!(room.place_stone(0, 0, Slot(0)));
        assert_eq!(room.board().get(0, 0), Some(Slot(0)));

        // Edge: three distinct neighbours is not enough.
        put(&mut room, 0, 8, 2);
        put(&mut room, 0, 10, 3);
        put(&mut room, 1, 9, 4);
        assert!(room.place_stone(0, 9, Slot(1)));
        assert_eq!(room.board().get(0, 9), Some(Slot(1)));
        assert!(room.captures().is_empty());
    }

    // -- passing and scoring --

    #[test]
    fn test_two_passes_end_game_once() {
        let mut room = room_with(3);
        assert!(room.place_stone(0, 0, Slot(0)));
        assert!(room.pass_turn(Slot(1)));
        assert!(!room.is_game_over());
        assert!(room.pass_turn(Slot(2)));
        assert!(room.is_game_over());

        let moves = room.move_count();
        assert!(!room.pass_turn(Slot(0)), "pass after game over is a no-op");
        assert_eq!(room.move_count(), moves);
        assert!(room.is_game_over());
    }

    #[test]
    fn test_placement_between_passes_resets_count() {
        let mut room = room_with(2);
        room.pass_turn(Slot(0));
        room.place_stone(2, 2, Slot(1));
        room.pass_turn(Slot(0));
        assert!(!room.is_game_over());
        room.pass_turn(Slot(1));
        assert!(room.is_game_over());
    }

    #[test]
    fn test_area_score_after_single_stone() {
        let mut room = room_with(3);
        room.place_stone(0, 0, Slot(0));
        room.pass_turn(Slot(1));
        room.pass_turn(Slot(2));

        assert_eq!(room.scores(), &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_area_score_overwrites_capture_bonus() {
        let mut room = room_with(5);
        put(&mut room, 4, 5, 1);
        put(&mut room, 6, 5, 2);
        put(&mut room, 5, 4, 3);
        put(&mut room, 5, 6, 4);
        put(&mut room, 10, 10, 1);
        room.place_stone(5, 5, Slot(0));
        assert_eq!(room.scores()[1], CAPTURE_REWARD);

        room.pass_turn(Slot(1));
        room.pass_turn(Slot(2));
        assert_eq!(room.scores(), &[0.0, 2.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
    }

    // -- reset / snapshot --

    #[test]
    fn test_reset_keeps_roster_and_ready_flags() {
        let mut room = room_with(2);
        room.set_ready(PeerId(1));
        room.place_stone(1, 1, Slot(0));
        room.pass_turn(Slot(1));
        room.pass_turn(Slot(0));

        room.reset_game();
        assert!(!room.is_game_over());
        assert_eq!(room.move_count(), 0);
        assert_eq!(room.pass_count(), 0);
        assert_eq!(room.current_player(), 0);
        assert_eq!(room.board(), &Board::new());
        assert!(room.scores().iter().all(|s| *s == 0.0));
        assert!(room.captures().is_empty());

        let players = room.players();
        assert_eq!(players.len(), 2);
        assert!(!players[0].ready);
        assert!(players[1].ready);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut room = room_with(2);
        room.place_stone(3, 7, Slot(0));

        let view = room.snapshot();
        assert_eq!(view.board.len(), BOARD_SIZE);
        assert_eq!(view.board[3][7], Some(Slot(0)));
        assert_eq!(view.current_player, Slot(1));
        assert_eq!(view.move_count, 1);
        assert_eq!(view.scores.len(), MAX_PLAYERS);
        assert_eq!(view.players.len(), 2);
        assert!(!view.game_over);
    }

    #[test]
    fn test_snapshot_reports_slot_not_index_after_departure() {
        let mut room = room_with(3);
        room.leave(PeerId(0));
        assert_eq!(room.current_player(), 0);
        assert_eq!(room.snapshot().current_player, Slot(1));
        assert!(room.holds_turn(Slot(1)));
        assert!(!room.holds_turn(Slot(0)));
    }
}
