//! The 19×19 grid of stones.

use heptago_protocol::Slot;

use crate::{BOARD_SIZE, MAX_PLAYERS};

const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Cell ownership for one game. Storage only; rules live in
/// [`GameRoom`](crate::GameRoom).
///
/// Coordinates are `(x, y)` with `x` selecting the row, matching the
/// `board[x][y]` layout clients receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Vec<Option<Slot>>,
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: vec![None; BOARD_SIZE * BOARD_SIZE],
        }
    }

    fn index(x: usize, y: usize) -> Option<usize> {
        (x < BOARD_SIZE && y < BOARD_SIZE).then(|| x * BOARD_SIZE + y)
    }

    /// Returns the owner of `(x, y)`, or `None` if it is empty or off the
    /// board.
    pub fn get(&self, x: usize, y: usize) -> Option<Slot> {
        Self::index(x, y).and_then(|i| self.cells[i])
    }

    /// Puts a stone for `slot` on `(x, y)`.
    ///
    /// Returns `false` and leaves the board untouched if the cell is off
    /// the board, already taken, or `slot` is not a valid seat.
    pub fn place(&mut self, x: usize, y: usize, slot: Slot) -> bool {
        if slot.index() >= MAX_PLAYERS {
            return false;
        }
        match Self::index(x, y) {
            Some(i) if self.cells[i].is_none() => {
                self.cells[i] = Some(slot);
                true
            }
            _ => false,
        }
    }

    /// Empties `(x, y)`.
    pub fn clear(&mut self, x: usize, y: usize) {
        if let Some(i) = Self::index(x, y) {
            self.cells[i] = None;
        }
    }

    /// The in-bounds orthogonal neighbours of `(x, y)`: four in the
    /// interior, three on an edge, two in a corner.
    pub fn neighbors4(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
        DIRECTIONS.into_iter().filter_map(move |(dx, dy)| {
            let nx = x.checked_add_signed(dx)?;
            let ny = y.checked_add_signed(dy)?;
            Self::index(nx, ny).map(|_| (nx, ny))
        })
    }

    /// Row-major copy of the grid, `rows()[x][y]`.
    pub fn rows(&self) -> Vec<Vec<Option<Slot>>> {
        self.cells.chunks(BOARD_SIZE).map(<[_]>::to_vec).collect()
    }

    /// Number of stones each slot has on the board.
    pub fn occupied_counts(&self) -> [u32; MAX_PLAYERS] {
        let mut counts = [0; MAX_PLAYERS];
        for slot in self.cells.iter().flatten() {
            if let Some(count) = counts.get_mut(slot.index()) {
                *count += 1;
            }
        }
        counts
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
