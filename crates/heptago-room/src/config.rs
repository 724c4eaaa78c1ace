//! Game constants and registry configuration.

/// Width and height of the board.
pub const BOARD_SIZE: usize = 19;

/// Seats per room. Also the length of the score vector.
pub const MAX_PLAYERS: usize = 7;

/// Points awarded to each surrounding player when a stone is captured.
pub const CAPTURE_REWARD: f64 = 0.25;

/// Distinct neighbouring players needed to capture a stone.
pub const CAPTURE_SURROUND: usize = 4;

/// Consecutive passes that end the game.
pub const PASSES_TO_END: u32 = 2;

/// Characters room codes are drawn from.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A slot's display name and CSS color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub name: &'static str,
    pub color: &'static str,
}

impl PaletteEntry {
    const fn new(name: &'static str, color: &'static str) -> Self {
        Self { name, color }
    }
}

/// Name and color for each slot, in slot order.
pub const PALETTE: [PaletteEntry; MAX_PLAYERS] = [
    PaletteEntry::new("Red", "#FF0000"),
    PaletteEntry::new("Orange", "#FF7700"),
    PaletteEntry::new("Yellow", "#FFFF00"),
    PaletteEntry::new("Green", "#00FF00"),
    PaletteEntry::new("Cyan", "#00FFFF"),
    PaletteEntry::new("Blue", "#0000FF"),
    PaletteEntry::new("Violet", "#8A2BE2"),
];

/// Settings for the [`RoomRegistry`](crate::RoomRegistry).
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Length of generated room codes.
    pub room_code_length: usize,

    /// How many random draws `create_room` makes before concluding the
    /// code space is exhausted.
    pub max_code_attempts: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            room_code_length: 6,
            max_code_attempts: 1024,
        }
    }
}
