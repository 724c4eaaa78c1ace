//! Room registry: creates rooms under fresh codes, finds them, and drops
//! them once empty.

use std::collections::HashMap;
use std::sync::Arc;

use heptago_protocol::RoomCode;
use rand::Rng;
use tokio::sync::Mutex;

use crate::{Room, RoomConfig, RoomError, SharedRoom, ROOM_CODE_ALPHABET};

/// Every live room, keyed by code.
///
/// The registry only does structural work (insert, lookup, delete). It is
/// guarded by its own lock, separate from each room's lock, and callers
/// must take it *before* any room lock or not at all.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, SharedRoom>,
    config: RoomConfig,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
        }
    }

    /// Creates an empty room under a code no live room is using.
    ///
    /// # Errors
    /// [`RoomError::CodeSpaceExhausted`] if `max_code_attempts` random
    /// draws all collided.
    pub fn create_room(&mut self) -> Result<(RoomCode, SharedRoom), RoomError> {
        let mut rng = rand::rng();
        let attempts = self.config.max_code_attempts;
        let code = (0..attempts)
            .map(|_| random_code(&mut rng, self.config.room_code_length))
            .find(|code| !self.rooms.contains_key(code))
            .ok_or(RoomError::CodeSpaceExhausted { attempts })?;

        let room = Arc::new(Mutex::new(Room::new(code.clone())));
        self.rooms.insert(code.clone(), Arc::clone(&room));
        tracing::info!(room = %code, rooms = self.rooms.len(), "room created");
        Ok((code, room))
    }

    /// Looks a room up by a client-supplied code. Surrounding whitespace
    /// and letter case are ignored.
    pub fn get(&self, raw: &str) -> Option<SharedRoom> {
        let code = RoomCode::normalize(raw)?;
        self.rooms.get(&code).cloned()
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.get(raw).is_some()
    }

    /// Deletes `room` from the registry. Returns whether it was deleted.
    ///
    /// The caller must have closed the room with
    /// [`Room::close_if_empty`](crate::Room::close_if_empty). The registry
    /// never waits on a room lock. Nothing happens if `code` now names a
    /// different room.
    pub fn remove_closed(&mut self, code: &RoomCode, room: &SharedRoom) -> bool {
        match self.rooms.get(code) {
            Some(current) if Arc::ptr_eq(current, room) => {}
            _ => return false,
        }
        if let Ok(guard) = room.try_lock() {
            if !guard.is_closed() {
                tracing::warn!(room = %code, "refusing to remove an open room");
                return false;
            }
        }
        self.rooms.remove(code);
        tracing::info!(room = %code, rooms = self.rooms.len(), "room destroyed");
        true
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists all live room codes.
    pub fn codes(&self) -> Vec<RoomCode> {
        self.rooms.keys().cloned().collect()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

/// Draws `len` characters uniformly from [`ROOM_CODE_ALPHABET`].
fn random_code(rng: &mut impl Rng, len: usize) -> RoomCode {
    let code = (0..len)
        .map(|_| char::from(ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())]))
        .collect();
    RoomCode::new_unchecked(code)
}
