//! Room and session bookkeeping.
//!
//! Two maps: `roomId -> Room` and `sessionId -> roomId`. The registry is
//! pure data; callers hold it behind the shared state mutex and the router
//! drives it one message at a time.

use std::collections::HashMap;

use crate::domain::{Participant, RegistryError, Room, RoomId, SessionId};

#[derive(Debug, Default)]
pub struct Registry {
    rooms: HashMap<RoomId, Room>,
    sessions: HashMap<SessionId, RoomId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new room with `participant` as host and bind its session.
    pub fn create_room(
        &mut self,
        room_id: RoomId,
        participant: Participant,
    ) -> Result<(), RegistryError> {
        if self.rooms.contains_key(&room_id) {
            return Err(RegistryError::RoomAlreadyExists);
        }
        self.sessions.insert(participant.session_id, room_id.clone());
        self.rooms.insert(room_id, Room::new(participant));
        Ok(())
    }

    /// Put `participant` into the guest slot of an existing room and bind
    /// its session. An already-occupied guest slot is overwritten without
    /// notice; the previous guest keeps its session binding but no longer
    /// receives relays.
    pub fn join_room(
        &mut self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<&Room, RegistryError> {
        if !self.rooms.contains_key(room_id) {
            return Err(RegistryError::RoomNotFound);
        }
        self.sessions.insert(participant.session_id, room_id.clone());
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or(RegistryError::RoomNotFound)?;
        room.guest = Some(participant);
        Ok(room)
    }

    /// Resolve the room a session is currently bound to.
    pub fn room_of(&self, session_id: SessionId) -> Option<&Room> {
        let room_id = self.sessions.get(&session_id)?;
        self.rooms.get(room_id)
    }

    /// Drop a session binding on disconnect.
    ///
    /// Room slots are deliberately left untouched: host/guest are never
    /// cleared on disconnect, and relays addressed to a dead slot fall
    /// into the fire-and-forget send path.
    pub fn remove_session(&mut self, session_id: SessionId) {
        if self.sessions.remove(&session_id).is_some() {
            tracing::debug!("session {} unbound from its room", session_id);
        }
    }

    pub fn is_bound(&self, session_id: SessionId) -> bool {
        self.sessions.contains_key(&session_id)
    }
}
