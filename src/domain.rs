//! Domain model for the signaling relay.
//!
//! A `Room` holds exactly one host and at most one guest. Every connection
//! gets an opaque `SessionId` at accept time; the registry resolves a
//! session back to its room for relaying.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Sendable handle to one connection's outbound queue.
///
/// The core never touches the socket itself; it pushes serialized frames
/// into this channel and the connection's send task drains it. Sends are
/// fire-and-forget.
pub type ClientSender = mpsc::UnboundedSender<String>;

/// Opaque per-connection session identifier, assigned at connect time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Caller-supplied room identifier. Any string is accepted; uniqueness is
/// only enforced among currently-open rooms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One party of a room: display name plus the session and channel of the
/// connection that claimed the slot.
#[derive(Debug, Clone)]
pub struct Participant {
    pub name: String,
    pub session_id: SessionId,
    pub sender: ClientSender,
}

impl Participant {
    pub fn new(name: impl Into<String>, session_id: SessionId, sender: ClientSender) -> Self {
        Self {
            name: name.into(),
            session_id,
            sender,
        }
    }
}

/// A two-party session. The host slot is filled at creation and never
/// cleared, so "a room with a guest has a host" holds by construction.
#[derive(Debug)]
pub struct Room {
    pub host: Participant,
    pub guest: Option<Participant>,
}

impl Room {
    pub fn new(host: Participant) -> Self {
        Self { host, guest: None }
    }

    /// Resolve "the other participant" for a given sender.
    ///
    /// Returns the guest when the session is the host's, the host when it
    /// is the guest's, and `None` when it matches neither slot (stale
    /// session after a slot changed hands).
    pub fn counterpart(&self, session_id: SessionId) -> Option<&Participant> {
        if self.host.session_id == session_id {
            return self.guest.as_ref();
        }
        match &self.guest {
            Some(guest) if guest.session_id == session_id => Some(&self.host),
            _ => None,
        }
    }
}

/// Failures of room/session bookkeeping.
///
/// The display strings double as the wire-level `error` payload, so they
/// are part of the protocol.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("room with specified id is already created")]
    RoomAlreadyExists,
    #[error("room with specified id is not present")]
    RoomNotFound,
    #[error("session is not bound to any room")]
    SessionNotBound,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(name: &str) -> (Participant, SessionId) {
        let (tx, _rx) = mpsc::unbounded_channel();
        let session_id = SessionId::generate();
        (Participant::new(name, session_id, tx), session_id)
    }

    #[test]
    fn test_session_ids_are_unique() {
        // given / when:
        let a = SessionId::generate();
        let b = SessionId::generate();

        // then:
        assert_ne!(a, b);
    }

    #[test]
    fn test_counterpart_of_host_is_guest() {
        // given:
        let (host, host_session) = participant("alice");
        let (guest, _) = participant("bob");
        let mut room = Room::new(host);
        room.guest = Some(guest);

        // when:
        let other = room.counterpart(host_session);

        // then:
        assert_eq!(other.map(|p| p.name.as_str()), Some("bob"));
    }

    #[test]
    fn test_counterpart_of_guest_is_host() {
        // given:
        let (host, _) = participant("alice");
        let (guest, guest_session) = participant("bob");
        let mut room = Room::new(host);
        room.guest = Some(guest);

        // when:
        let other = room.counterpart(guest_session);

        // then:
        assert_eq!(other.map(|p| p.name.as_str()), Some("alice"));
    }

    #[test]
    fn test_counterpart_of_unknown_session_is_none() {
        // given:
        let (host, _) = participant("alice");
        let (guest, _) = participant("bob");
        let mut room = Room::new(host);
        room.guest = Some(guest);

        // when:
        let other = room.counterpart(SessionId::generate());

        // then:
        assert!(other.is_none());
    }

    #[test]
    fn test_counterpart_without_guest_is_none() {
        // given:
        let (host, host_session) = participant("alice");
        let room = Room::new(host);

        // when / then:
        assert!(room.counterpart(host_session).is_none());
    }
}
