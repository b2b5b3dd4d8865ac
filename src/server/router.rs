//! Message routing.
//!
//! One inbound message in, zero/one/two outbound messages pushed to
//! specific connections. The router keeps no state of its own; it operates
//! on the registry handed to it and on the sender channels stored in the
//! room slots.

use crate::{
    domain::{ClientSender, Participant, RegistryError, RoomId, SessionId},
    protocol::{ClientMessage, RtcSignal, ServerMessage},
};

use super::registry::Registry;

/// What the connection loop should do after a message was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    Continue,
    /// Protocol violation; the caller must close the connection.
    Close,
}

/// Handle one inbound message from the connection identified by
/// `session_id`. `sender` is that connection's own outbound channel, used
/// for echoes, confirmations and error replies.
pub fn handle_message(
    registry: &mut Registry,
    session_id: SessionId,
    sender: &ClientSender,
    message: ClientMessage,
) -> HandleOutcome {
    match message {
        ClientMessage::Heartbeat => {
            send(sender, &ServerMessage::Heartbeat);
            HandleOutcome::Continue
        }
        ClientMessage::CreateRoom { room_id, name } => {
            handle_create_room(registry, session_id, sender, room_id, name);
            HandleOutcome::Continue
        }
        ClientMessage::JoinRoom { room_id, name } => {
            handle_join_room(registry, session_id, sender, room_id, name);
            HandleOutcome::Continue
        }
        ClientMessage::Rtc(signal) => handle_rtc(registry, session_id, signal),
    }
}

fn handle_create_room(
    registry: &mut Registry,
    session_id: SessionId,
    sender: &ClientSender,
    room_id: String,
    name: String,
) {
    if name.is_empty() {
        send_error(sender, "name must not be empty");
        return;
    }

    let room_id = RoomId::new(room_id);
    let participant = Participant::new(name.clone(), session_id, sender.clone());
    match registry.create_room(room_id.clone(), participant) {
        Ok(()) => {
            tracing::info!("room '{}' created by session {}", room_id, session_id);
            send(
                sender,
                &ServerMessage::RoomInfo {
                    name,
                    room_id,
                    session_id,
                    is_host: Some(true),
                },
            );
        }
        Err(e) => {
            tracing::info!("create_room '{}' rejected: {}", room_id, e);
            send_error(sender, &e.to_string());
        }
    }
}

fn handle_join_room(
    registry: &mut Registry,
    session_id: SessionId,
    sender: &ClientSender,
    room_id: String,
    name: String,
) {
    if name.is_empty() {
        send_error(sender, "name must not be empty");
        return;
    }

    let room_id = RoomId::new(room_id);
    let participant = Participant::new(name.clone(), session_id, sender.clone());
    match registry.join_room(&room_id, participant) {
        Ok(room) => {
            tracing::info!("session {} joined room '{}'", session_id, room_id);
            send(
                sender,
                &ServerMessage::RoomInfo {
                    name,
                    room_id,
                    session_id,
                    is_host: None,
                },
            );
            // Synchronization point: exactly one both_joined per side tells
            // the host to start the handshake.
            send(&room.host.sender, &ServerMessage::BothJoined);
            send(sender, &ServerMessage::BothJoined);
        }
        Err(e) => {
            tracing::info!("join_room '{}' rejected: {}", room_id, e);
            send_error(sender, &e.to_string());
        }
    }
}

fn handle_rtc(registry: &mut Registry, session_id: SessionId, signal: RtcSignal) -> HandleOutcome {
    let Some(room) = registry.room_of(session_id) else {
        // Unreachable for well-behaved clients; fail closed without a reply.
        tracing::warn!(
            "rtc_message from session {} with no room: {}",
            session_id,
            RegistryError::SessionNotBound
        );
        return HandleOutcome::Close;
    };

    let target = match &signal {
        RtcSignal::Offer(_) => room.guest.as_ref(),
        RtcSignal::Answer(_) => Some(&room.host),
        RtcSignal::Ice(_) => room.counterpart(session_id),
    };

    match target {
        Some(participant) => {
            tracing::debug!(
                "relaying rtc_message from session {} to session {}",
                session_id,
                participant.session_id
            );
            send(&participant.sender, &ServerMessage::RtcMessage(signal));
        }
        None => {
            tracing::debug!(
                "rtc_message from session {} has no deliverable peer, dropping",
                session_id
            );
        }
    }
    HandleOutcome::Continue
}

/// Best-effort delivery: serialize and push onto the target's outbound
/// queue. A closed channel means the peer is gone; the frame is dropped.
fn send(target: &ClientSender, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(json) => {
            if target.send(json).is_err() {
                tracing::warn!("client channel closed, dropping outbound message");
            }
        }
        Err(e) => {
            tracing::error!("failed to serialize outbound message: {}", e);
        }
    }
}

fn send_error(target: &ClientSender, message: &str) {
    send(
        target,
        &ServerMessage::Error {
            message: message.to_string(),
        },
    );
}
