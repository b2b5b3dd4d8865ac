//! Two-party WebRTC signaling relay library.
//!
//! Brokers peer-to-peer connection setup between exactly two participants:
//! a host creates a room, a guest joins it, and the relay forwards their
//! session descriptions and ICE candidates verbatim. No media or data
//! flows through this server.

pub mod domain;
pub mod protocol;
pub mod server;

// shared library
pub mod common;
