//! WebSocket signaling relay server implementation.

mod handler;
pub mod registry;
pub mod router;
mod runner;
mod signal;
pub mod state;

pub use runner::{app, run_server};
