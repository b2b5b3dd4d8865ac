//! Shared server state.

use tokio::sync::Mutex;

use super::registry::Registry;

/// Application state shared by every connection.
///
/// One global mutex over both registries: relay operations are short and
/// never block on I/O, so finer-grained locking is not justified here.
pub struct AppState {
    pub registry: Mutex<Registry>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
