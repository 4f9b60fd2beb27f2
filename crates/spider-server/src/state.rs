//! Shared application state for the HTTP API.

use spider_core::Session;
use tokio::sync::RwLock;

/// Shared state accessible from all Axum handlers via
/// `State<Arc<AppState>>`.
#[derive(Debug)]
pub struct AppState {
    /// The one map session this server drives.
    pub session: RwLock<Session>,
}

impl AppState {
    /// Wrap a loaded session.
    pub fn new(session: Session) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }
}
