//! Session registry.
//!
//! Maps session identity to its handle so coordinator messages, which carry
//! only a [`SessionId`], can be answered. Transports register a handle when a
//! client connects and unregister it when the client goes away; many
//! transport tasks may do so concurrently.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use termplay_core::SessionId;

use crate::session::SessionHandle;

/// Thread-safe registry of connected sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// Session ID → handle
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl SessionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session.
    ///
    /// Returns `false` if a session with the same id is already registered;
    /// the existing handle is kept.
    pub fn register(&self, handle: SessionHandle) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if sessions.contains_key(handle.id()) {
            return false;
        }

        tracing::debug!(session_id = %handle.id(), "session registered");
        sessions.insert(handle.id().clone(), handle);
        true
    }

    /// Remove a session, returning its handle if it was registered.
    ///
    /// Does not close the handle; that is the transport's call.
    pub fn unregister(&self, session_id: &SessionId) -> Option<SessionHandle> {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id);
        if removed.is_some() {
            tracing::debug!(%session_id, "session unregistered");
        }
        removed
    }

    /// Handle for a session. `None` if not registered.
    pub fn get(&self, session_id: &SessionId) -> Option<SessionHandle> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).get(session_id).cloned()
    }

    /// Check if a session is registered.
    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).contains_key(session_id)
    }

    /// Number of registered sessions.
    pub fn count(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
