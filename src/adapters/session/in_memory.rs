//! In-memory session store for tests and single-node hosts.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

use crate::domain::foundation::SessionId;
use crate::domain::session::Session;
use crate::ports::{SessionStore, SessionStoreError};

/// Mutexed map of sessions enforcing the version compare-and-swap.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a session directly, bypassing the version check.
    ///
    /// For seeding test and demo state only.
    pub fn seed(&self, session: Session) {
        self.sessions
            .lock()
            .unwrap()
            .insert(*session.id(), session);
    }

    /// Returns the number of stored sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Returns true if no sessions are stored.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.sessions.lock().unwrap().get(id).cloned())
    }

    async fn save(&self, session: &mut Session) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(stored) = sessions.get(session.id()) {
            if stored.version() != session.version() {
                warn!(
                    session_id = %session.id(),
                    stored = stored.version(),
                    attempted = session.version(),
                    "rejecting stale session write"
                );
                return Err(SessionStoreError::VersionConflict {
                    stored: stored.version(),
                    attempted: session.version(),
                });
            }
        }
        session.advance_version();
        sessions.insert(*session.id(), session.clone());
        Ok(())
    }
}
