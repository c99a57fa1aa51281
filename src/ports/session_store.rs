//! Session persistence port with optimistic concurrency.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::SessionId;
use crate::domain::session::Session;

/// Errors from the session store.
#[derive(Debug, Clone, Error)]
pub enum SessionStoreError {
    /// The write carried a stale version; someone else saved first.
    #[error("Version conflict: store has {stored}, write carried {attempted}")]
    VersionConflict { stored: u64, attempted: u64 },

    /// The store could not be reached.
    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// Port for loading and saving sessions.
///
/// `save` enforces a compare-and-swap on the session's version: the write
/// is accepted only if the stored version still equals the version the
/// caller read, and the version is bumped on success (both in the store
/// and on the caller's copy). Two concurrent turns against the same
/// session therefore cannot silently overwrite each other - the loser
/// gets a `VersionConflict` instead.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads a session, or `None` if it does not exist.
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError>;

    /// Saves a session, rejecting stale writes.
    ///
    /// On success the session's version is advanced in place.
    async fn save(&self, session: &mut Session) -> Result<(), SessionStoreError>;
}
