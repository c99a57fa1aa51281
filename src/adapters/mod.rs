//! Adapters - Implementations of port interfaces.
//!
//! - `counter` - shared rotation counter (Redis, in-memory)
//! - `credentials` - round-robin credential rotation
//! - `session` - session persistence (in-memory)

pub mod counter;
pub mod credentials;
pub mod session;

pub use counter::{InMemorySharedCounter, RedisSharedCounter};
pub use credentials::{CredentialRotator, CredentialStats, IssuedCredential, RotationError};
pub use session::InMemorySessionStore;
