//! Credential rotation adapters.

mod rotator;

pub use rotator::{CredentialRotator, CredentialStats, IssuedCredential, RotationError};
