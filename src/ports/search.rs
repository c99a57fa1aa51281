//! Search provider port.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use crate::domain::relevance::SearchHit;

/// Errors from the search provider.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// The provider could not be reached or returned a server error.
    #[error("Search provider unavailable: {0}")]
    Unavailable(String),

    /// The provider rejected the call for quota reasons.
    #[error("Search provider rate limited")]
    RateLimited,
}

/// Port for live product search.
///
/// The credential is passed per call so the rotator governs which pool
/// key each outbound request uses.
#[async_trait]
pub trait ProductSearchClient: Send + Sync {
    /// Runs one product search and returns the raw candidate records.
    async fn search(
        &self,
        phrase: &str,
        credential: &SecretString,
    ) -> Result<Vec<SearchHit>, SearchError>;
}
