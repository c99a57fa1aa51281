//! Relevance module - Scoring and filtering of search results.
//!
//! Third-party search results are noisy. Each candidate gets an additive
//! relevance score in `[0, 1]` against the query, then a per-search-type
//! policy (threshold + result cap) decides what reaches the user.

mod engine;
mod hit;
mod policy;

pub use engine::{RelevanceEngine, RelevanceVerdict};
pub use hit::{ScoredCandidate, SearchHit};
pub use policy::{SearchPolicy, SearchType};
