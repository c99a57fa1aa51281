//! Rolling context summary attached to a session.

use crate::domain::foundation::Timestamp;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Condensed description of the conversation so far.
///
/// Refreshed periodically (see the context depth optimizer's refresh
/// policy) instead of every turn, so summarization cost stays bounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    text: String,
    refreshed_at: Timestamp,
}

impl ContextSummary {
    /// Creates a summary stamped with the current time.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            refreshed_at: Timestamp::now(),
        }
    }

    /// Reconstitute a summary from persistence.
    pub fn reconstitute(text: String, refreshed_at: Timestamp) -> Self {
        Self { text, refreshed_at }
    }

    /// Returns the summary text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns when the summary was last refreshed.
    pub fn refreshed_at(&self) -> &Timestamp {
        &self.refreshed_at
    }

    /// Returns how far this summary lags behind a reference time.
    pub fn age_relative_to(&self, reference: &Timestamp) -> Duration {
        reference.duration_since(&self.refreshed_at)
    }
}
