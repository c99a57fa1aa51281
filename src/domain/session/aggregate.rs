//! Session aggregate entity.
//!
//! A session is the unit of conversation state for one shopper. It embeds
//! the cycle window managed by the cycle module and a rolling context
//! summary, and carries the locale used for AI and search calls.
//!
//! # Concurrency
//!
//! Sessions are read at the start of a turn and written back at the end.
//! The `version` counter supports optimistic concurrency: stores reject a
//! write whose version does not match the stored one, so concurrent turns
//! against the same session cannot silently overwrite each other.

use crate::domain::cycle::CycleState;
use crate::domain::foundation::{SessionId, Timestamp};
use serde::{Deserialize, Serialize};

use super::locale::Locale;
use super::summary::ContextSummary;

/// Session aggregate - conversation state for one shopper.
///
/// # Invariants
///
/// - `id` is globally unique
/// - `version` starts at 1 and only increases
/// - `updated_at` never precedes `created_at`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for this session.
    id: SessionId,

    /// Language and region of the shopper.
    locale: Locale,

    /// Product category currently under discussion, once detected.
    current_category: Option<String>,

    /// The bounded conversation window.
    cycle: CycleState,

    /// Rolling summary of the conversation, refreshed periodically.
    context_summary: Option<ContextSummary>,

    /// Optimistic concurrency version.
    version: u64,

    /// When the session was created.
    created_at: Timestamp,

    /// When the session was last updated.
    updated_at: Timestamp,
}

impl Session {
    /// Creates a new session around a freshly initialized cycle state.
    pub fn new(id: SessionId, locale: Locale, cycle: CycleState) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            locale,
            current_category: None,
            cycle,
            context_summary: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitute a session from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        locale: Locale,
        current_category: Option<String>,
        cycle: CycleState,
        context_summary: Option<ContextSummary>,
        version: u64,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            locale,
            current_category,
            cycle,
            context_summary,
            version,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the shopper's locale.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Returns the category currently under discussion.
    pub fn current_category(&self) -> Option<&str> {
        self.current_category.as_deref()
    }

    /// Returns the cycle window.
    pub fn cycle(&self) -> &CycleState {
        &self.cycle
    }

    /// Returns the rolling context summary, if one has been produced.
    pub fn context_summary(&self) -> Option<&ContextSummary> {
        self.context_summary.as_ref()
    }

    /// Returns the optimistic concurrency version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns when the session was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns when the session was last updated.
    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Mutable access to the cycle window for the cycle manager.
    ///
    /// Any access through here counts as an update to the session.
    pub fn cycle_mut(&mut self) -> &mut CycleState {
        self.updated_at = Timestamp::now();
        &mut self.cycle
    }

    /// Records the category the conversation has moved to.
    pub fn set_category(&mut self, category: impl Into<String>) {
        self.current_category = Some(category.into());
        self.updated_at = Timestamp::now();
    }

    /// Replaces the rolling summary with freshly produced text.
    pub fn refresh_summary(&mut self, text: impl Into<String>) {
        self.context_summary = Some(ContextSummary::new(text));
        self.updated_at = Timestamp::now();
    }

    /// Bumps the concurrency version after a successful store write.
    pub(crate) fn advance_version(&mut self) {
        self.version += 1;
    }
}
