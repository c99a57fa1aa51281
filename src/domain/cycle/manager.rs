//! Cycle lifecycle policy: initialization, bounded advancement, rollover,
//! and the bounded state-context render.
//!
//! The manager owns the window bound. `CycleState` itself never refuses a
//! mutation; every transition that could violate the `[1, max_iterations]`
//! invariant goes through here.

use std::sync::Arc;

use crate::domain::foundation::ValidationError;

use super::extractor::{NoopSnapshotExtractor, SnapshotExtractor};
use super::prompt::PromptVersion;
use super::state::{CycleSnapshot, CycleState, ProductRef};

/// Default number of turns served per cycle before rollover.
pub const DEFAULT_MAX_ITERATIONS: u32 = 6;

/// Drives cycle state transitions for all sessions.
///
/// One manager is built at startup from configuration and shared; all
/// per-session data lives in the `CycleState` values it operates on.
#[derive(Clone)]
pub struct CycleManager {
    max_iterations: u32,
    prompt: PromptVersion,
    extractor: Arc<dyn SnapshotExtractor>,
}

impl CycleManager {
    // ─────────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a manager with the default window bound and no-op extraction.
    pub fn new(prompt: PromptVersion) -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            prompt,
            extractor: Arc::new(NoopSnapshotExtractor),
        }
    }

    /// Overrides the window bound.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if `max_iterations` is zero
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Result<Self, ValidationError> {
        if max_iterations == 0 {
            return Err(ValidationError::out_of_range(
                "max_iterations",
                1,
                i32::MAX,
                0,
            ));
        }
        self.max_iterations = max_iterations;
        Ok(self)
    }

    /// Installs a host-specific topic extractor for rollover snapshots.
    pub fn with_extractor(mut self, extractor: Arc<dyn SnapshotExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Returns the configured window bound.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Returns the prompt version stamped into new cycle states.
    pub fn prompt(&self) -> &PromptVersion {
        &self.prompt
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates the cycle state for a brand-new session.
    ///
    /// Starts at cycle 1, iteration 1, with the current prompt markers
    /// stamped in.
    pub fn initialize(&self) -> CycleState {
        CycleState::initial(
            self.prompt.id().to_string(),
            self.prompt.hash().to_string(),
        )
    }

    /// Advances the turn counter if the window has room.
    ///
    /// The check runs before any mutation: at the bound this returns
    /// `false` and leaves the state untouched, so the final turn of a
    /// cycle is fully served before the caller rolls over. Calling it
    /// repeatedly at the bound is harmless.
    pub fn increment_iteration(&self, state: &mut CycleState) -> bool {
        if state.iteration() >= self.max_iterations {
            return false;
        }
        state.advance();
        true
    }

    /// Finishes the current cycle and opens the next one.
    ///
    /// Captures a snapshot of the ending cycle (topics via the extractor
    /// hook, plus the caller-supplied last request and shown products),
    /// bumps `cycle_id`, resets `iteration` to 1, and clears the history.
    /// The confirmed shortlist is deliberately preserved.
    pub fn start_new_cycle(
        &self,
        state: &mut CycleState,
        last_request: impl Into<String>,
        products: Vec<ProductRef>,
    ) {
        let topics = self.extractor.extract(state.history());
        let snapshot = CycleSnapshot {
            groups: topics.groups,
            subgroups: topics.subgroups,
            products,
            last_request: last_request.into(),
        };
        state.roll_over(snapshot);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    /// Renders the bounded state block sent alongside an AI request.
    ///
    /// Regardless of how long `cycle_history` has grown, at most
    /// `max_iterations` entries are rendered; older entries are collapsed
    /// into an omission note. This bounding keeps per-turn token cost
    /// constant.
    pub fn render_state_context(
        &self,
        state: &CycleState,
        current_category: Option<&str>,
    ) -> String {
        let mut lines: Vec<String> = Vec::new();
        lines.push(format!(
            "Cycle {}, iteration {} of {}.",
            state.cycle_id(),
            state.iteration(),
            self.max_iterations
        ));

        if let Some(category) = current_category {
            lines.push(format!("Current category: {}", category));
        }

        let history = state.history();
        if history.is_empty() {
            lines.push("No messages in this cycle yet.".to_string());
        } else {
            lines.push("Recent conversation:".to_string());
            let window = self.max_iterations as usize;
            if history.len() > window {
                lines.push(format!(
                    "[{} earlier messages omitted]",
                    history.len() - window
                ));
            }
            let start = history.len().saturating_sub(window);
            for entry in &history[start..] {
                lines.push(format!("{}: {}", entry.role, entry.content));
            }
        }

        if let Some(snapshot) = state.last_cycle_context() {
            lines.push(format!("Previous cycle: {}", snapshot.summary()));
        }

        if !state.last_defined().is_empty() {
            lines.push(format!(
                "Confirmed products: {}",
                state.last_defined().join(", ")
            ));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycle::extractor::ExtractedTopics;
    use crate::domain::cycle::state::{ChatRole, CycleEntry};

    fn manager() -> CycleManager {
        CycleManager::new(PromptVersion::fingerprint("v1", "assistant instructions"))
    }

    mod construction {
        use super::*;

        #[test]
        fn defaults_to_six_iterations() {
            assert_eq!(manager().max_iterations(), DEFAULT_MAX_ITERATIONS);
            assert_eq!(DEFAULT_MAX_ITERATIONS, 6);
        }

        #[test]
        fn rejects_zero_max_iterations() {
            let result = manager().with_max_iterations(0);
            assert!(result.is_err());
        }

        #[test]
        fn accepts_custom_max_iterations() {
            let custom = manager().with_max_iterations(4).unwrap();
            assert_eq!(custom.max_iterations(), 4);
        }

        #[test]
        fn initialize_stamps_prompt_markers() {
            let prompt = PromptVersion::fingerprint("v7", "newer instructions");
            let manager = CycleManager::new(prompt.clone());
            let state = manager.initialize();

            assert_eq!(state.prompt_id(), "v7");
            assert_eq!(state.prompt_hash(), prompt.hash());
        }
    }

    mod iteration {
        use super::*;

        #[test]
        fn increments_until_the_bound() {
            let manager = manager();
            let mut state = manager.initialize();

            for expected in 2..=DEFAULT_MAX_ITERATIONS {
                assert!(manager.increment_iteration(&mut state));
                assert_eq!(state.iteration(), expected);
            }
        }

        #[test]
        fn refuses_to_pass_the_bound_without_mutating() {
            let manager = manager();
            let mut state = manager.initialize();
            while manager.increment_iteration(&mut state) {}

            let before = state.clone();
            assert!(!manager.increment_iteration(&mut state));
            assert_eq!(state, before);
            assert_eq!(state.iteration(), DEFAULT_MAX_ITERATIONS);
        }

        #[test]
        fn refusal_is_idempotent() {
            let manager = manager();
            let mut state = manager.initialize();
            while manager.increment_iteration(&mut state) {}

            for _ in 0..10 {
                assert!(!manager.increment_iteration(&mut state));
            }
            assert_eq!(state.iteration(), DEFAULT_MAX_ITERATIONS);
        }
    }

    mod rollover {
        use super::*;

        struct FixedTopics;

        impl SnapshotExtractor for FixedTopics {
            fn extract(&self, _history: &[CycleEntry]) -> ExtractedTopics {
                ExtractedTopics {
                    groups: vec!["phones".to_string()],
                    subgroups: vec!["flagship".to_string()],
                }
            }
        }

        #[test]
        fn advances_cycle_and_resets_window() {
            let manager = manager();
            let mut state = manager.initialize();
            state.record(ChatRole::User, "show me phones");
            state.record(ChatRole::Assistant, "here are a few");
            while manager.increment_iteration(&mut state) {}

            manager.start_new_cycle(
                &mut state,
                "flagship phones",
                vec![ProductRef::new("iPhone 15", Some(799.0))],
            );

            assert_eq!(state.cycle_id(), 2);
            assert_eq!(state.iteration(), 1);
            assert!(state.history().is_empty());

            let snapshot = state.last_cycle_context().unwrap();
            assert_eq!(snapshot.last_request, "flagship phones");
            assert_eq!(snapshot.products.len(), 1);
        }

        #[test]
        fn preserves_confirmed_shortlist() {
            let manager = manager();
            let mut state = manager.initialize();
            state.confirm_product("iPhone 15");
            state.confirm_product("Galaxy S24");

            manager.start_new_cycle(&mut state, "anything", Vec::new());

            assert_eq!(state.last_defined(), &["iPhone 15", "Galaxy S24"]);
        }

        #[test]
        fn uses_the_installed_extractor() {
            let manager = manager().with_extractor(Arc::new(FixedTopics));
            let mut state = manager.initialize();
            state.record(ChatRole::User, "any good flagship phones?");

            manager.start_new_cycle(&mut state, "flagships", Vec::new());

            let snapshot = state.last_cycle_context().unwrap();
            assert_eq!(snapshot.groups, vec!["phones"]);
            assert_eq!(snapshot.subgroups, vec!["flagship"]);
        }

        #[test]
        fn default_extractor_leaves_topics_empty() {
            let manager = manager();
            let mut state = manager.initialize();
            state.record(ChatRole::User, "any good flagship phones?");

            manager.start_new_cycle(&mut state, "flagships", Vec::new());

            let snapshot = state.last_cycle_context().unwrap();
            assert!(snapshot.groups.is_empty());
            assert!(snapshot.subgroups.is_empty());
        }
    }

    mod rendering {
        use super::*;

        #[test]
        fn includes_counters_category_and_shortlist() {
            let manager = manager();
            let mut state = manager.initialize();
            state.record(ChatRole::User, "I want a phone");
            state.confirm_product("Pixel 9");

            let rendered = manager.render_state_context(&state, Some("smartphones"));

            assert!(rendered.contains("Cycle 1, iteration 1 of 6."));
            assert!(rendered.contains("Current category: smartphones"));
            assert!(rendered.contains("user: I want a phone"));
            assert!(rendered.contains("Confirmed products: Pixel 9"));
        }

        #[test]
        fn caps_history_at_the_window_bound() {
            let manager = manager();
            let mut state = manager.initialize();
            for i in 0..20 {
                state.record(ChatRole::User, format!("message {}", i));
            }

            let rendered = manager.render_state_context(&state, None);

            let shown = rendered.matches("user: message").count();
            assert_eq!(shown, DEFAULT_MAX_ITERATIONS as usize);
            assert!(rendered.contains("[14 earlier messages omitted]"));
            assert!(rendered.contains("message 19"));
            assert!(!rendered.contains("message 13\n"));
        }

        #[test]
        fn omits_the_note_when_history_fits() {
            let manager = manager();
            let mut state = manager.initialize();
            state.record(ChatRole::User, "just one message");

            let rendered = manager.render_state_context(&state, None);
            assert!(!rendered.contains("omitted"));
        }

        #[test]
        fn mentions_previous_cycle_after_rollover() {
            let manager = manager();
            let mut state = manager.initialize();
            state.record(ChatRole::User, "laptops please");
            manager.start_new_cycle(&mut state, "laptops", Vec::new());

            let rendered = manager.render_state_context(&state, None);
            assert!(rendered.contains("Previous cycle: last request \"laptops\""));
            assert!(rendered.contains("No messages in this cycle yet."));
        }
    }

    mod invariants {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Any interleaving of records, increments, and rollovers keeps
            /// the iteration counter inside the window.
            #[test]
            fn iteration_never_leaves_bounds(ops in proptest::collection::vec(0u8..3, 0..60)) {
                let manager = manager();
                let mut state = manager.initialize();

                for op in ops {
                    match op {
                        0 => state.record(ChatRole::User, "message"),
                        1 => {
                            manager.increment_iteration(&mut state);
                        }
                        _ => manager.start_new_cycle(&mut state, "request", Vec::new()),
                    }
                    prop_assert!(state.iteration() >= 1);
                    prop_assert!(state.iteration() <= manager.max_iterations());
                }
            }

            /// Rollover strictly increases the cycle id no matter what
            /// happened before it.
            #[test]
            fn rollover_monotonically_increases_cycle_id(rollovers in 1usize..20) {
                let manager = manager();
                let mut state = manager.initialize();
                let mut previous = state.cycle_id();

                for _ in 0..rollovers {
                    manager.start_new_cycle(&mut state, "request", Vec::new());
                    prop_assert!(state.cycle_id() > previous);
                    previous = state.cycle_id();
                }
            }

            /// The render never exposes more history entries than the bound.
            #[test]
            fn render_never_exceeds_window(messages in 0usize..40) {
                let manager = manager();
                let mut state = manager.initialize();
                for i in 0..messages {
                    state.record(ChatRole::User, format!("msg {}", i));
                }

                let rendered = manager.render_state_context(&state, None);
                let shown = rendered.matches("user: msg").count();
                prop_assert!(shown <= manager.max_iterations() as usize);
            }
        }
    }
}
