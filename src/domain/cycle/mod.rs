//! Cycle module - Bounded conversation windows with rollover.
//!
//! Conversations are tracked in cycles of at most `max_iterations` turns.
//! When a cycle is exhausted it rolls over: a single snapshot of the
//! ending cycle is kept and the window restarts. Rendering is bounded to
//! the window size so per-turn token cost never grows with session age.

mod extractor;
mod manager;
mod prompt;
mod state;

pub use extractor::{ExtractedTopics, NoopSnapshotExtractor, SnapshotExtractor};
pub use manager::{CycleManager, DEFAULT_MAX_ITERATIONS};
pub use prompt::PromptVersion;
pub use state::{ChatRole, CycleEntry, CycleSnapshot, CycleState, ProductRef};
