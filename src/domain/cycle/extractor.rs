//! Snapshot extraction hook for cycle rollover.

use super::state::CycleEntry;

/// Topic sets pulled out of a finished cycle's history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedTopics {
    /// Coarse product groups that came up (e.g. "laptops").
    pub groups: Vec<String>,
    /// Finer subdivisions within those groups (e.g. "gaming").
    pub subgroups: Vec<String>,
}

/// Extracts group/subgroup descriptors from a cycle's history at rollover.
///
/// What counts as a group or subgroup depends on the host's catalog
/// taxonomy, so extraction is a pluggable hook rather than a built-in
/// heuristic.
pub trait SnapshotExtractor: Send + Sync {
    /// Analyzes a finished cycle's history and names its topics.
    fn extract(&self, history: &[CycleEntry]) -> ExtractedTopics;
}

/// Default extractor that names no topics.
///
/// Rollover still captures the last request and shown products; only
/// the group/subgroup sets stay empty until a host supplies a real
/// extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSnapshotExtractor;

impl SnapshotExtractor for NoopSnapshotExtractor {
    fn extract(&self, _history: &[CycleEntry]) -> ExtractedTopics {
        ExtractedTopics::default()
    }
}
