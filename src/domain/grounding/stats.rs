//! Process-wide grounding statistics.
//!
//! Injected rather than global: build one aggregator at startup, share it
//! via `Arc`, and give tests their own isolated instances.

use std::collections::HashMap;
use std::sync::RwLock;

use super::decision::{GroundingDecision, GroundingReason};

/// Point-in-time view of the aggregator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroundingStatsSnapshot {
    /// Decisions recorded since startup.
    pub total_decisions: u64,
    /// Decisions that grounded.
    pub grounding_enabled: u64,
    /// Decisions that skipped grounding.
    pub grounding_disabled: u64,
    /// Hit count per cascade branch.
    pub reason_counts: HashMap<GroundingReason, u64>,
    /// Running mean of decision confidence.
    pub average_confidence: f64,
}

#[derive(Debug, Default)]
struct Inner {
    total_decisions: u64,
    grounding_enabled: u64,
    grounding_disabled: u64,
    reason_counts: HashMap<GroundingReason, u64>,
    average_confidence: f64,
}

/// Lock-protected aggregate over all grounding decisions in the process.
///
/// The average is maintained incrementally as `(avg*(n-1) + c) / n`, never
/// recomputed from the history, so recording stays O(1) per decision.
#[derive(Debug, Default)]
pub struct GroundingStats {
    inner: RwLock<Inner>,
}

impl GroundingStats {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one decision into the aggregate.
    pub fn record(&self, decision: &GroundingDecision) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.total_decisions += 1;
        if decision.should_ground {
            inner.grounding_enabled += 1;
        } else {
            inner.grounding_disabled += 1;
        }
        *inner.reason_counts.entry(decision.reason).or_insert(0) += 1;

        let n = inner.total_decisions as f64;
        inner.average_confidence =
            (inner.average_confidence * (n - 1.0) + decision.confidence) / n;
    }

    /// Returns a consistent copy of the current aggregate.
    pub fn snapshot(&self) -> GroundingStatsSnapshot {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        GroundingStatsSnapshot {
            total_decisions: inner.total_decisions,
            grounding_enabled: inner.grounding_enabled,
            grounding_disabled: inner.grounding_disabled,
            reason_counts: inner.reason_counts.clone(),
            average_confidence: inner.average_confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn starts_empty() {
        let snapshot = GroundingStats::new().snapshot();
        assert_eq!(snapshot.total_decisions, 0);
        assert_eq!(snapshot.average_confidence, 0.0);
        assert!(snapshot.reason_counts.is_empty());
    }

    #[test]
    fn counts_enabled_and_disabled_separately() {
        let stats = GroundingStats::new();
        stats.record(&GroundingDecision::ground(
            GroundingReason::RecencyIntent,
            0.85,
        ));
        stats.record(&GroundingDecision::skip(
            GroundingReason::SimpleDialogue,
            0.95,
        ));
        stats.record(&GroundingDecision::skip(
            GroundingReason::GeneralQuery,
            0.75,
        ));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_decisions, 3);
        assert_eq!(snapshot.grounding_enabled, 1);
        assert_eq!(snapshot.grounding_disabled, 2);
        assert_eq!(
            snapshot.reason_counts[&GroundingReason::SimpleDialogue],
            1
        );
    }

    #[test]
    fn running_mean_matches_arithmetic_mean() {
        let stats = GroundingStats::new();
        stats.record(&GroundingDecision::ground(
            GroundingReason::VerificationIntent,
            0.9,
        ));
        stats.record(&GroundingDecision::skip(GroundingReason::GeneralQuery, 0.5));

        let snapshot = stats.snapshot();
        assert!((snapshot.average_confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn repeated_reasons_accumulate() {
        let stats = GroundingStats::new();
        for _ in 0..4 {
            stats.record(&GroundingDecision::ground(
                GroundingReason::SpecificProductVerification,
                0.95,
            ));
        }

        let snapshot = stats.snapshot();
        assert_eq!(
            snapshot.reason_counts[&GroundingReason::SpecificProductVerification],
            4
        );
    }

    #[test]
    fn concurrent_recording_loses_nothing() {
        let stats = Arc::new(GroundingStats::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let stats = Arc::clone(&stats);
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    stats.record(&GroundingDecision::ground(
                        GroundingReason::RecencyIntent,
                        0.85,
                    ));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_decisions, 800);
        assert!((snapshot.average_confidence - 0.85).abs() < 1e-9);
    }
}
