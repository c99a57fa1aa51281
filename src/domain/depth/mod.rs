//! Depth module - Context richness selection per turn.

mod optimizer;

pub use optimizer::{ContextDepth, ContextDepthOptimizer, SUMMARY_STALE_AFTER_SECS};
