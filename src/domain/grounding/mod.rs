//! Grounding module - Should this reply be backed by live search?
//!
//! An ordered cascade classifies each user message into a ground or
//! no-ground decision with a reason and confidence. Every decision is
//! folded into a shared, lock-protected statistics aggregator.

mod decision;
mod engine;
mod mode;
mod stats;

pub use decision::{GroundingDecision, GroundingReason};
pub use engine::GroundingEngine;
pub use mode::GroundingMode;
pub use stats::{GroundingStats, GroundingStatsSnapshot};
