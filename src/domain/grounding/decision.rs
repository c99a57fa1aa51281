//! Grounding decision value objects.

use serde::{Deserialize, Serialize};

/// Why the engine decided for or against grounding.
///
/// Each reason belongs to exactly one branch of the cascade, so reason
/// counts in the statistics read as a per-branch hit histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundingReason {
    /// User named a brand right after the assistant asked which one.
    BrandSelectionLatestModels,
    /// The message names a specific product model.
    SpecificProductVerification,
    /// The user is checking availability or existence.
    VerificationIntent,
    /// The user asked about new or current-year products.
    RecencyIntent,
    /// Greeting, confirmation, or a generic opening ask.
    SimpleDialogue,
    /// Long dialogue that already circled specific models.
    AdvancedDialogueStage,
    /// Technical specification question.
    TechnicalSpecs,
    /// Nothing matched; answer from trained knowledge.
    GeneralQuery,
}

impl GroundingReason {
    /// Returns the string representation used in logs and stats.
    pub fn as_str(&self) -> &'static str {
        match self {
            GroundingReason::BrandSelectionLatestModels => "brand_selection_latest_models",
            GroundingReason::SpecificProductVerification => "specific_product_verification",
            GroundingReason::VerificationIntent => "verification_intent",
            GroundingReason::RecencyIntent => "recency_intent",
            GroundingReason::SimpleDialogue => "simple_dialogue",
            GroundingReason::AdvancedDialogueStage => "advanced_dialogue_stage",
            GroundingReason::TechnicalSpecs => "technical_specs",
            GroundingReason::GeneralQuery => "general_query",
        }
    }
}

impl std::fmt::Display for GroundingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ground/no-ground verdict, produced fresh per call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundingDecision {
    /// Whether the AI call should be augmented with live search.
    pub should_ground: bool,
    /// Which cascade branch produced the verdict.
    pub reason: GroundingReason,
    /// Confidence in the verdict, in `[0, 1]`.
    pub confidence: f64,
}

impl GroundingDecision {
    /// Creates a decision to ground.
    pub fn ground(reason: GroundingReason, confidence: f64) -> Self {
        Self {
            should_ground: true,
            reason,
            confidence,
        }
    }

    /// Creates a decision not to ground.
    pub fn skip(reason: GroundingReason, confidence: f64) -> Self {
        Self {
            should_ground: false,
            reason,
            confidence,
        }
    }
}
