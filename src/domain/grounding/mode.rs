//! Grounding aggressiveness presets.

use serde::{Deserialize, Serialize};

/// How eagerly the engine reaches for live search.
///
/// The mode is fixed at engine construction and tunes three dials:
/// the minimum word count for the specific-model pattern, whether
/// technical-spec questions trigger grounding, and how much history
/// counts as an advanced dialogue stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundingMode {
    /// Ground only on strong signals.
    Conservative,
    /// The production default.
    Balanced,
    /// Ground on weak signals too.
    Aggressive,
}

impl GroundingMode {
    /// Minimum query word count for the digit-based specific-model match.
    pub fn min_words_for_product(&self) -> usize {
        match self {
            GroundingMode::Conservative => 3,
            GroundingMode::Balanced => 2,
            GroundingMode::Aggressive => 1,
        }
    }

    /// Whether technical-spec questions trigger grounding.
    pub fn technical_spec_enabled(&self) -> bool {
        match self {
            GroundingMode::Conservative => false,
            GroundingMode::Balanced | GroundingMode::Aggressive => true,
        }
    }

    /// History length at which a dialogue counts as advanced.
    pub fn advanced_stage_lookback(&self) -> usize {
        match self {
            GroundingMode::Conservative => 6,
            GroundingMode::Balanced => 4,
            GroundingMode::Aggressive => 3,
        }
    }

    /// Returns the string representation for configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            GroundingMode::Conservative => "conservative",
            GroundingMode::Balanced => "balanced",
            GroundingMode::Aggressive => "aggressive",
        }
    }
}

impl Default for GroundingMode {
    fn default() -> Self {
        GroundingMode::Balanced
    }
}

impl std::fmt::Display for GroundingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GroundingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conservative" => Ok(GroundingMode::Conservative),
            "balanced" => Ok(GroundingMode::Balanced),
            "aggressive" => Ok(GroundingMode::Aggressive),
            _ => Err(format!("Invalid grounding mode: {}", s)),
        }
    }
}
