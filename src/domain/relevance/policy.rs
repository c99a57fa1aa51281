//! Search-type filtering policies.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// What kind of product search the AI requested.
///
/// Arrives as a wire value inside the AI reply; the variant picks the
/// threshold/cap policy the relevance engine filters with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// Looking for one specific product; keep only close matches.
    Exact,
    /// Searching by requirements; moderate tolerance.
    Parameters,
    /// Browsing a category; keep a wide net.
    Category,
}

impl SearchType {
    /// Returns the string representation used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Exact => "exact",
            SearchType::Parameters => "parameters",
            SearchType::Category => "category",
        }
    }
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(SearchType::Exact),
            "parameters" => Ok(SearchType::Parameters),
            "category" => Ok(SearchType::Category),
            _ => Err(format!("Invalid search type: {}", s)),
        }
    }
}

/// Threshold and result cap applied after scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchPolicy {
    /// Minimum score a candidate must reach to be kept.
    pub threshold: f64,
    /// Maximum number of kept candidates.
    pub max_results: usize,
}

impl SearchPolicy {
    /// Creates a policy, rejecting out-of-range values.
    ///
    /// # Errors
    ///
    /// - `OutOfRange` if `threshold` leaves `[0, 1]` or `max_results` is zero
    pub fn new(threshold: f64, max_results: usize) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ValidationError::invalid_format(
                "threshold",
                format!("must be within [0, 1], got {}", threshold),
            ));
        }
        if max_results == 0 {
            return Err(ValidationError::out_of_range("max_results", 1, i32::MAX, 0));
        }
        Ok(Self {
            threshold,
            max_results,
        })
    }

    /// The default policy for a search type.
    pub fn default_for(search_type: SearchType) -> Self {
        match search_type {
            SearchType::Exact => Self {
                threshold: 0.7,
                max_results: 3,
            },
            SearchType::Parameters => Self {
                threshold: 0.5,
                max_results: 6,
            },
            SearchType::Category => Self {
                threshold: 0.3,
                max_results: 8,
            },
        }
    }
}
