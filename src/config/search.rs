//! Relevance filtering configuration

use serde::Deserialize;

use crate::domain::foundation::ValidationError as DomainValidationError;
use crate::domain::relevance::{RelevanceEngine, SearchType};

use super::error::ValidationError;

/// Threshold and result cap for one search type
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SearchTypeConfig {
    /// Minimum relevance score a candidate must reach
    pub threshold: f64,
    /// Maximum number of results kept
    pub max_results: usize,
}

/// Relevance filtering configuration, one policy per search type
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_exact")]
    pub exact: SearchTypeConfig,

    #[serde(default = "default_parameters")]
    pub parameters: SearchTypeConfig,

    #[serde(default = "default_category")]
    pub category: SearchTypeConfig,
}

impl SearchConfig {
    /// Validate all three policies
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, policy) in [
            ("exact", self.exact),
            ("parameters", self.parameters),
            ("category", self.category),
        ] {
            if !(0.0..=1.0).contains(&policy.threshold) {
                return Err(ValidationError::ThresholdOutOfRange {
                    search_type: name,
                    value: policy.threshold,
                });
            }
            if policy.max_results == 0 {
                return Err(ValidationError::ZeroMaxResults(name));
            }
        }
        Ok(())
    }

    /// Build a relevance engine carrying these policies
    pub fn build_engine(&self) -> Result<RelevanceEngine, DomainValidationError> {
        RelevanceEngine::new()
            .with_policy(SearchType::Exact, self.exact.threshold, self.exact.max_results)?
            .with_policy(
                SearchType::Parameters,
                self.parameters.threshold,
                self.parameters.max_results,
            )?
            .with_policy(
                SearchType::Category,
                self.category.threshold,
                self.category.max_results,
            )
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exact: default_exact(),
            parameters: default_parameters(),
            category: default_category(),
        }
    }
}

fn default_exact() -> SearchTypeConfig {
    SearchTypeConfig {
        threshold: 0.7,
        max_results: 3,
    }
}

fn default_parameters() -> SearchTypeConfig {
    SearchTypeConfig {
        threshold: 0.5,
        max_results: 6,
    }
}

fn default_category() -> SearchTypeConfig {
    SearchTypeConfig {
        threshold: 0.3,
        max_results: 8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_policy_table() {
        let config = SearchConfig::default();
        assert_eq!(config.exact.threshold, 0.7);
        assert_eq!(config.exact.max_results, 3);
        assert_eq!(config.parameters.threshold, 0.5);
        assert_eq!(config.parameters.max_results, 6);
        assert_eq!(config.category.threshold, 0.3);
        assert_eq!(config.category.max_results, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn out_of_range_threshold_fails_validation() {
        let mut config = SearchConfig::default();
        config.parameters.threshold = 1.3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_cap_fails_validation() {
        let mut config = SearchConfig::default();
        config.category.max_results = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn engine_carries_the_configured_policies() {
        let mut config = SearchConfig::default();
        config.exact.threshold = 0.9;
        config.exact.max_results = 1;

        let engine = config.build_engine().unwrap();
        let policy = engine.policy(SearchType::Exact);
        assert_eq!(policy.threshold, 0.9);
        assert_eq!(policy.max_results, 1);
    }
}
