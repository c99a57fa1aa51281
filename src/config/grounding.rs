//! Grounding engine configuration

use serde::Deserialize;

use crate::domain::grounding::GroundingMode;

use super::error::ValidationError;

/// Grounding engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GroundingConfig {
    /// Aggressiveness mode: conservative, balanced, or aggressive
    #[serde(default = "default_mode")]
    pub mode: String,
}

impl GroundingConfig {
    /// Parse the configured mode string
    pub fn parsed_mode(&self) -> Result<GroundingMode, ValidationError> {
        self.mode
            .parse()
            .map_err(|_| ValidationError::InvalidGroundingMode(self.mode.clone()))
    }

    /// Validate grounding configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.parsed_mode().map(|_| ())
    }
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
        }
    }
}

fn default_mode() -> String {
    "balanced".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_balanced() {
        let config = GroundingConfig::default();
        assert_eq!(config.parsed_mode().unwrap(), GroundingMode::Balanced);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_mode_fails_validation() {
        let config = GroundingConfig {
            mode: "extreme".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn all_known_modes_parse() {
        for (raw, expected) in [
            ("conservative", GroundingMode::Conservative),
            ("balanced", GroundingMode::Balanced),
            ("aggressive", GroundingMode::Aggressive),
        ] {
            let config = GroundingConfig {
                mode: raw.to_string(),
            };
            assert_eq!(config.parsed_mode().unwrap(), expected);
        }
    }
}
