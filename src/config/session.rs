//! Session and cycle window configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Session and cycle window configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Turns served per cycle before rollover
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Identifier of the instruction text revision in use
    #[serde(default = "default_prompt_id")]
    pub prompt_id: String,
}

impl SessionConfig {
    /// Validate session configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_iterations == 0 {
            return Err(ValidationError::ZeroMaxIterations);
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            prompt_id: default_prompt_id(),
        }
    }
}

fn default_max_iterations() -> u32 {
    6
}

fn default_prompt_id() -> String {
    "v1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_six_iterations() {
        let config = SessionConfig::default();
        assert_eq!(config.max_iterations, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_iterations_fails_validation() {
        let config = SessionConfig {
            max_iterations: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
