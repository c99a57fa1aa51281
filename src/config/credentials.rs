//! Credential pool configuration

use secrecy::SecretString;
use serde::Deserialize;

use super::error::ValidationError;

/// Upstream credential pools, one comma-separated list per service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsConfig {
    /// AI backend API keys, comma separated
    #[serde(default)]
    pub assistant_keys: String,

    /// Search provider API keys, comma separated
    #[serde(default)]
    pub search_keys: String,
}

impl CredentialsConfig {
    /// Parse the AI backend pool
    pub fn assistant_pool(&self) -> Vec<SecretString> {
        parse_pool(&self.assistant_keys)
    }

    /// Parse the search provider pool
    pub fn search_pool(&self) -> Vec<SecretString> {
        parse_pool(&self.search_keys)
    }

    /// Validate that both pools are non-empty
    ///
    /// Empty pools fail here, at startup, so `Next` never has to fail
    /// at call time for configuration reasons.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.assistant_pool().is_empty() {
            return Err(ValidationError::EmptyCredentialPool("assistant"));
        }
        if self.search_pool().is_empty() {
            return Err(ValidationError::EmptyCredentialPool("search"));
        }
        Ok(())
    }
}

fn parse_pool(raw: &str) -> Vec<SecretString> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| SecretString::from(k.to_string()))
        .collect()
}
