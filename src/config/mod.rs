//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `SHOPGUIDE` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use shopguide::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod credentials;
mod error;
mod grounding;
mod search;
mod session;

pub use credentials::CredentialsConfig;
pub use error::{ConfigError, ValidationError};
pub use grounding::GroundingConfig;
pub use search::{SearchConfig, SearchTypeConfig};
pub use session::SessionConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section carries defaults, so `SHOPGUIDE__CREDENTIALS__*` keys
/// are the only variables a deployment must set.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Grounding engine mode
    #[serde(default)]
    pub grounding: GroundingConfig,

    /// Relevance filtering policies
    #[serde(default)]
    pub search: SearchConfig,

    /// Session and cycle window settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Upstream credential pools
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `SHOPGUIDE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `SHOPGUIDE__GROUNDING__MODE=aggressive` -> `grounding.mode`
    /// - `SHOPGUIDE__SESSION__MAX_ITERATIONS=8` -> `session.max_iterations`
    /// - `SHOPGUIDE__CREDENTIALS__ASSISTANT_KEYS=k1,k2` -> `credentials.assistant_keys`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the
    /// expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SHOPGUIDE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.grounding.validate()?;
        self.search.validate()?;
        self.session.validate()?;
        self.credentials.validate()?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            grounding: GroundingConfig::default(),
            search: SearchConfig::default(),
            session: SessionConfig::default(),
            credentials: CredentialsConfig::default(),
        }
    }
}
