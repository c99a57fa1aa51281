//! Locale value object.

use crate::domain::foundation::ValidationError;
use serde::{Deserialize, Serialize};

/// Language and region of a shopping session.
///
/// Threaded through to the AI backend so replies match the user's
/// language and the search provider targets the right market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    language: String,
    region: String,
}

impl Locale {
    /// Creates a locale, rejecting empty parts.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if language or region is empty
    pub fn new(language: impl Into<String>, region: impl Into<String>) -> Result<Self, ValidationError> {
        let language = language.into();
        let region = region.into();
        if language.is_empty() {
            return Err(ValidationError::empty_field("language"));
        }
        if region.is_empty() {
            return Err(ValidationError::empty_field("region"));
        }
        Ok(Self { language, region })
    }

    /// Returns the language code.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the region code.
    pub fn region(&self) -> &str {
        &self.region
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.language, self.region)
    }
}
