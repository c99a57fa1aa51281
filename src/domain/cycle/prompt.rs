//! Prompt version markers for instruction drift detection.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identifies which revision of the static instruction text a cycle
/// was started under.
///
/// The hash lets operators detect state produced by an outdated prompt
/// after a deploy, without storing the instruction text itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptVersion {
    id: String,
    hash: String,
}

impl PromptVersion {
    /// Fingerprints instruction text under a caller-chosen id.
    pub fn fingerprint(id: impl Into<String>, instructions: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(instructions.as_bytes());
        Self {
            id: id.into(),
            hash: format!("{:x}", hasher.finalize()),
        }
    }

    /// Reassembles a version from stored markers (no recomputation).
    pub fn from_parts(id: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            hash: hash.into(),
        }
    }

    /// Returns the prompt identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the instruction fingerprint.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Checks whether stored markers match this version.
    pub fn matches(&self, prompt_id: &str, prompt_hash: &str) -> bool {
        self.id == prompt_id && self.hash == prompt_hash
    }
}
