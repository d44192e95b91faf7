//! Pipeline options.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Options controlling the optional steps of the regimen pipeline.
///
/// Missing fields take their defaults, so a partial JSON object is valid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegimenOptions {
    /// Raise the reduction to 25% (GFR < 30) or 50% (GFR < 10) when the
    /// requested reduction is lower.
    pub enforce_renal_reduction_floor: bool,
    /// Suggest physical patches for a transdermal fentanyl target.
    pub suggest_patch_combination: bool,
    /// Round oral targets to available tablet strengths.
    pub practical_rounding: bool,
}

impl Default for RegimenOptions {
    fn default() -> Self {
        Self {
            enforce_renal_reduction_floor: false,
            suggest_patch_combination: true,
            practical_rounding: true,
        }
    }
}

impl RegimenOptions {
    /// Parse options from a JSON string.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse regimen options")
    }

    /// Load options from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read regimen options from {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid regimen options in {}", path.display()))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
