//! Fentanyl patch combination models.

use serde::{Deserialize, Serialize};

/// A number of patches of one strength.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatchCount {
    /// Patch strength (mcg/hr)
    pub mcg_per_hr: u32,
    /// Number of patches of this strength
    pub count: u32,
}

/// A set of standard patches approximating a target delivery rate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatchCombination {
    /// Patches ordered from largest to smallest strength
    pub patches: Vec<PatchCount>,
    /// Achieved delivery rate (mcg/hr)
    pub total_mcg_per_hr: u32,
}

impl PatchCombination {
    /// Build a combination and compute its achieved total.
    ///
    /// The total saturates at `u32::MAX`.
    pub fn new(patches: Vec<PatchCount>) -> Self {
        let total_mcg_per_hr = patches.iter().fold(0u32, |acc, p| {
            acc.saturating_add(p.mcg_per_hr.saturating_mul(p.count))
        });
        Self {
            patches,
            total_mcg_per_hr,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Total number of physical patches.
    pub fn patch_count(&self) -> u32 {
        self.patches
            .iter()
            .fold(0u32, |acc, p| acc.saturating_add(p.count))
    }

    /// Achieved minus requested rate: positive on overshoot, negative on undershoot.
    pub fn deviation_from(&self, requested_mcg_per_hr: u32) -> i64 {
        i64::from(self.total_mcg_per_hr) - i64::from(requested_mcg_per_hr)
    }

    /// Check whether a given strength is part of the combination.
    pub fn includes_strength(&self, mcg_per_hr: u32) -> bool {
        self.patches
            .iter()
            .any(|p| p.mcg_per_hr == mcg_per_hr && p.count > 0)
    }
}

/// Suggested physical patches for a transdermal fentanyl target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatchSuggestion {
    /// Delivery rate derived from the reduced OME (mcg/hr)
    pub target_mcg_per_hr: u32,
    /// Greedy combination of available patch sizes
    pub combination: PatchCombination,
}

impl PatchSuggestion {
    /// Relative difference between achieved and requested rate, in percent.
    pub fn deviation_pct(&self) -> f64 {
        if self.target_mcg_per_hr == 0 {
            return 0.0;
        }
        self.combination.deviation_from(self.target_mcg_per_hr) as f64
            / f64::from(self.target_mcg_per_hr)
            * 100.0
    }
}
