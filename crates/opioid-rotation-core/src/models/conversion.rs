//! Conversion table models.

use serde::{Deserialize, Serialize};

/// A single row of the linear OME conversion table.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ConversionEntry {
    /// Drug identifier (lowercase)
    pub drug: &'static str,
    /// Route identifier (e.g., "oral", "sc/iv", "patch")
    pub route: &'static str,
    /// Multiplier from a daily dose of this drug/route to OME
    pub factor_to_ome: f64,
    /// Multiplier from OME back to a daily dose of this drug/route
    pub factor_from_ome: f64,
    /// Free-text clinical note
    pub note: &'static str,
}

impl ConversionEntry {
    /// Case-insensitive match on both keys.
    pub fn matches(&self, drug: &str, route: &str) -> bool {
        self.drug.eq_ignore_ascii_case(drug.trim()) && self.route.eq_ignore_ascii_case(route.trim())
    }

    /// The (fentanyl, patch) row only redirects to the patch table.
    pub fn is_patch_placeholder(&self) -> bool {
        self.drug == "fentanyl" && self.route == "patch"
    }
}

/// A row in the fentanyl transdermal patch table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FentanylPatchEntry {
    /// Nominal delivery rate (mcg/hr)
    pub mcg_per_hr: u32,
    /// Lower bound of the observed OME range (mg/day)
    pub ome_low: f64,
    /// Upper bound of the observed OME range (mg/day)
    pub ome_high: f64,
}

impl FentanylPatchEntry {
    /// Canonical OME for this patch strength.
    pub fn midpoint(&self) -> f64 {
        (self.ome_low + self.ome_high) / 2.0
    }

    pub fn breakthrough_low(&self) -> f64 {
        self.ome_low / 6.0
    }

    pub fn breakthrough_high(&self) -> f64 {
        self.ome_high / 6.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_matching_ignores_case() {
        let entry = ConversionEntry {
            drug: "morphine",
            route: "sc/iv",
            factor_to_ome: 3.0,
            factor_from_ome: 0.333,
            note: "",
        };

        assert!(entry.matches("Morphine", "SC/IV"));
        assert!(entry.matches(" morphine ", "sc/iv"));
        assert!(!entry.matches("morphine", "oral"));
        assert!(!entry.is_patch_placeholder());
    }

    #[test]
    fn test_patch_entry_derived_values() {
        let entry = FentanylPatchEntry {
            mcg_per_hr: 25,
            ome_low: 60.0,
            ome_high: 90.0,
        };

        assert_eq!(entry.midpoint(), 75.0);
        assert_eq!(entry.breakthrough_low(), 10.0);
        assert_eq!(entry.breakthrough_high(), 15.0);
    }
}
