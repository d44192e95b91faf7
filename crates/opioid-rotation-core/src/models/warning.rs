//! Structured clinical warnings.
//!
//! Warnings are codes plus optional parameters; [`Warning::message`]
//! renders the English text.

use serde::{Deserialize, Serialize};

/// Severity of a clinical warning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Danger,
    Caution,
    Info,
}

/// Renal risk classification of a drug at GFR < 30 ml/min.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RenalRiskTier {
    Contraindicated,
    Avoid,
    Caution,
    Preferred,
}

/// Stable warning identifiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    RenalBelow30,
    RenalBelow10,
    RenalContraindicated,
    RenalAvoid,
    RenalCaution,
    RenalReductionFloor,
    Methadone,
    Nalbuphine,
    Pethidine,
    OxycodoneNaloxoneHepatic,
    FentanylMucosalTitration,
    FentanylPatchOnset,
    TramadolCeiling,
    BelowMinimumDose,
    BreakthroughEscalation,
    SingleBrandPatchStrength,
}

impl WarningCode {
    /// Dotted key for rendering layers outside the core.
    pub fn key(&self) -> &'static str {
        match self {
            Self::RenalBelow30 => "warning.gfr.below30",
            Self::RenalBelow10 => "warning.gfr.below10",
            Self::RenalContraindicated => "warning.gfr.drug.contraindicated",
            Self::RenalAvoid => "warning.gfr.drug.avoid",
            Self::RenalCaution => "warning.gfr.drug.caution",
            Self::RenalReductionFloor => "warning.gfr.reduction_floor",
            Self::Methadone => "warning.drug.methadone",
            Self::Nalbuphine => "warning.drug.nalbuphine",
            Self::Pethidine => "warning.drug.pethidine",
            Self::OxycodoneNaloxoneHepatic => "warning.drug.oxycodone_naloxone.hepatic",
            Self::FentanylMucosalTitration => "warning.drug.fentanyl.mucosal",
            Self::FentanylPatchOnset => "warning.drug.fentanyl.patch_onset",
            Self::TramadolCeiling => "warning.drug.tramadol.max",
            Self::BelowMinimumDose => "warning.dose.below_minimum",
            Self::BreakthroughEscalation => "warning.breakthrough.escalation",
            Self::SingleBrandPatchStrength => "warning.patch.single_brand_strength",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::RenalBelow30
            | Self::RenalBelow10
            | Self::RenalContraindicated
            | Self::RenalAvoid
            | Self::Methadone
            | Self::Nalbuphine
            | Self::Pethidine
            | Self::TramadolCeiling => Severity::Danger,
            Self::RenalCaution
            | Self::RenalReductionFloor
            | Self::FentanylMucosalTitration
            | Self::BelowMinimumDose => Severity::Caution,
            Self::OxycodoneNaloxoneHepatic
            | Self::FentanylPatchOnset
            | Self::BreakthroughEscalation
            | Self::SingleBrandPatchStrength => Severity::Info,
        }
    }
}

/// A single warning produced by the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Warning {
    pub code: WarningCode,
    /// Drug the warning refers to (lowercase identifier)
    pub drug: Option<String>,
    /// Calculated quantity the warning is about (e.g., a dose in mg)
    pub amount: Option<f64>,
    /// Limit the quantity was compared against
    pub limit: Option<f64>,
}

impl Warning {
    pub fn new(code: WarningCode) -> Self {
        Self {
            code,
            drug: None,
            amount: None,
            limit: None,
        }
    }

    /// A warning about a specific drug.
    pub fn for_drug(code: WarningCode, drug: &str) -> Self {
        Self {
            drug: Some(drug.trim().to_lowercase()),
            ..Self::new(code)
        }
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_limit(mut self, limit: f64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_drug_normalizes_name() {
        let w = Warning::for_drug(WarningCode::RenalAvoid, " Morphine ");
        assert_eq!(w.drug.as_deref(), Some("morphine"));
        assert_eq!(w.severity(), Severity::Danger);
    }

    #[test]
    fn test_codes_serialize_snake_case() {
        let json = serde_json::to_string(&WarningCode::RenalBelow30).unwrap();
        assert_eq!(json, "\"renal_below30\"");
        assert_eq!(WarningCode::RenalBelow30.key(), "warning.gfr.below30");
    }
}
