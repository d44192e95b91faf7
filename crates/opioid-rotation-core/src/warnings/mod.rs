//! Clinical warning rules.
//!
//! Rules are pure functions from a drug, route or GFR value to a list of
//! [`Warning`]s. The regimen pipeline decides the order in which they are
//! collected; [`dedup_warnings`] removes repeats afterwards.

mod render;

use std::collections::HashSet;

use crate::convert::is_fentanyl_patch;
use crate::models::{RenalRiskTier, Warning, WarningCode};

/// GFR (ml/min) below which renal warnings apply.
pub const GFR_RENAL_THRESHOLD: f64 = 30.0;

/// GFR (ml/min) below which the escalated renal warning applies.
pub const GFR_SEVERE_THRESHOLD: f64 = 10.0;

/// Renal risk tier per drug at GFR < 30 ml/min.
pub static RENAL_RISK_TABLE: &[(&str, RenalRiskTier)] = &[
    ("morphine", RenalRiskTier::Avoid),
    ("codeine", RenalRiskTier::Avoid),
    ("dihydrocodeine", RenalRiskTier::Avoid),
    ("pethidine", RenalRiskTier::Contraindicated),
    ("oxycodone", RenalRiskTier::Caution),
    ("oxycodone-naloxone", RenalRiskTier::Caution),
    ("hydromorphone", RenalRiskTier::Caution),
    ("tramadol", RenalRiskTier::Caution),
    ("fentanyl", RenalRiskTier::Preferred),
    ("sufentanil", RenalRiskTier::Preferred),
    ("methadone", RenalRiskTier::Preferred),
];

/// General renal warnings for a GFR value.
pub fn gfr_warnings(gfr: f64) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if gfr < GFR_RENAL_THRESHOLD {
        warnings.push(Warning::new(WarningCode::RenalBelow30));
    }
    if gfr < GFR_SEVERE_THRESHOLD {
        warnings.push(Warning::new(WarningCode::RenalBelow10));
    }
    warnings
}

/// Fixed safety notes tied to a drug's identity.
pub fn drug_warnings(drug: &str) -> Vec<Warning> {
    let code = match drug.trim().to_lowercase().as_str() {
        "methadone" => WarningCode::Methadone,
        "nalbuphine" => WarningCode::Nalbuphine,
        "pethidine" => WarningCode::Pethidine,
        "oxycodone-naloxone" => WarningCode::OxycodoneNaloxoneHepatic,
        _ => return Vec::new(),
    };
    vec![Warning::for_drug(code, drug)]
}

/// Notes tied to a specific formulation of a drug.
pub fn route_warnings(drug: &str, route: &str) -> Vec<Warning> {
    if is_fentanyl_patch(drug, route) {
        return vec![Warning::for_drug(WarningCode::FentanylPatchOnset, drug)];
    }
    if drug.trim().eq_ignore_ascii_case("fentanyl")
        && route.trim().eq_ignore_ascii_case("oral/mucosal")
    {
        return vec![Warning::for_drug(WarningCode::FentanylMucosalTitration, drug)];
    }
    Vec::new()
}

/// Renal risk tier of a drug, if classified.
pub fn renal_risk_tier(drug: &str) -> Option<RenalRiskTier> {
    let drug = drug.trim();
    RENAL_RISK_TABLE
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(drug))
        .map(|(_, tier)| *tier)
}

/// Tier warning for a drug when GFR is below 30 ml/min.
///
/// Preferred drugs and unclassified drugs produce nothing.
pub fn renal_drug_warnings(drug: &str, gfr: f64) -> Vec<Warning> {
    if gfr >= GFR_RENAL_THRESHOLD {
        return Vec::new();
    }
    let code = match renal_risk_tier(drug) {
        Some(RenalRiskTier::Contraindicated) => WarningCode::RenalContraindicated,
        Some(RenalRiskTier::Avoid) => WarningCode::RenalAvoid,
        Some(RenalRiskTier::Caution) => WarningCode::RenalCaution,
        Some(RenalRiskTier::Preferred) | None => return Vec::new(),
    };
    vec![Warning::for_drug(code, drug)]
}

/// Drop warnings whose rendered text already appeared, keeping first occurrences.
pub fn dedup_warnings(warnings: Vec<Warning>) -> Vec<Warning> {
    let mut seen = HashSet::new();
    warnings
        .into_iter()
        .filter(|w| seen.insert(w.message()))
        .collect()
}
