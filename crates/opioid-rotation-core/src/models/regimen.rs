//! Regimen input and result models.

use serde::{Deserialize, Serialize};

use super::{PatchSuggestion, Warning};

/// One current medication entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpioidInput {
    /// Drug identifier (case-insensitive)
    pub drug: String,
    /// Route identifier (case-insensitive)
    pub route: String,
    /// Per-administration doses; a single value when symmetrical.
    /// For transdermal fentanyl these are patch rates in mcg/hr.
    pub doses: Vec<f64>,
    /// Administrations per day
    pub frequency: u32,
    /// Whether the doses differ across the day
    pub asymmetrical: bool,
}

impl OpioidInput {
    /// One dose repeated `frequency` times a day.
    pub fn symmetric(drug: impl Into<String>, route: impl Into<String>, dose: f64, frequency: u32) -> Self {
        Self {
            drug: drug.into(),
            route: route.into(),
            doses: vec![dose],
            frequency,
            asymmetrical: false,
        }
    }

    /// Each listed dose is a separate administration.
    pub fn asymmetric(drug: impl Into<String>, route: impl Into<String>, doses: Vec<f64>) -> Self {
        let frequency = doses.len() as u32;
        Self {
            drug: drug.into(),
            route: route.into(),
            doses,
            frequency,
            asymmetrical: true,
        }
    }

    /// A transdermal fentanyl patch of the given strength.
    pub fn fentanyl_patch(mcg_per_hr: f64) -> Self {
        Self::symmetric("fentanyl", "patch", mcg_per_hr, 1)
    }

    pub fn is_fentanyl_patch(&self) -> bool {
        crate::convert::is_fentanyl_patch(&self.drug, &self.route)
    }
}

/// OME contribution of a single input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrugOme {
    pub drug: String,
    pub route: String,
    /// Total daily dose (mcg/hr for patches)
    pub total_daily_dose: f64,
    /// Oral morphine equivalent (mg/day)
    pub ome: f64,
}

/// A count of tablets at a specific strength.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TabletCount {
    /// Tablet strength (mg)
    pub mg: f64,
    pub count: u32,
}

/// A single administration rounded to available tablets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoseDistribution {
    /// Dose actually delivered by the tablets (mg)
    pub total_mg: f64,
    pub tablets: Vec<TabletCount>,
}

/// Output of one regimen computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetResult {
    /// Target drug
    pub drug: String,
    /// Target route
    pub route: String,
    /// Target total daily dose, rounded to 2 decimals.
    /// For transdermal fentanyl this is the reduced OME.
    pub total_daily_dose: f64,
    /// Per-administration doses
    pub divided_doses: Vec<f64>,
    /// Administrations per day
    pub frequency: u32,
    /// Rescue dose (TDD / 6); absent when no fixed breakthrough dose applies
    pub breakthrough_dose: Option<f64>,
    /// Ordered, de-duplicated warnings
    pub warnings: Vec<Warning>,
    /// Summed OME of all inputs, before reduction
    pub total_ome: f64,
    /// OME after cross-tolerance reduction
    pub reduced_ome: f64,
    /// Reduction actually applied (percent)
    pub applied_reduction_pct: f64,
    /// Per-input OME breakdown in input order
    pub per_drug_ome: Vec<DrugOme>,
    /// Physical patch suggestion (transdermal fentanyl target only)
    pub patch_suggestion: Option<PatchSuggestion>,
    /// Tablet-rounded schedule, when tablet sizes are known for the target
    pub practical_schedule: Vec<DoseDistribution>,
    /// Immediate-release tablets approximating the breakthrough dose
    pub breakthrough_tablets: Vec<TabletCount>,
}

impl TargetResult {
    /// Render warnings as English messages.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(Warning::message).collect()
    }

    /// Total delivered by the practical schedule, if one was computed.
    pub fn practical_total(&self) -> Option<f64> {
        if self.practical_schedule.is_empty() {
            return None;
        }
        Some(
            self.practical_schedule
                .iter()
                .fold(0.0, |acc, d| acc + d.total_mg),
        )
    }

    /// Check if any warning has danger severity.
    pub fn has_danger(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| w.severity() == super::Severity::Danger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let sym = OpioidInput::symmetric("morphine", "oral", 15.0, 4);
        assert_eq!(sym.doses, vec![15.0]);
        assert!(!sym.asymmetrical);

        let asym = OpioidInput::asymmetric("morphine", "oral", vec![20.0, 10.0, 40.0]);
        assert_eq!(asym.frequency, 3);
        assert!(asym.asymmetrical);

        let patch = OpioidInput::fentanyl_patch(25.0);
        assert!(patch.is_fentanyl_patch());
        assert!(!sym.is_fentanyl_patch());
    }

    #[test]
    fn test_input_roundtrips_through_json() {
        let input = OpioidInput::symmetric("tramadol", "oral", 100.0, 3);
        let json = serde_json::to_string(&input).unwrap();
        let back: OpioidInput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, input);
    }
}
