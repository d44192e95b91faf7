//! Linear conversion factor table.

use crate::models::ConversionEntry;

use super::{ConversionError, ConversionResult};

const fn entry(
    drug: &'static str,
    route: &'static str,
    factor_to_ome: f64,
    factor_from_ome: f64,
    note: &'static str,
) -> ConversionEntry {
    ConversionEntry {
        drug,
        route,
        factor_to_ome,
        factor_from_ome,
        note,
    }
}

/// Linear OME factors. One row per (drug, route).
pub static CONVERSION_TABLE: &[ConversionEntry] = &[
    entry("morphine", "oral", 1.0, 1.0, "Reference standard"),
    entry("morphine", "sc/iv", 3.0, 0.333, "Parenteral ~3x more potent"),
    entry("oxycodone", "oral", 1.5, 0.667, "~1.5x more potent than morphine"),
    entry("oxycodone", "sc/iv", 3.0, 0.333, "SC/IV oxycodone highly potent"),
    entry("hydromorphone", "oral", 5.0, 0.2, "5x more potent"),
    entry("hydromorphone", "sc/iv", 15.0, 0.067, "Parenteral hydromorphone"),
    entry("tramadol", "oral", 0.1, 10.0, "100mg tramadol = 10mg morphine"),
    entry("tramadol", "iv", 0.1, 10.0, "100mg tramadol = 10mg morphine"),
    entry("codeine", "oral", 0.1, 10.0, "100mg codeine = 10mg morphine"),
    entry("dihydrocodeine", "oral", 0.1, 10.0, "100mg DHC = 10mg morphine"),
    entry("fentanyl", "sc/iv", 100.0, 0.01, "Use mcg to mg carefully"),
    entry("fentanyl", "oral/mucosal", 50.0, 0.02, "Transmucosal; titrate individually"),
    // Naloxone acts locally in the gut; same factor as oxycodone.
    entry("oxycodone-naloxone", "oral", 1.5, 0.667, "Oxycodone component"),
    entry("fentanyl", "patch", 0.0, 0.0, "Use patch lookup table"),
];

/// Look up the conversion row for a drug and route (case-insensitive).
pub fn lookup(drug: &str, route: &str) -> ConversionResult<&'static ConversionEntry> {
    CONVERSION_TABLE
        .iter()
        .find(|e| e.matches(drug, route))
        .ok_or_else(|| ConversionError::NotFound {
            drug: drug.to_string(),
            route: route.to_string(),
            suggestion: crate::normalizer::shared()
                .closest_drug(drug)
                .filter(|s| !s.eq_ignore_ascii_case(drug.trim())),
        })
}

/// Check whether a (drug, route) pair is transdermal fentanyl.
pub fn is_fentanyl_patch(drug: &str, route: &str) -> bool {
    drug.trim().eq_ignore_ascii_case("fentanyl") && route.trim().eq_ignore_ascii_case("patch")
}

/// Check whether any row exists for this drug, regardless of route.
pub fn is_known_drug(drug: &str) -> bool {
    CONVERSION_TABLE
        .iter()
        .any(|e| e.drug.eq_ignore_ascii_case(drug.trim()))
}

/// Routes listed for a drug in the conversion table.
pub fn routes_for(drug: &str) -> Vec<&'static str> {
    CONVERSION_TABLE
        .iter()
        .filter(|e| e.drug.eq_ignore_ascii_case(drug.trim()))
        .map(|e| e.route)
        .collect()
}

/// Convert a drug's total daily dose to OME (mg/day).
///
/// Transdermal fentanyl is rejected; use [`super::fentanyl_patch_to_ome`].
pub fn drug_dose_to_ome(drug: &str, route: &str, tdd: f64) -> ConversionResult<f64> {
    let entry = lookup(drug, route)?;
    if entry.is_patch_placeholder() {
        return Err(ConversionError::InvalidUse(
            "Use fentanyl_patch_to_ome() for transdermal fentanyl".into(),
        ));
    }
    Ok(tdd * entry.factor_to_ome)
}

/// Convert OME (mg/day) to a target drug's total daily dose.
pub fn ome_to_drug_dose(drug: &str, route: &str, ome: f64) -> ConversionResult<f64> {
    let entry = lookup(drug, route)?;
    Ok(ome * entry.factor_from_ome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_one_row_per_pair() {
        for (i, a) in CONVERSION_TABLE.iter().enumerate() {
            for b in &CONVERSION_TABLE[i + 1..] {
                assert!(
                    !(a.drug == b.drug && a.route == b.route),
                    "duplicate row for {} ({})",
                    a.drug,
                    a.route
                );
            }
        }
    }

    #[test]
    fn test_drug_to_ome() {
        assert!(approx(drug_dose_to_ome("morphine", "oral", 60.0).unwrap(), 60.0));
        assert!(approx(drug_dose_to_ome("morphine", "sc/iv", 20.0).unwrap(), 60.0));
        assert!(approx(drug_dose_to_ome("oxycodone", "oral", 40.0).unwrap(), 60.0));
        assert!(approx(drug_dose_to_ome("tramadol", "oral", 100.0).unwrap(), 10.0));
        assert!(approx(drug_dose_to_ome("hydromorphone", "oral", 4.0).unwrap(), 20.0));
        assert!(approx(drug_dose_to_ome("fentanyl", "sc/iv", 0.1).unwrap(), 10.0));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        assert!(approx(drug_dose_to_ome("MORPHINE", "Oral", 10.0).unwrap(), 10.0));
    }

    #[test]
    fn test_fentanyl_patch_rejected() {
        let err = drug_dose_to_ome("fentanyl", "patch", 25.0).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidUse(_)));
        assert!(err.to_string().contains("patch"));
    }

    #[test]
    fn test_unknown_drug() {
        let err = drug_dose_to_ome("aspirin", "oral", 100.0).unwrap_err();
        assert!(matches!(err, ConversionError::NotFound { .. }));
        assert_eq!(err.to_string(), "No conversion entry for aspirin (oral)");
    }

    #[test]
    fn test_not_found_suggests_close_name() {
        match lookup("morfine", "oral").unwrap_err() {
            ConversionError::NotFound { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("morphine"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // Known drug, unknown route: nothing to suggest
        match lookup("morphine", "rectal").unwrap_err() {
            ConversionError::NotFound { suggestion, .. } => assert!(suggestion.is_none()),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_ome_to_drug() {
        assert!(approx(ome_to_drug_dose("morphine", "oral", 60.0).unwrap(), 60.0));
        assert!((ome_to_drug_dose("morphine", "sc/iv", 60.0).unwrap() - 20.0).abs() < 0.2);
        assert!((ome_to_drug_dose("oxycodone", "oral", 60.0).unwrap() - 40.0).abs() < 0.1);
        assert!(approx(ome_to_drug_dose("hydromorphone", "oral", 45.0).unwrap(), 9.0));
    }

    #[test]
    fn test_routes_for() {
        assert_eq!(routes_for("tramadol"), vec!["oral", "iv"]);
        assert!(is_known_drug("Codeine"));
        assert!(!is_known_drug("methadone"));
    }
}
