//! End-to-end regimen computation.
//!
//! One linear pass: renal warnings, per-input OME, reduction, target
//! conversion, renal tier warnings, de-duplication. Any failed lookup or
//! invalid argument aborts the whole computation.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RegimenOptions;
use crate::convert::{
    combine_patch_sizes, ome_to_methadone, ome_to_target_rate, ConversionError,
    ConversionResult, SourceConversion, TargetConversion, SINGLE_BRAND_PATCH_SIZE,
};
use crate::dose::{
    apply_reduction, distribute_to_tablets, divide_daily_dose, renal_reduction_floor,
    round2, round_to_tablets, sum_omes, total_daily_dose, validate_doses, MAX_ROUND_UP,
};
use crate::formulary;
use crate::models::{
    DrugOme, OpioidInput, PatchSuggestion, TabletCount, TargetResult, Warning, WarningCode,
};
use crate::warnings::{
    dedup_warnings, drug_warnings, gfr_warnings, renal_drug_warnings, route_warnings,
    GFR_RENAL_THRESHOLD,
};

/// Breakthrough dose is one sixth of the daily dose.
const BREAKTHROUGH_DIVISOR: f64 = 6.0;

/// Breakthrough for a patch target is given as oral morphine.
const PATCH_BREAKTHROUGH_DRUG: &str = "morphine";

/// A complete rotation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegimenRequest {
    /// Current opioids, in the order they were entered
    pub inputs: Vec<OpioidInput>,
    pub target_drug: String,
    pub target_route: String,
    /// Administrations per day of the target (ignored for patches)
    pub target_frequency: u32,
    /// Cross-tolerance reduction (percent, 0-100)
    pub reduction_pct: f64,
    /// Glomerular filtration rate (ml/min), when known
    pub gfr: Option<f64>,
}

impl RegimenRequest {
    /// Compute with default options.
    pub fn compute(&self) -> ConversionResult<TargetResult> {
        self.compute_with(&RegimenOptions::default())
    }

    pub fn compute_with(&self, options: &RegimenOptions) -> ConversionResult<TargetResult> {
        compute_target_regimen_with(
            &self.inputs,
            &self.target_drug,
            &self.target_route,
            self.target_frequency,
            self.reduction_pct,
            self.gfr,
            options,
        )
    }
}

/// Compute a target regimen with default options.
pub fn compute_target_regimen(
    inputs: &[OpioidInput],
    target_drug: &str,
    target_route: &str,
    target_frequency: u32,
    reduction_pct: f64,
    gfr: Option<f64>,
) -> ConversionResult<TargetResult> {
    compute_target_regimen_with(
        inputs,
        target_drug,
        target_route,
        target_frequency,
        reduction_pct,
        gfr,
        &RegimenOptions::default(),
    )
}

/// Compute a target regimen.
///
/// Warnings are collected in this order: renal general, per-input notes,
/// target notes, dose checks, renal tier per input and target. Repeats
/// are removed keeping the first occurrence.
pub fn compute_target_regimen_with(
    inputs: &[OpioidInput],
    target_drug: &str,
    target_route: &str,
    target_frequency: u32,
    reduction_pct: f64,
    gfr: Option<f64>,
    options: &RegimenOptions,
) -> ConversionResult<TargetResult> {
    if inputs.is_empty() {
        return Err(ConversionError::InvalidArgument(
            "At least one current opioid is required".into(),
        ));
    }
    if let Some(g) = gfr {
        if !g.is_finite() || g < 0.0 {
            return Err(ConversionError::InvalidArgument(format!(
                "GFR must be a non-negative number, got {}",
                g
            )));
        }
    }

    let target_drug = target_drug.trim().to_lowercase();
    let target_route = target_route.trim().to_lowercase();
    if formulary::is_unsuitable_as_target(&target_drug) {
        warn!("Rejected unsuitable rotation target {}", target_drug);
        return Err(ConversionError::InvalidUse(format!(
            "{} cannot be used as a rotation target",
            target_drug
        )));
    }

    // 1. Renal function
    let mut warnings = gfr.map(gfr_warnings).unwrap_or_default();

    // 2. Per-input OME
    let mut per_drug_ome = Vec::with_capacity(inputs.len());
    for input in inputs {
        warnings.extend(drug_warnings(&input.drug));
        warnings.extend(route_warnings(&input.drug, &input.route));

        validate_doses(input)?;
        let strategy = SourceConversion::resolve(&input.drug, &input.route).map_err(|e| {
            warn!("No conversion for input {} ({}): {}", input.drug, input.route, e);
            e
        })?;
        let ome = strategy.to_ome(input)?;
        let tdd = total_daily_dose(input);
        debug!("Input {} ({}): TDD {} -> OME {}", input.drug, input.route, tdd, ome);

        per_drug_ome.push(DrugOme {
            drug: input.drug.clone(),
            route: input.route.clone(),
            total_daily_dose: tdd,
            ome,
        });
    }

    // 3. Sum
    let omes: Vec<f64> = per_drug_ome.iter().map(|d| d.ome).collect();
    let total_ome = sum_omes(&omes);

    // 4. Reduction
    let mut applied_reduction_pct = reduction_pct;
    if options.enforce_renal_reduction_floor {
        let floor = renal_reduction_floor(gfr);
        if floor > reduction_pct {
            debug!("Raising reduction from {}% to renal floor {}%", reduction_pct, floor);
            applied_reduction_pct = floor;
            warnings.push(Warning::new(WarningCode::RenalReductionFloor).with_amount(floor));
        }
    }
    let reduced_ome = apply_reduction(total_ome, applied_reduction_pct)?;
    debug!(
        "Total OME {} reduced by {}% to {}",
        total_ome, applied_reduction_pct, reduced_ome
    );

    // 5. Target notes
    warnings.extend(drug_warnings(&target_drug));
    warnings.extend(route_warnings(&target_drug, &target_route));

    // 6. Target conversion
    let strategy = TargetConversion::resolve(&target_drug, &target_route).map_err(|e| {
        warn!("No conversion for target {} ({}): {}", target_drug, target_route, e);
        e
    })?;

    let mut patch_suggestion = None;
    let (tdd, divided_doses, frequency, breakthrough) = match strategy {
        TargetConversion::Patch => {
            if options.suggest_patch_combination {
                let rate = ome_to_target_rate(reduced_ome)?;
                let combination = combine_patch_sizes(rate);
                debug!(
                    "Patch target {} mcg/hr, combination delivers {} mcg/hr",
                    rate, combination.total_mcg_per_hr
                );
                if combination.includes_strength(SINGLE_BRAND_PATCH_SIZE) {
                    warnings.push(Warning::new(WarningCode::SingleBrandPatchStrength));
                }
                patch_suggestion = Some(PatchSuggestion {
                    target_mcg_per_hr: rate,
                    combination,
                });
            }
            let breakthrough = reduced_ome / BREAKTHROUGH_DIVISOR;
            (reduced_ome, vec![round2(reduced_ome)], 1, Some(breakthrough))
        }
        TargetConversion::Linear(entry) => {
            let tdd = reduced_ome * entry.factor_from_ome;
            let divided = divide_daily_dose(tdd, target_frequency)?;
            (tdd, divided, target_frequency, Some(tdd / BREAKTHROUGH_DIVISOR))
        }
        TargetConversion::Methadone => {
            let tdd = ome_to_methadone(reduced_ome);
            let divided = divide_daily_dose(tdd, target_frequency)?;
            (tdd, divided, target_frequency, None)
        }
    };
    debug!("Target {} ({}): TDD {}", target_drug, target_route, tdd);

    warnings.extend(dose_limit_warnings(&target_drug, &target_route, tdd, &divided_doses));

    let practical_schedule = if options.practical_rounding && target_route == "oral" {
        distribute_to_tablets(tdd, frequency, formulary::tablet_sizes(&target_drug, &target_route))
    } else {
        Vec::new()
    };

    let breakthrough_tablets = match (strategy, breakthrough) {
        (TargetConversion::Patch, Some(dose)) => {
            breakthrough_tablets(dose, formulary::ir_tablet_sizes(PATCH_BREAKTHROUGH_DRUG))
        }
        (_, Some(dose)) if target_route == "oral" => {
            breakthrough_tablets(dose, formulary::ir_tablet_sizes(&target_drug))
        }
        _ => Vec::new(),
    };

    if breakthrough.is_some_and(|dose| dose > 0.0) {
        warnings.push(Warning::new(WarningCode::BreakthroughEscalation));
    }

    // 7. Renal tiers
    if let Some(g) = gfr.filter(|g| *g < GFR_RENAL_THRESHOLD) {
        for input in inputs {
            warnings.extend(renal_drug_warnings(&input.drug, g));
        }
        warnings.extend(renal_drug_warnings(&target_drug, g));
    }

    // 8. De-duplicate and round
    let warnings = dedup_warnings(warnings);

    Ok(TargetResult {
        drug: target_drug,
        route: target_route,
        total_daily_dose: round2(tdd),
        divided_doses,
        frequency,
        breakthrough_dose: breakthrough.map(round2),
        warnings,
        total_ome,
        reduced_ome,
        applied_reduction_pct,
        per_drug_ome,
        patch_suggestion,
        practical_schedule,
        breakthrough_tablets,
    })
}

/// Ceiling and minimum-strength checks on the target dose.
fn dose_limit_warnings(drug: &str, route: &str, tdd: f64, divided: &[f64]) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if let Some(max) = formulary::max_daily_dose(drug) {
        if tdd > max {
            warnings.push(
                Warning::for_drug(WarningCode::TramadolCeiling, drug)
                    .with_amount(tdd)
                    .with_limit(max),
            );
        }
    }

    if route == "oral" {
        if let (Some(min), Some(&single)) = (formulary::min_single_dose(drug), divided.first()) {
            if single > 0.0 && single < min {
                warnings.push(
                    Warning::for_drug(WarningCode::BelowMinimumDose, drug)
                        .with_amount(single)
                        .with_limit(min),
                );
            }
        }
    }

    warnings
}

/// IR tablets for a breakthrough dose.
///
/// A dose below the smallest strength gets one smallest tablet, unless that
/// overshoots the dose by more than [`MAX_ROUND_UP`]; then it gets none.
fn breakthrough_tablets(dose: f64, sizes: &[f64]) -> Vec<TabletCount> {
    let tablets = round_to_tablets(dose, sizes);
    if !tablets.is_empty() || dose <= 0.0 {
        return tablets;
    }
    sizes
        .iter()
        .copied()
        .filter(|s| *s > 0.0)
        .min_by(|a, b| a.total_cmp(b))
        .filter(|mg| *mg <= dose * (1.0 + MAX_ROUND_UP))
        .map(|mg| vec![TabletCount { mg, count: 1 }])
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn within(actual: f64, expected: f64, tolerance: f64) -> bool {
        (actual - expected).abs() <= expected.abs() * tolerance
    }

    #[test]
    fn test_morphine_to_oxycodone() {
        let inputs = vec![OpioidInput::symmetric("morphine", "oral", 15.0, 4)];
        let result = compute_target_regimen(&inputs, "oxycodone", "oral", 2, 25.0, None).unwrap();

        assert!(within(result.total_daily_dose, 30.0, 0.02));
        assert_eq!(result.divided_doses.len(), 2);
        assert!(within(result.breakthrough_dose.unwrap(), 5.0, 0.10));
        assert_eq!(result.total_ome, 60.0);
        assert_eq!(result.reduced_ome, 45.0);
    }

    #[test]
    fn test_mixed_inputs_to_hydromorphone() {
        let inputs = vec![
            OpioidInput::symmetric("tramadol", "oral", 100.0, 3),
            OpioidInput::symmetric("morphine", "sc/iv", 5.0, 2),
        ];
        let result =
            compute_target_regimen(&inputs, "hydromorphone", "oral", 2, 25.0, None).unwrap();

        assert!(within(result.total_ome, 60.0, 1e-9));
        assert!(within(result.total_daily_dose, 9.0, 0.02));
        assert_eq!(result.per_drug_ome.len(), 2);
        assert_eq!(result.per_drug_ome[0].drug, "tramadol");
    }

    #[test]
    fn test_patch_to_morphine() {
        let inputs = vec![OpioidInput::fentanyl_patch(25.0)];
        let result = compute_target_regimen(&inputs, "morphine", "oral", 4, 25.0, None).unwrap();

        assert_eq!(result.total_ome, 75.0);
        assert!(within(result.total_daily_dose, 56.25, 0.02));
        assert_eq!(result.divided_doses, vec![14.06; 4]);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::FentanylPatchOnset));
    }

    #[test]
    fn test_morphine_to_patch() {
        let inputs = vec![OpioidInput::symmetric("morphine", "oral", 30.0, 4)];
        let result = compute_target_regimen(&inputs, "fentanyl", "patch", 3, 25.0, None).unwrap();

        assert_eq!(result.frequency, 1);
        assert_eq!(result.total_daily_dose, 90.0);
        assert_eq!(result.breakthrough_dose, Some(15.0));

        let suggestion = result.patch_suggestion.unwrap();
        assert_eq!(suggestion.target_mcg_per_hr, 31);
        assert_eq!(suggestion.combination.total_mcg_per_hr, 37);
        assert!(suggestion.combination.includes_strength(12));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::SingleBrandPatchStrength));
        assert_eq!(result.breakthrough_tablets, vec![TabletCount { mg: 10.0, count: 1 }]);
    }

    #[test]
    fn test_methadone_target_has_no_breakthrough() {
        let inputs = vec![OpioidInput::symmetric("morphine", "oral", 30.0, 4)];
        let result = compute_target_regimen(&inputs, "methadone", "oral", 3, 0.0, None).unwrap();

        // 120 OME sits in the 1:6 tier
        assert_eq!(result.total_daily_dose, 20.0);
        assert!(result.breakthrough_dose.is_none());
        assert_eq!(result.warnings[0].code, WarningCode::Methadone);
    }

    #[test]
    fn test_renal_warnings_order_and_dedup() {
        let inputs = vec![
            OpioidInput::symmetric("morphine", "oral", 10.0, 4),
            OpioidInput::symmetric("codeine", "oral", 30.0, 4),
        ];
        let result = compute_target_regimen(&inputs, "morphine", "oral", 4, 50.0, Some(8.0)).unwrap();

        let codes: Vec<WarningCode> = result.warnings.iter().map(|w| w.code).collect();
        assert_eq!(codes[0], WarningCode::RenalBelow30);
        assert_eq!(codes[1], WarningCode::RenalBelow10);

        let messages = result.warning_messages();
        let morphine_avoid = messages
            .iter()
            .filter(|m| m.contains("AVOID morphine"))
            .count();
        assert_eq!(morphine_avoid, 1);
        assert!(messages.iter().any(|m| m.contains("codeine")));
        assert!(messages.iter().any(|m| m.contains("GFR < 30")));
    }

    #[test]
    fn test_renal_floor_option() {
        let inputs = vec![OpioidInput::symmetric("oxycodone", "oral", 20.0, 2)];
        let options = RegimenOptions {
            enforce_renal_reduction_floor: true,
            ..Default::default()
        };

        let result = compute_target_regimen_with(
            &inputs, "hydromorphone", "oral", 2, 10.0, Some(25.0), &options,
        )
        .unwrap();
        assert_eq!(result.applied_reduction_pct, 25.0);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::RenalReductionFloor));

        // Off by default
        let result =
            compute_target_regimen(&inputs, "hydromorphone", "oral", 2, 10.0, Some(25.0)).unwrap();
        assert_eq!(result.applied_reduction_pct, 10.0);
    }

    #[test]
    fn test_dose_limit_warnings() {
        let inputs = vec![OpioidInput::symmetric("morphine", "oral", 30.0, 2)];
        let result = compute_target_regimen(&inputs, "tramadol", "oral", 4, 0.0, None).unwrap();
        assert_eq!(result.total_daily_dose, 600.0);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::TramadolCeiling && w.limit == Some(400.0)));

        let inputs = vec![OpioidInput::symmetric("morphine", "oral", 10.0, 2)];
        let result = compute_target_regimen(&inputs, "oxycodone", "oral", 2, 25.0, None).unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::BelowMinimumDose));
    }

    #[test]
    fn test_unsuitable_target_rejected() {
        let inputs = vec![OpioidInput::symmetric("morphine", "oral", 10.0, 4)];
        for target in ["nalbuphine", "Pethidine"] {
            let err = compute_target_regimen(&inputs, target, "sc/iv", 4, 25.0, None).unwrap_err();
            assert!(matches!(err, ConversionError::InvalidUse(_)), "{}", target);
        }
    }

    #[test]
    fn test_fail_fast() {
        let inputs = vec![
            OpioidInput::symmetric("morphine", "oral", 10.0, 4),
            OpioidInput::symmetric("aspirin", "oral", 500.0, 3),
        ];
        assert!(matches!(
            compute_target_regimen(&inputs, "oxycodone", "oral", 2, 25.0, None),
            Err(ConversionError::NotFound { .. })
        ));

        let inputs = vec![OpioidInput::symmetric("morphine", "oral", 10.0, 4)];
        assert!(matches!(
            compute_target_regimen(&inputs, "oxycodone", "oral", 0, 25.0, None),
            Err(ConversionError::InvalidArgument(_))
        ));
        assert!(matches!(
            compute_target_regimen(&inputs, "oxycodone", "oral", 2, 120.0, None),
            Err(ConversionError::InvalidArgument(_))
        ));
        assert!(matches!(
            compute_target_regimen(&inputs, "oxycodone", "oral", 2, 25.0, Some(-1.0)),
            Err(ConversionError::InvalidArgument(_))
        ));
        assert!(matches!(
            compute_target_regimen(&[], "oxycodone", "oral", 2, 25.0, None),
            Err(ConversionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_practical_schedule() {
        let inputs = vec![OpioidInput::symmetric("morphine", "oral", 15.0, 4)];
        let result = compute_target_regimen(&inputs, "oxycodone", "oral", 2, 25.0, None).unwrap();

        assert_eq!(result.practical_schedule.len(), 2);
        let total = result.practical_total().unwrap();
        assert!(within(total, 30.0, 0.15));

        let options = RegimenOptions {
            practical_rounding: false,
            ..Default::default()
        };
        let result = compute_target_regimen_with(&inputs, "oxycodone", "oral", 2, 25.0, None, &options)
            .unwrap();
        assert!(result.practical_schedule.is_empty());
    }

    #[test]
    fn test_single_brand_note_only_with_lowest_strength() {
        // 180 OME → 67 mcg/hr → 50 + 12, remainder 5 dropped
        let inputs = vec![OpioidInput::symmetric("morphine", "oral", 45.0, 4)];
        let result = compute_target_regimen(&inputs, "fentanyl", "patch", 1, 0.0, None).unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::SingleBrandPatchStrength));

        // 270 OME → 100 mcg/hr exactly
        let inputs = vec![OpioidInput::symmetric("morphine", "oral", 67.5, 4)];
        let result = compute_target_regimen(&inputs, "fentanyl", "patch", 1, 0.0, None).unwrap();
        assert_eq!(result.patch_suggestion.unwrap().combination.total_mcg_per_hr, 100);
        assert!(result
            .warnings
            .iter()
            .all(|w| w.code != WarningCode::SingleBrandPatchStrength));
    }

    #[test]
    fn test_small_patch_breakthrough_has_no_tablets() {
        // 20 OME → rescue 3.33 mg morphine; one 10 mg tablet would triple it
        let inputs = vec![OpioidInput::symmetric("morphine", "oral", 5.0, 4)];
        let result = compute_target_regimen(&inputs, "fentanyl", "patch", 1, 0.0, None).unwrap();

        assert_eq!(result.breakthrough_dose, Some(3.33));
        assert!(result.breakthrough_tablets.is_empty());
    }

    #[test]
    fn test_breakthrough_tablet_within_round_up_limit() {
        assert_eq!(
            breakthrough_tablets(9.0, &[10.0]),
            vec![TabletCount { mg: 10.0, count: 1 }]
        );
        assert!(breakthrough_tablets(8.0, &[10.0]).is_empty());
        assert!(breakthrough_tablets(0.0, &[10.0]).is_empty());
    }

    #[test]
    fn test_dose_below_smallest_tablet_has_no_schedule() {
        // 10 OME → 2 mg hydromorphone, 1 mg per dose against 4 mg tablets
        let inputs = vec![OpioidInput::symmetric("morphine", "oral", 5.0, 2)];
        let result =
            compute_target_regimen(&inputs, "hydromorphone", "oral", 2, 0.0, None).unwrap();

        assert!(result.total_daily_dose > 0.0);
        assert!(result.practical_schedule.is_empty());
        assert!(result.practical_total().is_none());
    }

    #[test]
    fn test_huge_dose_to_patch_is_out_of_range() {
        let inputs = vec![OpioidInput::symmetric("morphine", "oral", 1e12, 4)];
        assert!(matches!(
            compute_target_regimen(&inputs, "fentanyl", "patch", 1, 0.0, None),
            Err(ConversionError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_full_reduction_has_no_escalation_note() {
        let inputs = vec![OpioidInput::symmetric("morphine", "oral", 15.0, 4)];
        let result = compute_target_regimen(&inputs, "oxycodone", "oral", 2, 100.0, None).unwrap();

        assert_eq!(result.breakthrough_dose, Some(0.0));
        assert!(result
            .warnings
            .iter()
            .all(|w| w.code != WarningCode::BreakthroughEscalation));

        let result = compute_target_regimen(&inputs, "oxycodone", "oral", 2, 25.0, None).unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::BreakthroughEscalation));
    }

    #[test]
    fn test_request_compute() {
        let request = RegimenRequest {
            inputs: vec![OpioidInput::symmetric("morphine", "oral", 15.0, 4)],
            target_drug: "Oxycodone".into(),
            target_route: "ORAL".into(),
            target_frequency: 2,
            reduction_pct: 25.0,
            gfr: None,
        };
        let result = request.compute().unwrap();
        assert_eq!(result.drug, "oxycodone");
        assert_eq!(result.route, "oral");
    }
}
