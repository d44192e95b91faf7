//! Dose arithmetic: daily totals, division into administrations, reduction.

mod tablets;

pub use tablets::*;

use crate::convert::{ConversionError, ConversionResult};
use crate::models::OpioidInput;

/// Minimum reduction when GFR is below 30 ml/min (percent).
pub const RENAL_REDUCTION_FLOOR_PCT: f64 = 25.0;

/// Minimum reduction when GFR is below 10 ml/min (percent).
pub const SEVERE_RENAL_REDUCTION_FLOOR_PCT: f64 = 50.0;

/// Total daily dose of one input.
///
/// Asymmetrical inputs sum their doses; symmetrical inputs multiply the
/// single dose by the frequency. No doses means zero.
pub fn total_daily_dose(input: &OpioidInput) -> f64 {
    if input.asymmetrical {
        return input.doses.iter().fold(0.0, |acc, d| acc + d);
    }
    match input.doses.first() {
        Some(dose) => dose * f64::from(input.frequency),
        None => 0.0,
    }
}

/// Reject negative or non-finite doses.
pub fn validate_doses(input: &OpioidInput) -> ConversionResult<()> {
    match input.doses.iter().find(|d| !d.is_finite() || **d < 0.0) {
        Some(bad) => Err(ConversionError::InvalidArgument(format!(
            "dose {} for {} ({}) must be a non-negative number",
            bad, input.drug, input.route
        ))),
        None => Ok(()),
    }
}

/// Sum per-input OME values.
pub fn sum_omes(omes: &[f64]) -> f64 {
    omes.iter().fold(0.0, |acc, ome| acc + ome)
}

/// Apply the cross-tolerance reduction (0-100 percent).
pub fn apply_reduction(ome: f64, reduction_pct: f64) -> ConversionResult<f64> {
    if !(0.0..=100.0).contains(&reduction_pct) {
        return Err(ConversionError::InvalidArgument(
            "Reduction percentage must be between 0 and 100".into(),
        ));
    }
    Ok(ome * (1.0 - reduction_pct / 100.0))
}

/// Split a daily dose into equal administrations.
///
/// Each administration is rounded to 2 decimals on its own; the rounded
/// parts may not add back up to `tdd` exactly.
pub fn divide_daily_dose(tdd: f64, frequency: u32) -> ConversionResult<Vec<f64>> {
    if frequency == 0 {
        return Err(ConversionError::InvalidArgument(
            "Frequency must be positive".into(),
        ));
    }
    let single = round2(tdd / f64::from(frequency));
    Ok(vec![single; frequency as usize])
}

/// Minimum reduction implied by renal function (percent).
pub fn renal_reduction_floor(gfr: Option<f64>) -> f64 {
    match gfr {
        Some(g) if g < 10.0 => SEVERE_RENAL_REDUCTION_FLOOR_PCT,
        Some(g) if g < 30.0 => RENAL_REDUCTION_FLOOR_PCT,
        _ => 0.0,
    }
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
