//! Rounding a daily dose to available tablet strengths.
//!
//! Rules:
//! - try an equal split first, rounding each administration down
//! - round up only if down is off by more than 10% and up stays within 15%
//! - otherwise mix rounded-up and rounded-down administrations

use crate::models::{DoseDistribution, TabletCount};

/// Acceptable error of an equal split.
const SYMMETRIC_TOLERANCE: f64 = 0.10;

/// Maximum overshoot of the daily total.
pub const MAX_ROUND_UP: f64 = 0.15;

const EPSILON: f64 = 1e-9;

/// Greedy tablet combination for one dose, largest first, rounding down.
pub fn round_to_tablets(target_mg: f64, sizes: &[f64]) -> Vec<TabletCount> {
    if sizes.is_empty() || target_mg <= 0.0 {
        return Vec::new();
    }

    let mut sorted: Vec<f64> = sizes.iter().copied().filter(|s| *s > 0.0).collect();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let mut result = Vec::new();
    let mut remaining = target_mg;

    for size in sorted {
        if remaining + EPSILON >= size {
            let count = ((remaining + EPSILON) / size).floor() as u32;
            result.push(TabletCount { mg: size, count });
            remaining -= f64::from(count) * size;
        }
    }

    result
}

/// Round a dose up to the next achievable tablet total.
fn round_to_tablets_up(target_mg: f64, sizes: &[f64]) -> Vec<TabletCount> {
    let Some(smallest) = sizes
        .iter()
        .copied()
        .filter(|s| *s > 0.0)
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    else {
        return Vec::new();
    };
    if target_mg <= 0.0 {
        return Vec::new();
    }

    let down = round_to_tablets(target_mg, sizes);
    let total_down = tablet_total(&down);
    if (total_down - target_mg).abs() < 0.001 {
        return down;
    }
    round_to_tablets(total_down + smallest, sizes)
}

/// Total mg of a tablet combination.
pub fn tablet_total(tablets: &[TabletCount]) -> f64 {
    tablets
        .iter()
        .fold(0.0, |acc, t| acc + t.mg * f64::from(t.count))
}

/// Distribute a daily dose over `frequency` administrations of whole tablets.
///
/// Empty when any administration would get no tablet at all.
pub fn distribute_to_tablets(target_tdd: f64, frequency: u32, sizes: &[f64]) -> Vec<DoseDistribution> {
    let schedule = split_into_tablets(target_tdd, frequency, sizes);
    if schedule.iter().any(|d| d.tablets.is_empty()) {
        return Vec::new();
    }
    schedule
}

fn split_into_tablets(target_tdd: f64, frequency: u32, sizes: &[f64]) -> Vec<DoseDistribution> {
    if sizes.is_empty() || target_tdd <= 0.0 || frequency == 0 {
        return Vec::new();
    }

    let n = f64::from(frequency);
    let ideal = target_tdd / n;

    let tablets_down = round_to_tablets(ideal, sizes);
    let tablets_up = round_to_tablets_up(ideal, sizes);
    let dose_down = tablet_total(&tablets_down);
    let dose_up = tablet_total(&tablets_up);

    let down_error = (dose_down * n - target_tdd).abs() / target_tdd;
    let up_error = (dose_up * n - target_tdd).abs() / target_tdd;
    let up_delta = (dose_up * n - target_tdd) / target_tdd;

    if down_error <= SYMMETRIC_TOLERANCE {
        return symmetric(&tablets_down, dose_down, frequency);
    }
    if up_delta <= MAX_ROUND_UP && up_error <= SYMMETRIC_TOLERANCE {
        return symmetric(&tablets_up, dose_up, frequency);
    }
    if (dose_up - dose_down).abs() < EPSILON {
        return symmetric(&tablets_down, dose_down, frequency);
    }

    // num_up * dose_up + (n - num_up) * dose_down ≈ target
    let raw_up = (target_tdd - n * dose_down) / (dose_up - dose_down);
    let mut num_up = raw_up.round().clamp(0.0, n) as u32;

    let total = f64::from(num_up) * dose_up + f64::from(frequency - num_up) * dose_down;
    if (total - target_tdd) / target_tdd > MAX_ROUND_UP {
        num_up = num_up.saturating_sub(1);
    }

    let up = DoseDistribution {
        total_mg: dose_up,
        tablets: tablets_up,
    };
    let down = DoseDistribution {
        total_mg: dose_down,
        tablets: tablets_down,
    };

    // Twice daily with one larger dose: the larger one goes in the evening.
    if frequency == 2 && num_up == 1 {
        return vec![down, up];
    }

    let mut schedule = Vec::with_capacity(frequency as usize);
    schedule.extend(std::iter::repeat(up).take(num_up as usize));
    schedule.extend(std::iter::repeat(down).take((frequency - num_up) as usize));
    schedule
}

fn symmetric(tablets: &[TabletCount], per_dose: f64, frequency: u32) -> Vec<DoseDistribution> {
    vec![
        DoseDistribution {
            total_mg: per_dose,
            tablets: tablets.to_vec(),
        };
        frequency as usize
    ]
}
