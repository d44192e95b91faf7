//! Greedy fentanyl patch combination.
//!
//! This is a heuristic, not a minimal-count solver: it fills the target from
//! the largest strength down and may use more patches than an exact search
//! would. It lives behind a pure function so an exact bounded search over
//! the five strengths can replace it without touching the pipeline.

use crate::models::{PatchCombination, PatchCount};

use super::AVAILABLE_PATCH_SIZES;

/// Combine standard patch sizes to approximate a target rate (mcg/hr).
pub fn combine_patch_sizes(target_mcg_per_hr: u32) -> PatchCombination {
    combine_with_sizes(target_mcg_per_hr, &AVAILABLE_PATCH_SIZES)
}

/// Greedy combination over an arbitrary set of sizes.
///
/// A remainder of at least half the smallest size adds one more smallest
/// patch (overshoot); anything below that is dropped (undershoot).
pub fn combine_with_sizes(target_mcg_per_hr: u32, sizes: &[u32]) -> PatchCombination {
    let mut sizes: Vec<u32> = sizes.iter().copied().filter(|s| *s > 0).collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    sizes.dedup();

    let Some(&smallest) = sizes.last() else {
        return PatchCombination::default();
    };

    let mut patches: Vec<PatchCount> = Vec::new();
    let mut remaining = target_mcg_per_hr;

    for &size in &sizes {
        if remaining >= size {
            let count = remaining / size;
            patches.push(PatchCount {
                mcg_per_hr: size,
                count,
            });
            remaining -= count * size;
        }
    }

    if remaining > 0 && f64::from(remaining) >= f64::from(smallest) / 2.0 {
        match patches.iter_mut().find(|p| p.mcg_per_hr == smallest) {
            Some(existing) => existing.count += 1,
            None => patches.push(PatchCount {
                mcg_per_hr: smallest,
                count: 1,
            }),
        }
    }

    PatchCombination::new(patches)
}
