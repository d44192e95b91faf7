//! Fentanyl transdermal patch table and interpolation.
//!
//! Patch strength does not map linearly to OME, so conversions go through
//! a breakpoint table. Both directions use the row midpoints:
//!
//! - below the first row: linear from the origin
//! - between two rows: linear interpolation
//! - above the last row: extrapolation along the last segment

use crate::models::FentanylPatchEntry;

use super::{ConversionError, ConversionResult};

/// Standard patch strengths (mcg/hr).
pub const AVAILABLE_PATCH_SIZES: [u32; 5] = [12, 25, 50, 75, 100];

/// Strength sold under one brand only.
pub const SINGLE_BRAND_PATCH_SIZE: u32 = 12;

/// The brand carrying [`SINGLE_BRAND_PATCH_SIZE`].
pub const SINGLE_BRAND_PATCH_NAME: &str = "Matrifen";

/// Observed OME ranges per patch strength.
pub static FENTANYL_PATCH_TABLE: &[FentanylPatchEntry] = &[
    FentanylPatchEntry {
        mcg_per_hr: 12,
        ome_low: 30.0,
        ome_high: 45.0,
    },
    FentanylPatchEntry {
        mcg_per_hr: 25,
        ome_low: 60.0,
        ome_high: 90.0,
    },
    FentanylPatchEntry {
        mcg_per_hr: 50,
        ome_low: 120.0,
        ome_high: 150.0,
    },
    FentanylPatchEntry {
        mcg_per_hr: 75,
        ome_low: 180.0,
        ome_high: 225.0,
    },
    FentanylPatchEntry {
        mcg_per_hr: 100,
        ome_low: 240.0,
        ome_high: 300.0,
    },
];

/// Convert a patch strength (mcg/hr) to OME (mg/day).
pub fn fentanyl_patch_to_ome(mcg_per_hr: f64) -> ConversionResult<f64> {
    interpolate_patch_ome(FENTANYL_PATCH_TABLE, mcg_per_hr)
}

/// Convert OME (mg/day) to the nearest whole patch delivery rate (mcg/hr).
pub fn ome_to_target_rate(ome: f64) -> ConversionResult<u32> {
    interpolate_patch_rate(FENTANYL_PATCH_TABLE, ome)
}

fn sorted(table: &[FentanylPatchEntry]) -> ConversionResult<Vec<FentanylPatchEntry>> {
    if table.is_empty() {
        return Err(ConversionError::InvalidRange(
            "fentanyl patch table is empty".into(),
        ));
    }
    let mut rows = table.to_vec();
    rows.sort_by_key(|e| e.mcg_per_hr);
    Ok(rows)
}

/// Forward lookup: patch strength → OME, against an arbitrary table.
pub fn interpolate_patch_ome(table: &[FentanylPatchEntry], mcg_per_hr: f64) -> ConversionResult<f64> {
    if !mcg_per_hr.is_finite() || mcg_per_hr < 0.0 {
        return Err(ConversionError::InvalidArgument(format!(
            "patch rate {} must be a non-negative number",
            mcg_per_hr
        )));
    }
    let rows = sorted(table)?;

    if let Some(exact) = rows.iter().find(|e| f64::from(e.mcg_per_hr) == mcg_per_hr) {
        return Ok(exact.midpoint());
    }

    let first = rows[0];
    let last = rows[rows.len() - 1];
    let first_rate = f64::from(first.mcg_per_hr);
    let last_rate = f64::from(last.mcg_per_hr);

    if mcg_per_hr < first_rate {
        if first.mcg_per_hr == 0 {
            return Err(ConversionError::InvalidRange(
                "lowest patch row has a zero rate".into(),
            ));
        }
        return Ok(first.midpoint() * mcg_per_hr / first_rate);
    }

    if mcg_per_hr > last_rate {
        let prev = previous_row(&rows)?;
        let prev_rate = f64::from(prev.mcg_per_hr);
        let slope = (last.midpoint() - prev.midpoint()) / (last_rate - prev_rate);
        return Ok(last.midpoint() + slope * (mcg_per_hr - last_rate));
    }

    for pair in rows.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        let (lo_rate, hi_rate) = (f64::from(lo.mcg_per_hr), f64::from(hi.mcg_per_hr));
        if lo_rate < mcg_per_hr && mcg_per_hr < hi_rate {
            let t = (mcg_per_hr - lo_rate) / (hi_rate - lo_rate);
            return Ok(lo.midpoint() + t * (hi.midpoint() - lo.midpoint()));
        }
    }

    Err(ConversionError::InvalidRange(format!(
        "could not convert fentanyl patch {} mcg/hr",
        mcg_per_hr
    )))
}

/// Reverse lookup: OME → patch strength, against an arbitrary table.
pub fn interpolate_patch_rate(table: &[FentanylPatchEntry], ome: f64) -> ConversionResult<u32> {
    if ome <= 0.0 {
        return Ok(0);
    }
    let rows = sorted(table)?;

    let first = rows[0];
    let last = rows[rows.len() - 1];
    let first_rate = f64::from(first.mcg_per_hr);
    let last_rate = f64::from(last.mcg_per_hr);

    let rate = if ome <= first.midpoint() {
        if first.midpoint() <= 0.0 {
            return Err(ConversionError::InvalidRange(
                "lowest patch row has a non-positive midpoint".into(),
            ));
        }
        ome / first.midpoint() * first_rate
    } else if ome >= last.midpoint() {
        let prev = previous_row(&rows)?;
        let prev_rate = f64::from(prev.mcg_per_hr);
        let slope = (last_rate - prev_rate) / (last.midpoint() - prev.midpoint());
        last_rate + slope * (ome - last.midpoint())
    } else {
        rows.windows(2)
            .find(|pair| pair[0].midpoint() <= ome && ome <= pair[1].midpoint())
            .map(|pair| {
                let (lo, hi) = (pair[0], pair[1]);
                let t = (ome - lo.midpoint()) / (hi.midpoint() - lo.midpoint());
                f64::from(lo.mcg_per_hr) + t * f64::from(hi.mcg_per_hr - lo.mcg_per_hr)
            })
            .ok_or_else(|| {
                ConversionError::InvalidRange(format!("could not invert OME {}", ome))
            })?
    };

    if !rate.is_finite() {
        return Err(ConversionError::InvalidRange(format!(
            "patch rate for OME {} is undefined",
            ome
        )));
    }
    let rate = rate.round();
    if rate > f64::from(u32::MAX) {
        return Err(ConversionError::InvalidRange(format!(
            "patch rate for OME {} exceeds {} mcg/hr",
            ome,
            u32::MAX
        )));
    }
    Ok(rate as u32)
}

fn previous_row(rows: &[FentanylPatchEntry]) -> ConversionResult<FentanylPatchEntry> {
    if rows.len() < 2 {
        return Err(ConversionError::InvalidRange(
            "extrapolation needs at least two patch rows".into(),
        ));
    }
    Ok(rows[rows.len() - 2])
}
