//! Drug ↔ OME conversion.
//!
//! Two tables back the conversions: a linear factor table covering every
//! (drug, route) pair, and a nonlinear breakpoint table for transdermal
//! fentanyl. [`SourceConversion`] and [`TargetConversion`] pick the right
//! one once per drug so callers never branch on drug names themselves.

mod combination;
mod methadone;
mod patch;
mod table;

pub use combination::*;
pub use methadone::*;
pub use patch::*;
pub use table::*;

use thiserror::Error;

use crate::models::{ConversionEntry, OpioidInput};

/// Conversion errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("No conversion entry for {drug} ({route})")]
    NotFound {
        drug: String,
        route: String,
        /// Closest known drug name, when the name itself looks misspelled
        suggestion: Option<String>,
    },

    #[error("Invalid use: {0}")]
    InvalidUse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),
}

pub type ConversionResult<T> = Result<T, ConversionError>;

/// How a current medication is converted to OME.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceConversion {
    /// Linear factor from the conversion table
    Linear(&'static ConversionEntry),
    /// Nonlinear fentanyl patch interpolation
    Patch,
}

impl SourceConversion {
    /// Resolve the strategy for a (drug, route) pair.
    pub fn resolve(drug: &str, route: &str) -> ConversionResult<Self> {
        if is_fentanyl_patch(drug, route) {
            return Ok(Self::Patch);
        }
        lookup(drug, route).map(Self::Linear)
    }

    /// Convert an input's daily amount to OME (mg/day).
    pub fn to_ome(&self, input: &OpioidInput) -> ConversionResult<f64> {
        match self {
            Self::Linear(entry) => {
                Ok(crate::dose::total_daily_dose(input) * entry.factor_to_ome)
            }
            Self::Patch => fentanyl_patch_to_ome(patch_rate(input)),
        }
    }
}

/// How the reduced OME is converted to the target drug.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetConversion {
    /// Linear factor from the conversion table
    Linear(&'static ConversionEntry),
    /// Reduced OME reported directly; physical patches suggested separately
    Patch,
    /// Ripamonti tiers for oral methadone
    Methadone,
}

impl TargetConversion {
    /// Resolve the strategy for a target (drug, route) pair.
    pub fn resolve(drug: &str, route: &str) -> ConversionResult<Self> {
        if is_fentanyl_patch(drug, route) {
            return Ok(Self::Patch);
        }
        if is_oral_methadone(drug, route) {
            return Ok(Self::Methadone);
        }
        lookup(drug, route).map(Self::Linear)
    }
}

/// Patch delivery rate of an input (mcg/hr).
///
/// Symmetrical inputs carry one patch strength. Asymmetrical inputs list
/// several patches worn at the same time, so their rates add up.
pub fn patch_rate(input: &OpioidInput) -> f64 {
    if input.asymmetrical {
        input.doses.iter().fold(0.0, |acc, d| acc + d)
    } else {
        input.doses.first().copied().unwrap_or(0.0)
    }
}
