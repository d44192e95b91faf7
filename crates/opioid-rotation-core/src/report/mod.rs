//! Audit export of regimen calculations.

mod calculation;

pub use calculation::*;

use thiserror::Error;

use crate::convert::ConversionError;

/// Report errors.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Calculation failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;
