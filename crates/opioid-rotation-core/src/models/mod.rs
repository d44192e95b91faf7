//! Domain models for the opioid rotation core.

mod conversion;
mod patch;
mod regimen;
mod warning;

pub use conversion::*;
pub use patch::*;
pub use regimen::*;
pub use warning::*;
