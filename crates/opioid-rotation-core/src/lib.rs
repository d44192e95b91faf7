//! Opioid Rotation Core Library
//!
//! Oral morphine equivalent (OME) conversion for clinical opioid rotation.
//!
//! # Architecture
//!
//! ```text
//! Raw entries → Normalization → OpioidInput[]
//!                                     │
//!                     ┌───────────────┴───────────────┐
//!                     ▼                               ▼
//!              Linear factor table          Fentanyl patch table
//!               (drug, route) → OME         (mcg/hr ↔ OME, interpolated)
//!                     └───────────────┬───────────────┘
//!                                     │
//!                              Σ OME − reduction
//!                                     │
//!                 ┌───────────────────┼───────────────────┐
//!                 ▼                   ▼                   ▼
//!           Linear target       Patch target       Methadone target
//!           TDD ÷ frequency     rate + patches     Ripamonti tiers
//!                 └───────────────────┼───────────────────┘
//!                                     │
//!                    Warnings (renal, drug, route, dose limits)
//!                                     │
//!                                TargetResult
//! ```
//!
//! # Core Principle
//!
//! **Fail fast.** Any unknown drug/route or invalid argument aborts the whole
//! calculation; no partial dose is ever returned.
//!
//! # Modules
//!
//! - [`models`]: Domain types (OpioidInput, TargetResult, Warning, etc.)
//! - [`convert`]: Conversion table, patch interpolation and combination
//! - [`dose`]: Dose arithmetic and tablet rounding
//! - [`warnings`]: Renal and drug-specific warning rules
//! - [`formulary`]: Brands, tablet strengths and dose limits
//! - [`normalizer`]: Free-text drug, route and unit normalization
//! - [`pipeline`]: End-to-end regimen computation
//! - [`report`]: Audit-ready calculation reports
//! - [`config`]: Pipeline options

pub mod config;
pub mod convert;
pub mod dose;
pub mod formulary;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod report;
pub mod warnings;

// Re-export commonly used types
pub use config::RegimenOptions;
pub use convert::{
    combine_patch_sizes, drug_dose_to_ome, fentanyl_patch_to_ome, ome_to_drug_dose,
    ome_to_target_rate, ConversionError, ConversionResult,
};
pub use dose::{apply_reduction, divide_daily_dose, sum_omes, total_daily_dose};
pub use models::{
    OpioidInput, PatchCombination, PatchSuggestion, Severity, TargetResult, Warning,
    WarningCode,
};
pub use normalizer::{Normalizer, RawRegimenEntry};
pub use pipeline::{compute_target_regimen, compute_target_regimen_with, RegimenRequest};
pub use report::{CalculationReport, CalculationReporter};
pub use warnings::{drug_warnings, gfr_warnings};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum RotationError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid use: {0}")]
    InvalidUse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<ConversionError> for RotationError {
    fn from(e: ConversionError) -> Self {
        match e {
            ConversionError::NotFound {
                ref suggestion, ..
            } => match suggestion {
                Some(s) => RotationError::NotFound(format!("{}; did you mean {}?", e, s)),
                None => RotationError::NotFound(e.to_string()),
            },
            ConversionError::InvalidUse(msg) => RotationError::InvalidUse(msg),
            ConversionError::InvalidArgument(msg) => RotationError::InvalidArgument(msg),
            ConversionError::InvalidRange(msg) => RotationError::InvalidRange(msg),
        }
    }
}

impl From<report::ReportError> for RotationError {
    fn from(e: report::ReportError) -> Self {
        match e {
            report::ReportError::Conversion(e) => e.into(),
            report::ReportError::Json(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for RotationError {
    fn from(e: serde_json::Error) -> Self {
        RotationError::SerializationError(e.to_string())
    }
}

impl From<anyhow::Error> for RotationError {
    fn from(e: anyhow::Error) -> Self {
        RotationError::ConfigError(format!("{:#}", e))
    }
}

// =========================================================================
// Functions (exported to FFI)
// =========================================================================

/// Compute a target regimen with default options.
#[uniffi::export]
pub fn compute_regimen(
    inputs: Vec<FfiOpioidInput>,
    target_drug: String,
    target_route: String,
    target_frequency: u32,
    reduction_pct: f64,
    gfr: Option<f64>,
) -> Result<FfiTargetResult, RotationError> {
    let inputs: Vec<OpioidInput> = inputs.into_iter().map(|i| i.into()).collect();
    let result = compute_target_regimen(
        &inputs,
        &target_drug,
        &target_route,
        target_frequency,
        reduction_pct,
        gfr,
    )?;
    Ok(result.into())
}

/// OME (mg/day) delivered by a fentanyl patch rate.
#[uniffi::export]
pub fn fentanyl_patch_ome(mcg_per_hr: f64) -> Result<f64, RotationError> {
    Ok(fentanyl_patch_to_ome(mcg_per_hr)?)
}

/// Patch rate and physical patches for an OME.
#[uniffi::export]
pub fn patch_suggestion_for_ome(ome: f64) -> Result<FfiPatchSuggestion, RotationError> {
    let rate = ome_to_target_rate(ome)?;
    Ok(PatchSuggestion {
        target_mcg_per_hr: rate,
        combination: combine_patch_sizes(rate),
    }
    .into())
}

/// Resolve a brand name or spelling variant to a drug id.
#[uniffi::export]
pub fn normalize_drug_name(name: String) -> String {
    normalizer::shared().expand_alias(&name)
}

/// Closest known drug id for a possibly misspelled name.
#[uniffi::export]
pub fn suggest_drug_name(name: String) -> Option<String> {
    normalizer::shared().closest_drug(&name)
}

/// Create a calculator, optionally configured from a JSON options object.
#[uniffi::export]
pub fn create_calculator(
    options_json: Option<String>,
    system_id: Option<String>,
) -> Result<Arc<RotationCalculator>, RotationError> {
    let options = match options_json {
        Some(json) => RegimenOptions::from_json_str(&json)?,
        None => RegimenOptions::default(),
    };
    Ok(Arc::new(RotationCalculator { options, system_id }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Configured regimen calculator for FFI.
#[derive(uniffi::Object)]
pub struct RotationCalculator {
    options: RegimenOptions,
    system_id: Option<String>,
}

#[uniffi::export]
impl RotationCalculator {
    /// Compute a target regimen.
    pub fn compute(&self, request: FfiRegimenRequest) -> Result<FfiTargetResult, RotationError> {
        let request: RegimenRequest = request.into();
        Ok(request.compute_with(&self.options)?.into())
    }

    /// Compute and export an audit report as JSON.
    pub fn report_json(&self, request: FfiRegimenRequest) -> Result<String, RotationError> {
        let mut reporter = CalculationReporter::new();
        if let Some(id) = &self.system_id {
            reporter = reporter.with_system_id(id.clone());
        }
        let report = reporter.report(&request.into(), &self.options)?;
        Ok(report.to_json()?)
    }

    /// Options as JSON.
    pub fn options_json(&self) -> Result<String, RotationError> {
        Ok(self.options.to_json()?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe opioid input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiOpioidInput {
    pub drug: String,
    pub route: String,
    pub doses: Vec<f64>,
    pub frequency: u32,
    pub asymmetrical: bool,
}

impl From<FfiOpioidInput> for OpioidInput {
    fn from(input: FfiOpioidInput) -> Self {
        OpioidInput {
            drug: input.drug,
            route: input.route,
            doses: input.doses,
            frequency: input.frequency,
            asymmetrical: input.asymmetrical,
        }
    }
}

/// FFI-safe regimen request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRegimenRequest {
    pub inputs: Vec<FfiOpioidInput>,
    pub target_drug: String,
    pub target_route: String,
    pub target_frequency: u32,
    pub reduction_pct: f64,
    pub gfr: Option<f64>,
}

impl From<FfiRegimenRequest> for RegimenRequest {
    fn from(request: FfiRegimenRequest) -> Self {
        RegimenRequest {
            inputs: request.inputs.into_iter().map(|i| i.into()).collect(),
            target_drug: request.target_drug,
            target_route: request.target_route,
            target_frequency: request.target_frequency,
            reduction_pct: request.reduction_pct,
            gfr: request.gfr,
        }
    }
}

/// FFI-safe warning.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiWarning {
    pub code: String,
    pub severity: String,
    pub message: String,
}

impl From<&Warning> for FfiWarning {
    fn from(warning: &Warning) -> Self {
        Self {
            code: warning.code.key().to_string(),
            severity: format!("{:?}", warning.severity()).to_lowercase(),
            message: warning.message(),
        }
    }
}

/// FFI-safe patch count.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatchCount {
    pub mcg_per_hr: u32,
    pub count: u32,
}

/// FFI-safe patch suggestion.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatchSuggestion {
    pub target_mcg_per_hr: u32,
    pub total_mcg_per_hr: u32,
    pub patches: Vec<FfiPatchCount>,
}

impl From<PatchSuggestion> for FfiPatchSuggestion {
    fn from(suggestion: PatchSuggestion) -> Self {
        Self {
            target_mcg_per_hr: suggestion.target_mcg_per_hr,
            total_mcg_per_hr: suggestion.combination.total_mcg_per_hr,
            patches: suggestion
                .combination
                .patches
                .into_iter()
                .map(|p| FfiPatchCount {
                    mcg_per_hr: p.mcg_per_hr,
                    count: p.count,
                })
                .collect(),
        }
    }
}

/// FFI-safe target result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTargetResult {
    pub drug: String,
    pub route: String,
    pub total_daily_dose: f64,
    pub divided_doses: Vec<f64>,
    pub frequency: u32,
    pub breakthrough_dose: Option<f64>,
    pub warnings: Vec<FfiWarning>,
    pub total_ome: f64,
    pub reduced_ome: f64,
    pub applied_reduction_pct: f64,
    pub patch_suggestion: Option<FfiPatchSuggestion>,
    /// Tablet-rounded dose per administration (mg)
    pub practical_doses: Vec<f64>,
}

impl From<TargetResult> for FfiTargetResult {
    fn from(result: TargetResult) -> Self {
        Self {
            warnings: result.warnings.iter().map(FfiWarning::from).collect(),
            practical_doses: result.practical_schedule.iter().map(|d| d.total_mg).collect(),
            drug: result.drug,
            route: result.route,
            total_daily_dose: result.total_daily_dose,
            divided_doses: result.divided_doses,
            frequency: result.frequency,
            breakthrough_dose: result.breakthrough_dose,
            total_ome: result.total_ome,
            reduced_ome: result.reduced_ome,
            applied_reduction_pct: result.applied_reduction_pct,
            patch_suggestion: result.patch_suggestion.map(|s| s.into()),
        }
    }
}
