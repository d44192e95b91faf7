//! Calculation report with request digest.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::RegimenOptions;
use crate::models::TargetResult;
use crate::pipeline::RegimenRequest;

use super::ReportResult;

/// Report format version.
pub const REPORT_FORMAT_VERSION: &str = "1.0";

/// Full record of one regimen calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationReport {
    /// Report metadata
    pub metadata: ReportMetadata,
    /// The request as submitted
    pub request: RegimenRequest,
    /// Options the pipeline ran with
    pub options: RegimenOptions,
    /// The computed regimen
    pub result: TargetResult,
}

/// Calculation report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Report format version
    pub format_version: String,
    /// Unique report identifier
    pub report_id: String,
    /// Generation timestamp
    pub generated_at: String,
    /// Hash algorithm used
    pub hash_algorithm: String,
    /// Hex digest of the serialized request
    pub request_digest: String,
    /// Generating system identifier
    pub system_id: Option<String>,
}

impl CalculationReport {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check that the recorded digest still matches the request.
    pub fn verify_digest(&self) -> ReportResult<bool> {
        Ok(request_digest(&self.request)? == self.metadata.request_digest)
    }
}

/// SHA-256 of the compact JSON form of a request, hex encoded.
pub fn request_digest(request: &RegimenRequest) -> ReportResult<String> {
    let json = serde_json::to_string(request)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Builds calculation reports.
#[derive(Debug, Clone, Default)]
pub struct CalculationReporter {
    system_id: Option<String>,
}

impl CalculationReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the system identifier for reports.
    pub fn with_system_id(mut self, system_id: String) -> Self {
        self.system_id = Some(system_id);
        self
    }

    /// Run the pipeline and wrap the result in a report.
    pub fn report(
        &self,
        request: &RegimenRequest,
        options: &RegimenOptions,
    ) -> ReportResult<CalculationReport> {
        let result = request.compute_with(options)?;
        let request_digest = request_digest(request)?;

        Ok(CalculationReport {
            metadata: ReportMetadata {
                format_version: REPORT_FORMAT_VERSION.to_string(),
                report_id: Uuid::new_v4().to_string(),
                generated_at: chrono::Utc::now().to_rfc3339(),
                hash_algorithm: "SHA-256".to_string(),
                request_digest,
                system_id: self.system_id.clone(),
            },
            request: request.clone(),
            options: *options,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OpioidInput;
    use crate::report::ReportError;

    fn make_request() -> RegimenRequest {
        RegimenRequest {
            inputs: vec![OpioidInput::symmetric("morphine", "oral", 15.0, 4)],
            target_drug: "oxycodone".to_string(),
            target_route: "oral".to_string(),
            target_frequency: 2,
            reduction_pct: 25.0,
            gfr: Some(45.0),
        }
    }

    #[test]
    fn test_report_metadata() {
        let reporter = CalculationReporter::new().with_system_id("ward-7".into());
        let report = reporter
            .report(&make_request(), &RegimenOptions::default())
            .unwrap();

        assert_eq!(report.metadata.format_version, "1.0");
        assert_eq!(report.metadata.hash_algorithm, "SHA-256");
        assert_eq!(report.metadata.system_id, Some("ward-7".into()));
        assert_eq!(report.metadata.request_digest.len(), 64);
        assert!(Uuid::parse_str(&report.metadata.report_id).is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&report.metadata.generated_at).is_ok());
        assert_eq!(report.result.drug, "oxycodone");
    }

    #[test]
    fn test_digest_detects_tampering() {
        let mut report = CalculationReporter::new()
            .report(&make_request(), &RegimenOptions::default())
            .unwrap();
        assert!(report.verify_digest().unwrap());

        report.request.reduction_pct = 0.0;
        assert!(!report.verify_digest().unwrap());
    }

    #[test]
    fn test_digest_is_deterministic() {
        let a = request_digest(&make_request()).unwrap();
        let b = request_digest(&make_request()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_json_roundtrip() {
        let report = CalculationReporter::new()
            .report(&make_request(), &RegimenOptions::default())
            .unwrap();
        let json = report.to_json().unwrap();

        let parsed: CalculationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.metadata.report_id, report.metadata.report_id);
        assert!(parsed.verify_digest().unwrap());
    }

    #[test]
    fn test_failed_calculation() {
        let mut request = make_request();
        request.target_drug = "aspirin".into();

        let err = CalculationReporter::new()
            .report(&request, &RegimenOptions::default())
            .unwrap_err();
        assert!(matches!(err, ReportError::Conversion(_)));
    }
}
