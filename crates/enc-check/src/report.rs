use enc_core::errors::EncError;
use enc_core::{stable_hash_string, to_canonical_json_bytes, ReportProvenance, SourceProvenance};
use serde::{Deserialize, Serialize};

use crate::compare::ComparisonReport;
use crate::policies::Policy;
use crate::validate::ValidationReport;

/// Single named check outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Check {
    /// Stable identifier for the check.
    pub name: String,
    /// Whether the check passed.
    pub pass: bool,
    /// Offending values or a note on why the check was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Check {
    /// Passing check.
    pub fn pass(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pass: true,
            detail: None,
        }
    }

    /// Failing check with its reason.
    pub fn fail(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            pass: false,
            detail: Some(detail.into()),
        }
    }

    /// Passing check with a note.
    pub fn note(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Passing when `failures` is empty, otherwise failing with the first few.
    pub fn from_failures(name: &str, failures: &[String]) -> Self {
        const SHOWN: usize = 5;
        if failures.is_empty() {
            return Self::pass(name);
        }
        let mut detail = failures
            .iter()
            .take(SHOWN)
            .cloned()
            .collect::<Vec<_>>()
            .join("; ");
        if failures.len() > SHOWN {
            detail.push_str(&format!("; and {} more", failures.len() - SHOWN));
        }
        Self::fail(name, detail)
    }
}

/// Persisted outcome of a validation or comparison run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckReport {
    /// Content-addressed hash of the report payload.
    pub analysis_hash: String,
    /// Whether every contained check passed.
    pub pass: bool,
    /// Validation outcome, for single fixture runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
    /// Comparison outcome, for expected/actual runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonReport>,
    /// Policy applied.
    pub policy: Policy,
    /// Inputs and tool versions.
    pub provenance: ReportProvenance,
}

fn provenance() -> ReportProvenance {
    ReportProvenance::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

impl CheckReport {
    /// Wraps a validation outcome.
    pub fn from_validation(
        validation: ValidationReport,
        policy: &Policy,
        source: SourceProvenance,
    ) -> Result<Self, EncError> {
        let provenance = provenance().with_input("fixture", source);
        Self::seal(Some(validation), None, policy, provenance)
    }

    /// Wraps a comparison outcome.
    pub fn from_comparison(
        comparison: ComparisonReport,
        policy: &Policy,
        expected: SourceProvenance,
        actual: SourceProvenance,
    ) -> Result<Self, EncError> {
        let provenance = provenance()
            .with_input("expected", expected)
            .with_input("actual", actual);
        Self::seal(None, Some(comparison), policy, provenance)
    }

    fn seal(
        validation: Option<ValidationReport>,
        comparison: Option<ComparisonReport>,
        policy: &Policy,
        provenance: ReportProvenance,
    ) -> Result<Self, EncError> {
        let pass = validation.as_ref().map_or(true, |v| v.pass)
            && comparison.as_ref().map_or(true, |c| c.pass);
        let analysis_hash =
            stable_hash_string(&(&validation, &comparison, policy, &provenance))?;
        Ok(Self {
            analysis_hash,
            pass,
            validation,
            comparison,
            policy: policy.clone(),
            provenance,
        })
    }

    /// Every check of the report, validation first.
    pub fn checks(&self) -> impl Iterator<Item = &Check> {
        self.validation
            .iter()
            .flat_map(|v| v.checks.iter())
            .chain(self.comparison.iter().flat_map(|c| c.checks.iter()))
    }

    /// Persists the report as canonical JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncError> {
        to_canonical_json_bytes(self)
    }
}
