use std::fs;
use std::path::Path;

use enc_core::errors::{EncError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Tolerance policy for validation and comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    /// Rounding granularity applied to reported deviations.
    #[serde(default = "Policy::default_rounding")]
    pub rounding: f64,
    /// Absolute tolerance per histogram bin.
    #[serde(default = "Policy::default_abs_tol")]
    pub abs_tol: f64,
    /// Relative tolerance per histogram bin, scaled by the expected value.
    #[serde(default = "Policy::default_rel_tol")]
    pub rel_tol: f64,
    /// Relative tolerance when matching edges, centers and float metadata.
    #[serde(default = "Policy::default_edge_rel_tol")]
    pub edge_rel_tol: f64,
    /// Relative tolerance on bin spacing when recovering an axis layout.
    #[serde(default = "Policy::default_spacing_rel_tol")]
    pub spacing_rel_tol: f64,
    /// Compare run metadata as well as the histogram.
    #[serde(default = "Policy::default_check_metadata")]
    pub check_metadata: bool,
    /// Leave underflow and overflow bins out of the histogram comparison.
    #[serde(default)]
    pub skip_outflow: bool,
}

impl Policy {
    const fn default_rounding() -> f64 {
        1e-12
    }

    const fn default_abs_tol() -> f64 {
        1e-12
    }

    const fn default_rel_tol() -> f64 {
        1e-6
    }

    const fn default_edge_rel_tol() -> f64 {
        1e-5
    }

    const fn default_spacing_rel_tol() -> f64 {
        1e-4
    }

    const fn default_check_metadata() -> bool {
        true
    }

    /// Rounds the provided value according to the policy granularity.
    pub fn round(&self, value: f64) -> f64 {
        if self.rounding <= 0.0 || !value.is_finite() {
            return value;
        }
        (value / self.rounding).round() * self.rounding
    }

    /// Histogram closeness: `|actual - expected| <= abs_tol + rel_tol * |expected|`.
    /// Infinities only match themselves; NaN never matches.
    pub fn is_close(&self, expected: f64, actual: f64) -> bool {
        if expected.is_infinite() || actual.is_infinite() {
            return expected == actual;
        }
        (actual - expected).abs() <= self.abs_tol + self.rel_tol * expected.abs()
    }

    /// Relative match used for axis arrays and float metadata.
    pub fn edges_close(&self, expected: f64, actual: f64) -> bool {
        if expected.is_infinite() || actual.is_infinite() {
            return expected == actual;
        }
        (actual - expected).abs() <= self.edge_rel_tol * expected.abs().max(actual.abs())
    }

    /// Rejects tolerances that would make every comparison pass or fail.
    pub fn validate(&self) -> Result<(), EncError> {
        let fields = [
            ("abs_tol", self.abs_tol),
            ("rel_tol", self.rel_tol),
            ("edge_rel_tol", self.edge_rel_tol),
            ("spacing_rel_tol", self.spacing_rel_tol),
            ("rounding", self.rounding),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(EncError::Serde(
                    ErrorInfo::new(
                        "enc_check.policy.bad_tolerance",
                        format!("{name} must be finite and non-negative, got {value}"),
                    )
                    .with_context("field", name),
                ));
            }
        }
        Ok(())
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            rounding: Self::default_rounding(),
            abs_tol: Self::default_abs_tol(),
            rel_tol: Self::default_rel_tol(),
            edge_rel_tol: Self::default_edge_rel_tol(),
            spacing_rel_tol: Self::default_spacing_rel_tol(),
            check_metadata: Self::default_check_metadata(),
            skip_outflow: false,
        }
    }
}

/// Reads a YAML policy file; absent keys take their defaults.
pub fn load_policy(path: &Path) -> Result<Policy, EncError> {
    let bytes = fs::read(path).map_err(|err| EncError::io("enc_check.policy.read", path, err))?;
    let policy: Policy = serde_yaml::from_slice(&bytes).map_err(|err| {
        EncError::Serde(
            ErrorInfo::new("enc_check.policy.parse", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    policy.validate()?;
    Ok(policy)
}
