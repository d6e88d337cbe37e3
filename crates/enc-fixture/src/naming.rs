use enc_core::errors::{EncError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::writer::OutputFormat;

/// Which correlator a fixture holds; decides its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureKind {
    /// Two-point correlator in one angle, one weight exponent.
    OneAngle,
    /// Two-angle correlator integrated to one angle, two weight exponents.
    TwoAngleIntegrated,
}

impl FixtureKind {
    /// Kind produced by a given producer program (`oneangle`,
    /// `integrated_twoangle`).
    pub fn from_program(program: &str) -> Option<Self> {
        match program {
            "oneangle" => Some(FixtureKind::OneAngle),
            "integrated_twoangle" | "twoangle_integrated" => Some(FixtureKind::TwoAngleIntegrated),
            _ => None,
        }
    }

    /// Kind implied by the number of weight exponents.
    pub fn from_weight_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(FixtureKind::OneAngle),
            2 => Some(FixtureKind::TwoAngleIntegrated),
            _ => None,
        }
    }

    /// Number of weight exponents the kind takes.
    pub fn weight_count(&self) -> usize {
        match self {
            FixtureKind::OneAngle => 1,
            FixtureKind::TwoAngleIntegrated => 2,
        }
    }
}

/// Replaces every `.` with `-` so numbers can sit in file names.
pub fn periods_to_hyphens(text: &str) -> String {
    text.replace('.', "-")
}

/// Fixed point rendering with `digits` decimals.
pub fn str_round(value: f64, digits: usize) -> String {
    format!("{value:.digits$}")
}

/// File name a fixture is stored under, e.g.
/// `oneangle_10k_50bins_nu1-00.py` or
/// `twoangle_integrated_10k_50bins_nus_1-00_1-00.py`.
pub fn fixture_file_name(
    kind: FixtureKind,
    prefix: &str,
    weights: &[f64],
    format: OutputFormat,
) -> Result<String, EncError> {
    if weights.len() != kind.weight_count() {
        return Err(EncError::Fixture(
            ErrorInfo::new(
                "enc_fixture.naming.weight_count",
                format!(
                    "{kind:?} takes {} weight exponent(s), got {}",
                    kind.weight_count(),
                    weights.len()
                ),
            )
            .with_context("prefix", prefix),
        ));
    }
    let weights: Vec<String> = weights
        .iter()
        .map(|w| periods_to_hyphens(&str_round(*w, 2)))
        .collect();
    let stem = match kind {
        FixtureKind::OneAngle => format!("oneangle_{prefix}_nu{}", weights[0]),
        FixtureKind::TwoAngleIntegrated => {
            format!("twoangle_integrated_{prefix}_nus_{}", weights.join("_"))
        }
    };
    Ok(format!("{stem}{}", format.extension()))
}
