//! Histogram axis layouts with optional outflow bins.
//!
//! Logarithmic bounds are base-10 exponents: `minbin = -6, maxbin = 1`
//! spans `[1e-6, 10)`. `nbins` counts the outflow bins, so regular bins
//! number `nbins - underflow - overflow`.

use enc_core::errors::{EncError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Spacing of the regular bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinScheme {
    /// Equal widths in value space.
    Linear,
    /// Equal widths in `log10` space.
    Logarithmic,
}

/// Parameters that fully determine an axis' edges and centers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    /// Lower bound of the regular range (exponent for log axes).
    pub minbin: f64,
    /// Upper bound of the regular range (exponent for log axes).
    pub maxbin: f64,
    /// Total bin count including outflow bins.
    pub nbins: usize,
    /// Spacing of the regular bins.
    pub scheme: BinScheme,
    /// Whether bin 0 collects values below range.
    pub underflow: bool,
    /// Whether the last bin collects values at or above range.
    pub overflow: bool,
}

fn binning_error(code: &str, message: impl Into<String>) -> EncError {
    EncError::Binning(ErrorInfo::new(code, message))
}

impl AxisSpec {
    /// Axis with both outflow bins, the layout the producers write.
    pub fn new(minbin: f64, maxbin: f64, nbins: usize, scheme: BinScheme) -> Result<Self, EncError> {
        Self::with_outflow(minbin, maxbin, nbins, scheme, true, true)
    }

    /// Axis with explicit outflow choices.
    pub fn with_outflow(
        minbin: f64,
        maxbin: f64,
        nbins: usize,
        scheme: BinScheme,
        underflow: bool,
        overflow: bool,
    ) -> Result<Self, EncError> {
        let spec = Self {
            minbin,
            maxbin,
            nbins,
            scheme,
            underflow,
            overflow,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Checks bounds and the regular bin count.
    pub fn validate(&self) -> Result<(), EncError> {
        if !self.minbin.is_finite() || !self.maxbin.is_finite() {
            return Err(binning_error(
                "enc_fixture.binning.non_finite",
                format!("bounds must be finite, got [{}, {}]", self.minbin, self.maxbin),
            ));
        }
        if self.maxbin <= self.minbin {
            return Err(binning_error(
                "enc_fixture.binning.empty_range",
                format!("maxbin {} must exceed minbin {}", self.maxbin, self.minbin),
            ));
        }
        let outflow = self.outflow_bins();
        if self.nbins <= outflow {
            return Err(EncError::Binning(
                ErrorInfo::new(
                    "enc_fixture.binning.no_regular_bins",
                    format!("nbins {} leaves no regular bins", self.nbins),
                )
                .with_context("outflow_bins", outflow.to_string())
                .with_hint("nbins counts the underflow and overflow bins"),
            ));
        }
        Ok(())
    }

    fn outflow_bins(&self) -> usize {
        usize::from(self.underflow) + usize::from(self.overflow)
    }

    /// Number of bins between `minbin` and `maxbin`.
    pub fn regular_bins(&self) -> usize {
        self.nbins.saturating_sub(self.outflow_bins())
    }

    /// Width of a regular bin in the axis' native space.
    pub fn step(&self) -> f64 {
        (self.maxbin - self.minbin) / self.regular_bins().max(1) as f64
    }

    fn to_value(&self, native: f64) -> f64 {
        match self.scheme {
            BinScheme::Linear => native,
            BinScheme::Logarithmic => 10f64.powf(native),
        }
    }

    fn lower_outflow(&self) -> f64 {
        match self.scheme {
            BinScheme::Linear => f64::NEG_INFINITY,
            BinScheme::Logarithmic => 0.0,
        }
    }

    fn native_edge(&self, k: usize) -> f64 {
        if k == self.regular_bins() {
            self.maxbin
        } else {
            self.minbin + k as f64 * self.step()
        }
    }

    /// `nbins + 1` boundaries in value space.
    pub fn edges(&self) -> Vec<f64> {
        let regular = self.regular_bins();
        let mut edges = Vec::with_capacity(self.nbins + 1);
        if self.underflow {
            edges.push(self.lower_outflow());
        }
        edges.extend((0..=regular).map(|k| self.to_value(self.native_edge(k))));
        if self.overflow {
            edges.push(f64::INFINITY);
        }
        edges
    }

    /// `nbins` representative points: native-space midpoints, so geometric
    /// means on log axes.
    pub fn centers(&self) -> Vec<f64> {
        let regular = self.regular_bins();
        let mut centers = Vec::with_capacity(self.nbins);
        if self.underflow {
            centers.push(self.lower_outflow());
        }
        centers.extend(
            (0..regular).map(|k| self.to_value(self.minbin + (k as f64 + 0.5) * self.step())),
        );
        if self.overflow {
            centers.push(f64::INFINITY);
        }
        centers
    }

    /// Bin index for `value`, or `None` when it falls outside every bin.
    /// A layout that fails [`AxisSpec::validate`] has no bins.
    pub fn bin_position(&self, value: f64) -> Option<usize> {
        if value.is_nan() || self.validate().is_err() {
            return None;
        }
        let native = match self.scheme {
            BinScheme::Linear => value,
            BinScheme::Logarithmic if value <= 0.0 => f64::NEG_INFINITY,
            BinScheme::Logarithmic => value.log10(),
        };
        if native < self.minbin {
            return self.underflow.then_some(0);
        }
        if native >= self.maxbin {
            return self.overflow.then(|| self.nbins - 1);
        }
        let regular = self.regular_bins();
        let idx = (((native - self.minbin) / self.step()).floor() as usize).min(regular - 1);
        Some(idx + usize::from(self.underflow))
    }

    /// Recovers the layout from written edges. Edges are rounded on output,
    /// so spacing only has to agree to `rel_tol`.
    pub fn infer(edges: &[f64], rel_tol: f64) -> Result<Self, EncError> {
        let overflow = edges.last() == Some(&f64::INFINITY);
        let body = if overflow { &edges[..edges.len() - 1] } else { edges };

        if body.first() == Some(&0.0) {
            if let Some(spec) = regular_fit(&body[1..], BinScheme::Logarithmic, rel_tol) {
                return Self::with_outflow(spec.0, spec.1, edges.len() - 1, BinScheme::Logarithmic, true, overflow);
            }
        }
        let (underflow, regular) = match body.first() {
            Some(first) if *first == f64::NEG_INFINITY => (true, &body[1..]),
            _ => (false, body),
        };
        for scheme in [BinScheme::Logarithmic, BinScheme::Linear] {
            if underflow && scheme == BinScheme::Logarithmic {
                continue;
            }
            if let Some((minbin, maxbin)) = regular_fit(regular, scheme, rel_tol) {
                return Self::with_outflow(minbin, maxbin, edges.len() - 1, scheme, underflow, overflow);
            }
        }
        Err(EncError::Binning(
            ErrorInfo::new(
                "enc_fixture.binning.irregular",
                "edges are neither linearly nor logarithmically spaced",
            )
            .with_context("edges", edges.len().to_string())
            .with_context("rel_tol", rel_tol.to_string()),
        ))
    }
}

/// Native-space bounds when `edges` are evenly spaced under `scheme`.
fn regular_fit(edges: &[f64], scheme: BinScheme, rel_tol: f64) -> Option<(f64, f64)> {
    if edges.len() < 2 || edges.iter().any(|e| !e.is_finite()) {
        return None;
    }
    let native: Vec<f64> = match scheme {
        BinScheme::Linear => edges.to_vec(),
        BinScheme::Logarithmic => {
            if edges.iter().any(|e| *e <= 0.0) {
                return None;
            }
            edges.iter().map(|e| e.log10()).collect()
        }
    };
    let first = native[0];
    let last = native[native.len() - 1];
    let step = (last - first) / (native.len() - 1) as f64;
    if step <= 0.0 {
        return None;
    }
    let regular = native
        .windows(2)
        .all(|pair| ((pair[1] - pair[0]) - step).abs() <= rel_tol * step.abs());
    regular.then_some((first, last))
}
