use serde::{Deserialize, Serialize};

use crate::binning::{AxisSpec, BinScheme};
use enc_core::errors::EncError;

/// One angular observable axis as written in a fixture (`theta1_edges`,
/// `theta1_centers`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// Observable name, the prefix of the `_edges`/`_centers` bindings.
    pub name: String,
    /// Bin boundaries, usually one more than the centers.
    pub edges: Vec<f64>,
    /// Representative point per bin.
    pub centers: Vec<f64>,
}

impl Axis {
    /// Wraps already computed arrays.
    pub fn new(name: impl Into<String>, edges: Vec<f64>, centers: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            edges,
            centers,
        }
    }

    /// Materialises a spec's edges and centers.
    pub fn from_spec(name: impl Into<String>, spec: &AxisSpec) -> Self {
        Self::new(name, spec.edges(), spec.centers())
    }

    /// Binding name of the edge array.
    pub fn edges_key(&self) -> String {
        format!("{}_edges", self.name)
    }

    /// Binding name of the center array.
    pub fn centers_key(&self) -> String {
        format!("{}_centers", self.name)
    }

    /// Number of bins, one per center.
    pub fn nbins(&self) -> usize {
        self.centers.len()
    }

    /// Whether the first bin starts at `0` or `-inf`.
    pub fn has_underflow(&self) -> bool {
        matches!(self.edges.first(), Some(e) if *e == 0.0 || *e == f64::NEG_INFINITY)
    }

    /// Whether the last boundary is `+inf`.
    pub fn is_open_upper(&self) -> bool {
        self.edges.last() == Some(&f64::INFINITY)
    }

    /// Lower and upper boundary of bin `idx`. Without an explicit upper
    /// edge (equal-length layout) the bin is open.
    pub fn interval(&self, idx: usize) -> Option<(f64, f64)> {
        let lower = *self.edges.get(idx)?;
        let upper = self.edges.get(idx + 1).copied().unwrap_or(f64::INFINITY);
        Some((lower, upper))
    }

    /// Per-bin widths used to turn counts into densities; infinite for open
    /// bins.
    pub fn widths(&self) -> Vec<f64> {
        (0..self.nbins())
            .map(|idx| match self.interval(idx) {
                Some((_, upper)) if upper.is_infinite() => f64::INFINITY,
                Some((lower, _)) if lower.is_infinite() => f64::INFINITY,
                Some((lower, upper)) => upper - lower,
                None => f64::NAN,
            })
            .collect()
    }

    /// Recovers the generating layout from the edges.
    pub fn infer_spec(&self, rel_tol: f64) -> Result<AxisSpec, EncError> {
        AxisSpec::infer(&self.edges, rel_tol)
    }

    /// Whether the edges look log spaced.
    pub fn is_log_like(&self) -> bool {
        matches!(
            self.infer_spec(1e-4),
            Ok(AxisSpec {
                scheme: BinScheme::Logarithmic,
                ..
            })
        )
    }
}
