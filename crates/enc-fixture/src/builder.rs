use std::collections::BTreeMap;

use enc_core::errors::{EncError, ErrorInfo};

use crate::axis::Axis;
use crate::binning::AxisSpec;
use crate::fixture::{Fixture, HistValues, RunMetadata};
use crate::invocation::Invocation;

/// Name given to the axis of fixtures built here.
pub const DEFAULT_AXIS: &str = "theta1";

/// Weighted one-dimensional histogram over an [`AxisSpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct HistBuilder {
    spec: AxisSpec,
    edges: Vec<f64>,
    sums: Vec<f64>,
    entries: u64,
    dropped: u64,
}

impl HistBuilder {
    /// Empty histogram over the spec.
    pub fn new(spec: AxisSpec) -> Result<Self, EncError> {
        spec.validate()?;
        Ok(Self {
            edges: spec.edges(),
            sums: vec![0.0; spec.nbins],
            spec,
            entries: 0,
            dropped: 0,
        })
    }

    /// Layout the histogram was built with.
    pub fn spec(&self) -> &AxisSpec {
        &self.spec
    }

    /// Adds `weight` to the bin holding `value`. Returns `false` when no bin
    /// holds it, which is counted as dropped.
    pub fn fill(&mut self, value: f64, weight: f64) -> bool {
        match self.spec.bin_position(value) {
            Some(idx) => {
                self.sums[idx] += weight;
                self.entries += 1;
                true
            }
            None => {
                self.dropped += 1;
                false
            }
        }
    }

    /// Accumulated weight per bin.
    pub fn sums(&self) -> &[f64] {
        &self.sums
    }

    /// Number of accepted fills.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Number of fills outside every bin.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Adds another histogram over the same layout.
    pub fn merge(&mut self, other: &HistBuilder) -> Result<(), EncError> {
        if self.spec != other.spec {
            return Err(EncError::Binning(ErrorInfo::new(
                "enc_fixture.builder.layout_mismatch",
                "histograms with different layouts cannot be merged",
            )));
        }
        for (sum, extra) in self.sums.iter_mut().zip(&other.sums) {
            *sum += extra;
        }
        self.entries += other.entries;
        self.dropped += other.dropped;
        Ok(())
    }

    /// Differential densities `sum / (width * normalisation)`. Open bins
    /// have infinite width and therefore zero density.
    pub fn density(&self, normalisation: f64) -> Result<Vec<f64>, EncError> {
        if !(normalisation.is_finite() && normalisation > 0.0) {
            return Err(EncError::Binning(
                ErrorInfo::new(
                    "enc_fixture.builder.bad_normalisation",
                    format!("normalisation must be positive and finite, got {normalisation}"),
                )
                .with_hint("normalise by the number of jets that entered the histogram"),
            ));
        }
        Ok(self
            .edges
            .windows(2)
            .zip(&self.sums)
            .map(|(pair, sum)| {
                let width = pair[1] - pair[0];
                if width.is_infinite() {
                    0.0
                } else {
                    sum / (width * normalisation)
                }
            })
            .collect())
    }

    /// Wraps the normalised histogram into a one-axis fixture.
    pub fn into_fixture(
        self,
        metadata: RunMetadata,
        normalisation: f64,
        invocation: Option<Invocation>,
    ) -> Result<Fixture, EncError> {
        let hist = self.density(normalisation)?;
        Ok(Fixture {
            invocation,
            comments: Vec::new(),
            metadata,
            axes: vec![Axis::from_spec(DEFAULT_AXIS, &self.spec)],
            hist: HistValues::from_vec(hist),
            extras: BTreeMap::new(),
        })
    }
}
