//! Expected-versus-actual fixture comparison under a tolerance policy.

use enc_fixture::{Axis, Fixture, RunMetadata};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::policies::Policy;
use crate::report::Check;

/// A histogram bin outside tolerance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BinDeviation {
    /// Bin index, one entry per axis.
    pub index: Vec<usize>,
    /// Reference value.
    pub expected: f64,
    /// Value under test.
    pub actual: f64,
    /// `|actual - expected|`.
    pub abs_dev: f64,
    /// `abs_dev / |expected|`, absent when the reference is zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel_dev: Option<f64>,
}

/// Outcome of [`compare_fixtures`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonReport {
    /// Whether every check passed.
    pub pass: bool,
    /// Checks in execution order.
    pub checks: Vec<Check>,
    /// Number of histogram bins compared.
    pub compared_bins: usize,
    /// Bins outside tolerance.
    pub failing_bins: Vec<BinDeviation>,
    /// Largest finite absolute deviation over compared bins.
    pub max_abs_dev: f64,
    /// Largest relative deviation over compared bins with a non-zero reference.
    pub max_rel_dev: f64,
}

impl ComparisonReport {
    /// Check by name.
    pub fn check(&self, name: &str) -> Option<&Check> {
        self.checks.iter().find(|check| check.name == name)
    }
}

#[derive(Default)]
struct HistOutcome {
    compared: usize,
    failing: Vec<BinDeviation>,
    max_abs: f64,
    max_rel: f64,
}

/// Compares `actual` against the `expected` reference.
///
/// Axis or shape disagreement fails the report without a numeric
/// comparison of the histogram.
pub fn compare_fixtures(expected: &Fixture, actual: &Fixture, policy: &Policy) -> ComparisonReport {
    let mut checks = vec![
        check_axes(&expected.axes, &actual.axes, policy),
        check_shape(expected, actual),
    ];
    if policy.check_metadata {
        checks.push(check_metadata(&expected.metadata, &actual.metadata, policy));
    }

    let layout_ok = checks[0].pass && checks[1].pass;
    let outcome = if layout_ok {
        let outcome = compare_hist(expected, actual, policy);
        let failures: Vec<String> = outcome
            .failing
            .iter()
            .map(|dev| format!("hist{:?}: expected {} got {}", dev.index, dev.expected, dev.actual))
            .collect();
        checks.push(Check::from_failures("hist_close", &failures));
        outcome
    } else {
        checks.push(Check::fail("hist_close", "skipped: axes or shape differ"));
        HistOutcome::default()
    };

    let pass = checks.iter().all(|check| check.pass);
    for check in checks.iter().filter(|check| !check.pass) {
        debug!(check = %check.name, detail = ?check.detail, "comparison check failed");
    }
    info!(
        pass,
        compared = outcome.compared,
        failing = outcome.failing.len(),
        max_abs_dev = outcome.max_abs,
        "fixtures compared"
    );
    ComparisonReport {
        pass,
        checks,
        compared_bins: outcome.compared,
        failing_bins: outcome.failing,
        max_abs_dev: policy.round(outcome.max_abs),
        max_rel_dev: policy.round(outcome.max_rel),
    }
}

fn check_axes(expected: &[Axis], actual: &[Axis], policy: &Policy) -> Check {
    const NAME: &str = "axes_match";
    let names = |axes: &[Axis]| axes.iter().map(|a| a.name.clone()).collect::<Vec<_>>();
    if names(expected) != names(actual) {
        return Check::fail(
            NAME,
            format!("axes {:?} != {:?}", names(expected), names(actual)),
        );
    }
    let mut failures = Vec::new();
    for (exp, act) in expected.iter().zip(actual) {
        for (key, e, a) in [
            (exp.edges_key(), &exp.edges, &act.edges),
            (exp.centers_key(), &exp.centers, &act.centers),
        ] {
            if e.len() != a.len() {
                failures.push(format!("{key}: length {} != {}", e.len(), a.len()));
                continue;
            }
            for (idx, (ev, av)) in e.iter().zip(a).enumerate() {
                if !policy.edges_close(*ev, *av) {
                    failures.push(format!("{key}[{idx}]: expected {ev} got {av}"));
                }
            }
        }
    }
    Check::from_failures(NAME, &failures)
}

fn check_shape(expected: &Fixture, actual: &Fixture) -> Check {
    if expected.hist.shape == actual.hist.shape {
        Check::pass("shape_match")
    } else {
        Check::fail(
            "shape_match",
            format!(
                "hist shape {:?} != {:?}",
                expected.hist.shape, actual.hist.shape
            ),
        )
    }
}

fn check_metadata(expected: &RunMetadata, actual: &RunMetadata, policy: &Policy) -> Check {
    let mut failures = Vec::new();
    let mut record = |field: &str, e: &dyn std::fmt::Debug, a: &dyn std::fmt::Debug, same: bool| {
        if !same {
            failures.push(format!("{field}: expected {e:?} got {a:?}"));
        }
    };
    record("n_events", &expected.n_events, &actual.n_events, expected.n_events == actual.n_events);
    record(
        "energy",
        &expected.energy,
        &actual.energy,
        policy.edges_close(expected.energy, actual.energy),
    );
    record("level", &expected.level, &actual.level, expected.level == actual.level);
    record("pid_1", &expected.pid_1, &actual.pid_1, expected.pid_1 == actual.pid_1);
    record("pid_2", &expected.pid_2, &actual.pid_2, expected.pid_2 == actual.pid_2);
    record(
        "outstate_str",
        &expected.outstate_str,
        &actual.outstate_str,
        expected.outstate_str == actual.outstate_str,
    );
    let weights_match = expected.weight.len() == actual.weight.len()
        && expected
            .weight
            .iter()
            .zip(&actual.weight)
            .all(|(e, a)| policy.edges_close(*e, *a));
    record("weight", &expected.weight, &actual.weight, weights_match);
    record("jet_alg", &expected.jet_alg, &actual.jet_alg, expected.jet_alg == actual.jet_alg);
    record(
        "jet_scheme",
        &expected.jet_scheme,
        &actual.jet_scheme,
        expected.jet_scheme == actual.jet_scheme,
    );
    record(
        "jet_rad",
        &expected.jet_rad,
        &actual.jet_rad,
        policy.edges_close(expected.jet_rad, actual.jet_rad),
    );
    Check::from_failures("metadata_match", &failures)
}

fn is_outflow(axes: &[Axis], index: &[usize]) -> bool {
    axes.iter().zip(index).any(|(axis, idx)| {
        (*idx == 0 && axis.has_underflow()) || (*idx + 1 == axis.nbins() && axis.is_open_upper())
    })
}

fn compare_hist(expected: &Fixture, actual: &Fixture, policy: &Policy) -> HistOutcome {
    let mut outcome = HistOutcome::default();
    for (flat, &e) in expected.hist.values.iter().enumerate() {
        let index = expected.hist.unflatten(flat);
        if policy.skip_outflow && is_outflow(&expected.axes, &index) {
            continue;
        }
        let Some(a) = actual.hist.get(&index) else {
            continue;
        };
        outcome.compared += 1;

        let abs_dev = (a - e).abs();
        let rel_dev = (e != 0.0 && e.is_finite()).then(|| abs_dev / e.abs());
        if abs_dev.is_finite() {
            outcome.max_abs = outcome.max_abs.max(abs_dev);
        }
        if let Some(rel) = rel_dev.filter(|rel| rel.is_finite()) {
            outcome.max_rel = outcome.max_rel.max(rel);
        }

        let both_finite = e.is_finite() && a.is_finite();
        let same_infinity = e.is_infinite() && e == a;
        let close = (both_finite || same_infinity) && policy.is_close(e, a);
        if !close {
            outcome.failing.push(BinDeviation {
                index,
                expected: e,
                actual: a,
                abs_dev: policy.round(abs_dev),
                rel_dev: rel_dev.map(|rel| policy.round(rel)),
            });
        }
    }
    outcome
}
