//! Structural checks on a single fixture.
//!
//! Every check runs regardless of earlier failures so one report lists all
//! problems with a fixture.

use enc_fixture::{Axis, BinScheme, Fixture};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::policies::Policy;
use crate::report::Check;

/// Outcome of [`validate_fixture`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    /// Whether every check passed.
    pub pass: bool,
    /// Checks in execution order.
    pub checks: Vec<Check>,
}

impl ValidationReport {
    /// Check by name.
    pub fn check(&self, name: &str) -> Option<&Check> {
        self.checks.iter().find(|check| check.name == name)
    }
}

/// Runs every structural check on the fixture.
pub fn validate_fixture(fixture: &Fixture, policy: &Policy) -> ValidationReport {
    let checks = vec![
        check_lengths(fixture),
        check_monotonic(&fixture.axes),
        check_positive_edges(&fixture.axes),
        check_centers(&fixture.axes, policy),
        check_non_negative(fixture),
        check_finite(fixture),
        check_metadata(fixture),
        check_invocation(fixture, policy),
    ];
    let pass = checks.iter().all(|check| check.pass);
    for check in checks.iter().filter(|check| !check.pass) {
        debug!(check = %check.name, detail = ?check.detail, "validation check failed");
    }
    info!(pass, axes = fixture.axes.len(), bins = fixture.hist.len(), "fixture validated");
    ValidationReport { pass, checks }
}

fn check_lengths(fixture: &Fixture) -> Check {
    let mut failures = Vec::new();
    for axis in &fixture.axes {
        let (edges, centers) = (axis.edges.len(), axis.centers.len());
        if edges != centers && edges != centers + 1 {
            failures.push(format!(
                "{}: {edges} edges for {centers} centers",
                axis.name
            ));
        }
    }
    let expected = fixture.axes_shape();
    if fixture.hist.shape != expected {
        failures.push(format!(
            "hist shape {:?} != centers {:?}",
            fixture.hist.shape, expected
        ));
    }
    Check::from_failures("array_lengths", &failures)
}

fn check_monotonic(axes: &[Axis]) -> Check {
    let mut failures = Vec::new();
    for axis in axes {
        for (idx, pair) in axis.edges.windows(2).enumerate() {
            // Written this way so NaN counts as a violation.
            if !(pair[0] <= pair[1]) {
                failures.push(format!(
                    "{}[{}] = {} > {}[{}] = {}",
                    axis.edges_key(),
                    idx,
                    pair[0],
                    axis.edges_key(),
                    idx + 1,
                    pair[1]
                ));
            }
        }
    }
    Check::from_failures("edges_monotonic", &failures)
}

fn check_positive_edges(axes: &[Axis]) -> Check {
    let mut failures = Vec::new();
    let mut linear = Vec::new();
    for axis in axes {
        // Log axes carry their underflow boundary as a leading 0.
        let log_underflow = axis.edges.first() == Some(&0.0);
        if !log_underflow && !axis.is_log_like() {
            linear.push(axis.name.clone());
            continue;
        }
        let skip = usize::from(log_underflow);
        match axis.edges.iter().skip(skip).find(|e| e.is_finite()) {
            Some(first) if *first > 0.0 => {}
            Some(first) => failures.push(format!(
                "{}: first finite edge {first} is not positive",
                axis.name
            )),
            None => failures.push(format!("{}: no finite edge", axis.name)),
        }
    }
    let check = Check::from_failures("edges_positive", &failures);
    if check.pass && !linear.is_empty() {
        return check.note(format!("skipped linear axes: {}", linear.join(", ")));
    }
    check
}

fn check_centers(axes: &[Axis], policy: &Policy) -> Check {
    let mut failures = Vec::new();
    for axis in axes {
        for (idx, center) in axis.centers.iter().enumerate() {
            let Some((lower, upper)) = axis.interval(idx) else {
                failures.push(format!("{}[{idx}] has no edge", axis.centers_key()));
                continue;
            };
            let slack = policy.edge_rel_tol;
            let above = *center >= lower
                || (lower.is_finite() && *center >= lower - slack * lower.abs());
            let below = *center <= upper
                || (upper.is_finite() && *center <= upper + slack * upper.abs());
            if !(above && below) {
                failures.push(format!(
                    "{}[{idx}] = {center} outside [{lower}, {upper}]",
                    axis.centers_key()
                ));
            }
        }
    }
    Check::from_failures("centers_within_edges", &failures)
}

fn check_non_negative(fixture: &Fixture) -> Check {
    let failures: Vec<String> = fixture
        .hist
        .values
        .iter()
        .enumerate()
        .filter(|(_, value)| **value < 0.0)
        .map(|(flat, value)| format!("hist{:?} = {value}", fixture.hist.unflatten(flat)))
        .collect();
    Check::from_failures("hist_non_negative", &failures)
}

fn check_finite(fixture: &Fixture) -> Check {
    let failures: Vec<String> = fixture
        .hist
        .values
        .iter()
        .enumerate()
        .filter(|(_, value)| !value.is_finite())
        .map(|(flat, value)| format!("hist{:?} = {value}", fixture.hist.unflatten(flat)))
        .collect();
    Check::from_failures("hist_finite", &failures)
}

fn check_metadata(fixture: &Fixture) -> Check {
    let meta = &fixture.metadata;
    let mut failures = Vec::new();
    if meta.n_events == 0 {
        failures.push("n_events is 0".to_string());
    }
    if !(meta.energy.is_finite() && meta.energy > 0.0) {
        failures.push(format!("energy {} is not positive", meta.energy));
    }
    if !(meta.jet_rad.is_finite() && meta.jet_rad > 0.0) {
        failures.push(format!("jet_rad {} is not positive", meta.jet_rad));
    }
    if meta.weight.is_empty() {
        failures.push("weight has no exponents".to_string());
    }
    if meta.weight.iter().any(|w| !w.is_finite()) {
        failures.push(format!("weight {:?} is not finite", meta.weight));
    }
    Check::from_failures("metadata_sane", &failures)
}

fn check_invocation(fixture: &Fixture, policy: &Policy) -> Check {
    const NAME: &str = "invocation_consistent";
    let Some(invocation) = &fixture.invocation else {
        return Check::pass(NAME).note("no invocation recorded");
    };
    let mut failures = Vec::new();

    match invocation.parse_value::<u64>("n_events") {
        Ok(Some(n)) if n != fixture.metadata.n_events => failures.push(format!(
            "--n_events {n} but n_events = {}",
            fixture.metadata.n_events
        )),
        Err(err) => failures.push(err.info().message.clone()),
        _ => {}
    }

    match invocation.parse_value::<usize>("nbins") {
        Ok(Some(nbins)) => {
            for axis in fixture.axes.iter().filter(|axis| axis.nbins() != nbins) {
                failures.push(format!("--nbins {nbins} but {} has {}", axis.name, axis.nbins()));
            }
        }
        Err(err) => failures.push(err.info().message.clone()),
        Ok(None) => {}
    }

    match invocation.parse_values::<f64>("weights") {
        Ok(weights) if !weights.is_empty() && weights != fixture.metadata.weight => {
            failures.push(format!(
                "--weights {weights:?} but weight = {:?}",
                fixture.metadata.weight
            ))
        }
        Err(err) => failures.push(err.info().message.clone()),
        _ => {}
    }

    match invocation.parse_value::<f64>("minbin") {
        Ok(Some(minbin)) => {
            for axis in &fixture.axes {
                match axis.infer_spec(policy.spacing_rel_tol) {
                    Ok(spec) if spec.scheme == BinScheme::Logarithmic => {
                        let tolerance = policy.spacing_rel_tol * minbin.abs().max(1.0);
                        if (spec.minbin - minbin).abs() > tolerance {
                            failures.push(format!(
                                "--minbin {minbin} but {} starts at 1e{:.4}",
                                axis.name, spec.minbin
                            ));
                        }
                    }
                    Ok(_) => {}
                    Err(err) => failures.push(format!("{}: {}", axis.name, err.info().message)),
                }
            }
        }
        Err(err) => failures.push(err.info().message.clone()),
        Ok(None) => {}
    }

    Check::from_failures(NAME, &failures)
}
