mod common;

use enc_check::{validate_fixture, Policy};
use enc_core::errors::EncError;
use enc_fixture::{Axis, AxisSpec, BinScheme};

use common::{shipped, ONE_ANGLE, TWO_ANGLE};

fn failing(report: &enc_check::ValidationReport) -> Vec<&str> {
    report
        .checks
        .iter()
        .filter(|check| !check.pass)
        .map(|check| check.name.as_str())
        .collect()
}

#[test]
fn shipped_fixtures_validate() -> Result<(), EncError> {
    for name in [ONE_ANGLE, TWO_ANGLE] {
        let report = validate_fixture(&shipped(name)?, &Policy::default());
        assert!(report.pass, "{name}: {:?}", report.checks);
        assert_eq!(report.checks.len(), 8);
    }
    Ok(())
}

#[test]
fn negative_entry_is_reported_with_its_index() -> Result<(), EncError> {
    let mut fixture = shipped(ONE_ANGLE)?;
    fixture.hist.values[17] = -1e-3;
    let report = validate_fixture(&fixture, &Policy::default());
    assert!(!report.pass);
    assert_eq!(failing(&report), vec!["hist_non_negative"]);
    let detail = report
        .check("hist_non_negative")
        .and_then(|check| check.detail.clone())
        .unwrap_or_default();
    assert!(detail.contains("[17]"), "{detail}");
    Ok(())
}

#[test]
fn nan_entry_fails_finiteness_only() -> Result<(), EncError> {
    let mut fixture = shipped(ONE_ANGLE)?;
    fixture.hist.values[3] = f64::NAN;
    let report = validate_fixture(&fixture, &Policy::default());
    assert_eq!(failing(&report), vec!["hist_finite"]);
    Ok(())
}

#[test]
fn decreasing_edges_fail_monotonicity() -> Result<(), EncError> {
    let mut fixture = shipped(TWO_ANGLE)?;
    fixture.axes[0].edges.swap(10, 11);
    let report = validate_fixture(&fixture, &Policy::default());
    assert!(failing(&report).contains(&"edges_monotonic"));
    assert!(failing(&report).contains(&"centers_within_edges"));
    Ok(())
}

#[test]
fn length_mismatch_is_caught() -> Result<(), EncError> {
    let mut fixture = shipped(ONE_ANGLE)?;
    fixture.axes[0].centers.pop();
    let report = validate_fixture(&fixture, &Policy::default());
    assert!(failing(&report).contains(&"array_lengths"));

    let mut fixture = shipped(ONE_ANGLE)?;
    fixture.hist.values.pop();
    fixture.hist.shape = vec![49];
    let report = validate_fixture(&fixture, &Policy::default());
    assert!(failing(&report).contains(&"array_lengths"));
    Ok(())
}

#[test]
fn equal_length_layout_is_accepted() -> Result<(), EncError> {
    let mut fixture = shipped(ONE_ANGLE)?;
    fixture.axes[0].edges.pop();
    let report = validate_fixture(&fixture, &Policy::default());
    assert!(report.check("array_lengths").map_or(false, |check| check.pass));
    assert!(report.check("centers_within_edges").map_or(false, |check| check.pass));
    Ok(())
}

#[test]
fn zero_first_regular_edge_fails_positivity() -> Result<(), EncError> {
    let mut fixture = shipped(ONE_ANGLE)?;
    fixture.axes[0].edges[1] = 0.0;
    fixture.axes[0].centers[1] = 0.0;
    let report = validate_fixture(&fixture, &Policy::default());
    assert!(failing(&report).contains(&"edges_positive"));
    Ok(())
}

#[test]
fn linear_axes_skip_positivity() -> Result<(), EncError> {
    let mut fixture = shipped(ONE_ANGLE)?;
    let spec = AxisSpec::new(-1.0, 1.0, 50, BinScheme::Linear)?;
    fixture.axes[0] = Axis::from_spec("theta1", &spec);
    fixture.invocation = None;
    let report = validate_fixture(&fixture, &Policy::default());
    let check = report.check("edges_positive").cloned();
    assert!(check.as_ref().map_or(false, |check| check.pass));
    assert!(check
        .and_then(|check| check.detail)
        .map_or(false, |detail| detail.contains("theta1")));
    Ok(())
}

#[test]
fn metadata_sanity() -> Result<(), EncError> {
    let mut fixture = shipped(ONE_ANGLE)?;
    fixture.metadata.jet_rad = 0.0;
    fixture.metadata.weight.clear();
    let report = validate_fixture(&fixture, &Policy::default());
    assert!(failing(&report).contains(&"metadata_sane"));
    Ok(())
}

#[test]
fn invocation_disagreement_fails() -> Result<(), EncError> {
    let mut fixture = shipped(ONE_ANGLE)?;
    fixture.metadata.n_events = 20_000;
    let report = validate_fixture(&fixture, &Policy::default());
    assert_eq!(failing(&report), vec!["invocation_consistent"]);

    let mut fixture = shipped(TWO_ANGLE)?;
    fixture.metadata.weight = vec![1.0, 2.0];
    let report = validate_fixture(&fixture, &Policy::default());
    assert_eq!(failing(&report), vec!["invocation_consistent"]);
    Ok(())
}

#[test]
fn missing_invocation_is_noted_not_failed() -> Result<(), EncError> {
    let mut fixture = shipped(TWO_ANGLE)?;
    fixture.invocation = None;
    let report = validate_fixture(&fixture, &Policy::default());
    assert!(report.pass);
    let check = report.check("invocation_consistent").cloned();
    assert_eq!(
        check.and_then(|check| check.detail).as_deref(),
        Some("no invocation recorded")
    );
    Ok(())
}
