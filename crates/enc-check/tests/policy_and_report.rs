mod common;

use std::fs;

use enc_check::{compare_fixtures, load_policy, validate_fixture, CheckReport, Policy};
use enc_core::errors::EncError;
use enc_fixture::load_fixture;
use tempfile::tempdir;

use common::{fixture_path, ONE_ANGLE, TWO_ANGLE};

#[test]
fn partial_policy_keeps_defaults() -> Result<(), EncError> {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("policy.yaml");
    fs::write(&path, "rel_tol: 0.001\nskip_outflow: true\n").expect("write policy");
    let policy = load_policy(&path)?;
    assert_eq!(policy.rel_tol, 0.001);
    assert!(policy.skip_outflow);
    assert_eq!(policy.abs_tol, Policy::default().abs_tol);
    assert_eq!(policy.edge_rel_tol, 1e-5);
    assert!(policy.check_metadata);
    Ok(())
}

#[test]
fn unknown_policy_key_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("policy.yaml");
    fs::write(&path, "relative_tolerance: 0.1\n").expect("write policy");
    let err = load_policy(&path).expect_err("unknown key");
    assert_eq!(err.info().code, "enc_check.policy.parse");
    assert!(err.info().context.contains_key("path"));
}

#[test]
fn negative_tolerance_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("policy.yaml");
    fs::write(&path, "abs_tol: -1.0\n").expect("write policy");
    let err = load_policy(&path).expect_err("negative tolerance");
    assert_eq!(err.info().code, "enc_check.policy.bad_tolerance");
    assert_eq!(err.info().context.get("field").map(String::as_str), Some("abs_tol"));
}

#[test]
fn missing_policy_file_is_an_io_error() {
    let err = load_policy(std::path::Path::new("does/not/exist.yaml")).expect_err("missing");
    assert!(matches!(err, EncError::Io(_)));
    assert_eq!(err.info().code, "enc_check.policy.read");
}

#[test]
fn rounding_snaps_to_granularity() {
    let policy = Policy {
        rounding: 1e-3,
        ..Policy::default()
    };
    assert!((policy.round(0.123456) - 0.123).abs() < 1e-12);
    assert_eq!(policy.round(f64::INFINITY), f64::INFINITY);
    let exact = Policy {
        rounding: 0.0,
        ..Policy::default()
    };
    assert_eq!(exact.round(0.123456), 0.123456);
}

#[test]
fn validation_report_hash_is_stable() -> Result<(), EncError> {
    let loaded = load_fixture(&fixture_path(ONE_ANGLE))?;
    let policy = Policy::default();
    let first = CheckReport::from_validation(
        validate_fixture(&loaded.fixture, &policy),
        &policy,
        loaded.source.clone(),
    )?;
    let second = CheckReport::from_validation(
        validate_fixture(&loaded.fixture, &policy),
        &policy,
        loaded.source.clone(),
    )?;
    assert!(first.pass);
    assert_eq!(first.analysis_hash, second.analysis_hash);
    assert_eq!(first.analysis_hash.len(), 64);
    assert_eq!(first.provenance.inputs.get("fixture"), Some(&loaded.source));

    let looser = Policy {
        rel_tol: 1e-3,
        ..Policy::default()
    };
    let third = CheckReport::from_validation(
        validate_fixture(&loaded.fixture, &looser),
        &looser,
        loaded.source,
    )?;
    assert_ne!(first.analysis_hash, third.analysis_hash);
    Ok(())
}

#[test]
fn comparison_report_serialises_canonically() -> Result<(), EncError> {
    let expected = load_fixture(&fixture_path(ONE_ANGLE))?;
    let actual = load_fixture(&fixture_path(TWO_ANGLE))?;
    let policy = Policy::default();
    let comparison = compare_fixtures(&expected.fixture, &actual.fixture, &policy);
    let report = CheckReport::from_comparison(comparison, &policy, expected.source, actual.source)?;
    assert!(!report.pass);
    assert!(report.checks().any(|check| check.name == "axes_match" && !check.pass));

    let bytes = report.to_bytes()?;
    let json: serde_json::Value = serde_json::from_slice(&bytes).expect("report json");
    assert_eq!(json["pass"], serde_json::Value::Bool(false));
    assert!(json.get("validation").is_none());
    assert!(json["provenance"]["inputs"]["expected"]["content_hash"].is_string());
    assert!(json["provenance"]["inputs"]["actual"]["content_hash"].is_string());
    assert_eq!(report.to_bytes()?, bytes);
    Ok(())
}
