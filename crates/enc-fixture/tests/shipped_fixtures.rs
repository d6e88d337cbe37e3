mod common;

use approx::assert_relative_eq;
use enc_core::errors::EncError;
use enc_fixture::{load_fixture, FixtureKind};

use common::{fixture_path, ONE_ANGLE, TWO_ANGLE};

#[test]
fn one_angle_metadata() -> Result<(), EncError> {
    let loaded = load_fixture(&fixture_path(ONE_ANGLE))?;
    let meta = &loaded.fixture.metadata;
    assert_eq!(meta.n_events, 10_000);
    assert_eq!(meta.energy, 14_000.0);
    assert_eq!(meta.level, "data");
    assert_eq!((meta.pid_1, meta.pid_2), (2212, 2212));
    assert_eq!(meta.outstate_str, "qcd");
    assert_eq!(meta.weight, vec![1.0]);
    assert_eq!(meta.jet_alg, "anti-kt");
    assert_eq!(meta.jet_scheme, "E?");
    assert_eq!(meta.jet_rad, 0.5);
    assert!(loaded.fixture.extras.is_empty());
    assert_eq!(loaded.source.content_hash.len(), 64);
    Ok(())
}

#[test]
fn one_angle_arrays() -> Result<(), EncError> {
    let fixture = load_fixture(&fixture_path(ONE_ANGLE))?.fixture;
    assert_eq!(fixture.axes.len(), 1);
    let axis = fixture.axis("theta1").expect("theta1 axis");
    assert_eq!(axis.edges.len(), 51);
    assert_eq!(axis.centers.len(), 50);
    assert_eq!(fixture.hist.shape, vec![50]);
    assert_eq!(axis.edges[0], 0.0);
    assert_eq!(axis.edges[1], 1e-6);
    assert_eq!(axis.edges[49], 10.0);
    assert!(axis.is_open_upper());
    assert!(axis.has_underflow());
    assert_eq!(axis.centers[49], f64::INFINITY);
    assert_relative_eq!(fixture.hist.values[0], 0.120419361);
    assert_eq!(fixture.hist.values[49], 0.0);
    Ok(())
}

#[test]
fn header_invocation_is_structured() -> Result<(), EncError> {
    let fixture = load_fixture(&fixture_path(TWO_ANGLE))?.fixture;
    let invocation = fixture.invocation.as_ref().expect("invocation");
    assert_eq!(invocation.program_name(), "integrated_twoangle");
    assert!(invocation.flag("use_opendata"));
    assert!(invocation.flag("use_pt"));
    assert_eq!(invocation.parse_values::<f64>("weights")?, vec![1.0, 1.0]);
    assert_eq!(invocation.parse_value::<f64>("minbin")?, Some(-6.0));
    assert_eq!(invocation.parse_value::<u64>("n_events")?, Some(10_000));
    assert_eq!(invocation.parse_value::<usize>("nbins")?, Some(50));
    assert_eq!(invocation.value("file_prefix"), Some("10k_50bins"));
    assert_eq!(fixture.kind(), Some(FixtureKind::TwoAngleIntegrated));
    Ok(())
}

#[test]
fn two_angle_weights_are_a_tuple() -> Result<(), EncError> {
    let fixture = load_fixture(&fixture_path(TWO_ANGLE))?.fixture;
    assert_eq!(fixture.metadata.weight, vec![1.0, 1.0]);
    assert_relative_eq!(fixture.axes[0].edges[49], 1.12202);
    Ok(())
}

#[test]
fn missing_file_reports_path() {
    let err = load_fixture(&fixture_path("does_not_exist.py")).unwrap_err();
    assert!(matches!(err, EncError::Io(_)));
    assert!(err.info().context["path"].ends_with("does_not_exist.py"));
}
