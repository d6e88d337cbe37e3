use enc_core::errors::{EncError, SourcePosition};
use enc_fixture::{parse_document, parse_fixture, Value};

const MINIMAL: &str = r#"import numpy as np
n_events = 100
energy = 91.2
level = 'hadron'
pid_1, pid_2 = 11, -11
outstate_str = "qcd"
weight = (2,)
jet_alg = "ee_genkt"
jet_scheme = "E"
jet_rad = 1000
theta1_edges = [0, 0.1, 1, np.inf]
theta1_centers = [0, 0.316228, np.inf]
hist = [1.5, 2.5e-3, 0,]
"#;

#[test]
fn minimal_fixture_parses() -> Result<(), EncError> {
    let fixture = parse_fixture(MINIMAL)?;
    assert_eq!(fixture.metadata.pid_2, -11);
    assert_eq!(fixture.metadata.weight, vec![2.0]);
    assert_eq!(fixture.metadata.level, "hadron");
    assert_eq!(fixture.hist.values, vec![1.5, 2.5e-3, 0.0]);
    assert!(fixture.invocation.is_none());
    Ok(())
}

#[test]
fn parenthesised_scalar_is_not_a_tuple() -> Result<(), EncError> {
    let doc = parse_document("a = (1)\nb = (1, 2)\nc = ()\n")?;
    assert_eq!(doc.get("a"), Some(&Value::Int(1)));
    assert_eq!(
        doc.get("b"),
        Some(&Value::Tuple(vec![Value::Int(1), Value::Int(2)]))
    );
    assert_eq!(doc.get("c"), Some(&Value::Tuple(Vec::new())));
    Ok(())
}

#[test]
fn constants_and_references_resolve() -> Result<(), EncError> {
    let doc = parse_document(
        "import numpy as numpy_alias\nlo = -numpy_alias.inf\nhi = float('inf')\nsame = hi\nflag = True\n",
    )?;
    assert_eq!(doc.get("lo"), Some(&Value::Float(f64::NEG_INFINITY)));
    assert_eq!(doc.get("hi"), Some(&Value::Float(f64::INFINITY)));
    assert_eq!(doc.get("same"), doc.get("hi"));
    assert_eq!(doc.get("flag"), Some(&Value::Bool(true)));
    assert_eq!(doc.imports[0].local_name(), "numpy_alias");
    Ok(())
}

#[test]
fn multiline_lists_and_comments() -> Result<(), EncError> {
    let doc = parse_document("# header\nxs = [\n\t1, # inline\n\t2,\n\t3\n]  # trailing\n")?;
    assert_eq!(doc.comments.len(), 2);
    assert_eq!(doc.comments[0].text, "header");
    assert_eq!(doc.comments[1].text, "trailing");
    assert_eq!(
        doc.get("xs").and_then(Value::as_f64_seq),
        Some(vec![1.0, 2.0, 3.0])
    );
    Ok(())
}

#[test]
fn nested_hist_keeps_shape() -> Result<(), EncError> {
    let src = MINIMAL.replace(
        "hist = [1.5, 2.5e-3, 0,]",
        "theta2_edges = [0, 1, np.inf]\ntheta2_centers = [0, np.inf]\nhist = [[1, 2], [3, 4], [5, 6]]",
    );
    let fixture = parse_fixture(&src)?;
    assert_eq!(fixture.axes.len(), 2);
    assert_eq!(fixture.hist.shape, vec![3, 2]);
    assert_eq!(fixture.hist.get(&[2, 1]), Some(6.0));
    assert_eq!(fixture.hist.unflatten(3), vec![1, 1]);
    assert_eq!(fixture.axes_shape(), vec![3, 2]);
    Ok(())
}

#[test]
fn ragged_hist_is_rejected() {
    let src = MINIMAL.replace("hist = [1.5, 2.5e-3, 0,]", "hist = [[1, 2], [3]]");
    let err = parse_fixture(&src).unwrap_err();
    assert_eq!(err.info().code, "enc_fixture.wrong_type");
    assert_eq!(err.info().context["binding"], "hist");
}

#[test]
fn unknown_bindings_become_extras() -> Result<(), EncError> {
    let src = format!("{MINIMAL}pt_min = 500\n");
    let fixture = parse_fixture(&src)?;
    assert_eq!(fixture.extras.get("pt_min"), Some(&Value::Int(500)));
    Ok(())
}

#[test]
fn missing_binding_is_named() {
    let src = MINIMAL.replace("jet_rad = 1000\n", "");
    let err = parse_fixture(&src).unwrap_err();
    assert!(matches!(err, EncError::Fixture(_)));
    assert_eq!(err.info().code, "enc_fixture.missing_binding");
    assert_eq!(err.info().context["binding"], "jet_rad");
}

#[test]
fn wrong_type_is_named() {
    let src = MINIMAL.replace("level = 'hadron'", "level = 3");
    let err = parse_fixture(&src).unwrap_err();
    assert_eq!(err.info().code, "enc_fixture.wrong_type");
    assert!(err.info().message.contains("'level' must be a string"));
}

#[test]
fn syntax_errors_carry_position() {
    let err = parse_document("a = 1\nb = [1, 2\n").unwrap_err();
    assert!(matches!(err, EncError::Parse(_)));
    assert_eq!(err.info().code, "enc_fixture.lex.unbalanced");

    let err = parse_document("a = 1\nb = = 2\n").unwrap_err();
    assert_eq!(err.info().code, "enc_fixture.parse.unexpected_token");
    assert_eq!(err.position(), Some(SourcePosition { line: 2, column: 5 }));

    let err = parse_document("a = undefined_name\n").unwrap_err();
    assert_eq!(err.info().code, "enc_fixture.parse.unresolved_name");

    let err = parse_document("a, b = 1, 2, 3\n").unwrap_err();
    assert_eq!(err.info().code, "enc_fixture.parse.unpack_mismatch");

    let err = parse_document("s = \"open\n").unwrap_err();
    assert_eq!(err.info().code, "enc_fixture.lex.unterminated_string");
}

#[test]
fn inf_requires_numeric_import() {
    let err = parse_document("x = np.inf\n").unwrap_err();
    assert_eq!(err.info().code, "enc_fixture.parse.unresolved_name");
}

#[test]
fn bare_inf_and_nan_are_floats() -> Result<(), EncError> {
    let doc = parse_document("x = inf\ny = -inf\nz = nan\n")?;
    assert_eq!(doc.get("x"), Some(&Value::Float(f64::INFINITY)));
    assert_eq!(doc.get("y"), Some(&Value::Float(f64::NEG_INFINITY)));
    assert!(matches!(doc.get("z"), Some(Value::Float(v)) if v.is_nan()));

    let doc = parse_document("inf = 3\nx = inf\n")?;
    assert_eq!(doc.get("x"), Some(&Value::Int(3)));
    Ok(())
}

#[test]
fn deep_nesting_is_refused() -> Result<(), EncError> {
    let depth = 200;
    let src = format!("x = {}1{}\n", "[".repeat(depth), "]".repeat(depth));
    let err = parse_document(&src).unwrap_err();
    assert!(matches!(err, EncError::Parse(_)));
    assert_eq!(err.info().code, "enc_fixture.parse.too_deep");
    assert_eq!(err.position().map(|position| position.line), Some(1));

    let src = format!("x = {}1\n", "-".repeat(depth));
    let err = parse_document(&src).unwrap_err();
    assert_eq!(err.info().code, "enc_fixture.parse.too_deep");

    let src = format!("x = {}1{}\n", "[".repeat(10), "]".repeat(10));
    let doc = parse_document(&src)?;
    assert_eq!(doc.get("x").and_then(Value::to_array).map(|(shape, _)| shape.len()), Some(10));
    Ok(())
}

#[test]
fn huge_float_event_count_is_a_type_error() {
    let src = MINIMAL.replace("n_events = 100", "n_events = 1e30");
    let err = parse_fixture(&src).unwrap_err();
    assert_eq!(err.info().code, "enc_fixture.wrong_type");
    assert_eq!(Value::Float(1e30).as_i64(), None);
    assert_eq!(Value::Float(9.223372036854775807e18).as_i64(), None);
    assert_eq!(Value::Float(-4.0).as_i64(), Some(-4));
}
