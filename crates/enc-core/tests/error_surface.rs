use enc_core::errors::{EncError, ErrorInfo, SourcePosition};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("line", "12")
        .with_context("binding", "hist")
}

#[test]
fn parse_error_surface() {
    let err = EncError::Parse(sample_info("P001", "unexpected token"));
    assert_eq!(err.info().code, "P001");
    assert!(err.info().context.contains_key("line"));
}

#[test]
fn parse_errors_expose_their_position() {
    let err = EncError::Parse(sample_info("P001", "unexpected token").with_context("column", "7"));
    let position = err.position().expect("position");
    assert_eq!(position, SourcePosition { line: 12, column: 7 });
    assert_eq!(position.to_string(), "12:7");

    let no_column = EncError::Parse(sample_info("P002", "unterminated"));
    assert_eq!(no_column.position(), None);

    let not_parse = EncError::Fixture(sample_info("F001", "missing binding").with_context("column", "7"));
    assert_eq!(not_parse.position(), None);
}

#[test]
fn fixture_error_surface() {
    let err = EncError::Fixture(sample_info("F001", "missing binding"));
    assert_eq!(err.info().code, "F001");
    assert!(err.info().context.contains_key("binding"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = EncError::Binning(
        ErrorInfo::new("B001", "no regular bins")
            .with_context("nbins", "2")
            .with_hint("raise nbins"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("binning error: no regular bins (code: B001)"));
    assert!(rendered.contains("nbins=2"));
    assert!(rendered.ends_with("hint: raise nbins"));
}

#[test]
fn io_helper_records_path() {
    let err = EncError::io(
        "enc.read",
        std::path::Path::new("/nope/fixture.py"),
        std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    );
    assert!(matches!(err, EncError::Io(_)));
    assert_eq!(err.info().context["path"], "/nope/fixture.py");
}

#[test]
fn errors_round_trip_through_json() {
    let err = EncError::Compare(sample_info("C001", "axis mismatch"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Compare\""));
    let decoded: EncError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}
