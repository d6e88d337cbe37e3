use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::str;

const ONE_ANGLE: &str = "oneangle_10k_50bins_nu1-00.py";
const TWO_ANGLE: &str = "twoangle_integrated_10k_50bins_nus_1-00_1-00.py";

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("enc")
        .join(name)
}

fn enc_tool() -> Command {
    Command::cargo_bin("enc-tool").expect("enc-tool binary")
}

#[test]
fn inspect_summarises_the_fixture() {
    let output = enc_tool()
        .arg("inspect")
        .arg(fixture_path(TWO_ANGLE))
        .output()
        .expect("run inspect");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["kind"], "two_angle_integrated");
    assert_eq!(json["hist_shape"], serde_json::json!([50]));
    assert_eq!(json["axes"][0]["name"], "theta1");
    assert_eq!(json["axes"][0]["edges"], 51);
    assert_eq!(json["axes"][0]["layout"]["scheme"], "logarithmic");
    assert_eq!(json["metadata"]["weight"], serde_json::json!([1.0, 1.0]));
}

#[test]
fn validate_passes_shipped_fixtures() {
    enc_tool()
        .arg("validate")
        .arg(fixture_path(ONE_ANGLE))
        .arg(fixture_path(TWO_ANGLE))
        .assert()
        .success()
        .stdout(str::contains("\"pass\":true"));
}

#[test]
fn validate_fails_on_negative_bins() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = fs::read_to_string(fixture_path(ONE_ANGLE)).expect("read fixture");
    let broken = source.replacen("hist = [\n\t0.120419361", "hist = [\n\t-0.120419361", 1);
    assert_ne!(broken, source);
    let path = dir.path().join("broken.py");
    fs::write(&path, broken).expect("write fixture");

    enc_tool()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stdout(str::contains("hist_non_negative"))
        .stderr(str::contains("failed validation"));
}

#[test]
fn unparsable_fixture_reports_its_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bad.py");
    fs::write(&path, "n_events = \"10000\n").expect("write fixture");
    enc_tool()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stdout(str::contains("enc_fixture.lex.unterminated_string"))
        .stdout(str::contains("\"line\":\"1\""))
        .stderr(str::contains("1 of 1 fixture(s) failed validation"));
}

#[test]
fn validate_reports_every_file_past_a_load_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("missing.py");
    let out = dir.path().join("reports.jsonl");
    enc_tool()
        .arg("validate")
        .arg(&missing)
        .arg(fixture_path(ONE_ANGLE))
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .stderr(str::contains("1 of 2 fixture(s) failed validation"));

    let written = fs::read_to_string(&out).expect("read reports");
    let entries: Vec<serde_json::Value> = written
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["pass"], false);
    assert_eq!(entries[0]["error"]["detail"]["code"], "enc_fixture.read");
    assert!(entries[0].get("report").is_none());
    assert_eq!(entries[1]["pass"], true);
    assert_eq!(entries[1]["report"]["pass"], true);
}

#[test]
fn compare_identical_fixtures_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("report.json");
    enc_tool()
        .args(["compare", "--expected"])
        .arg(fixture_path(ONE_ANGLE))
        .arg("--actual")
        .arg(fixture_path(ONE_ANGLE))
        .arg("--out")
        .arg(&out)
        .assert()
        .success();
    let json: serde_json::Value =
        serde_json::from_slice(&fs::read(&out).expect("read report")).expect("json");
    assert_eq!(json["pass"], true);
    assert_eq!(json["comparison"]["compared_bins"], 50);
    assert_eq!(json["analysis_hash"].as_str().map(|hash| hash.len()), Some(64));
}

#[test]
fn compare_different_fixtures_fails() {
    enc_tool()
        .args(["compare", "--expected"])
        .arg(fixture_path(ONE_ANGLE))
        .arg("--actual")
        .arg(fixture_path(TWO_ANGLE))
        .assert()
        .failure()
        .stderr(str::contains("axes_match"));
}

#[test]
fn compare_reads_policy_and_flag_overrides() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = fs::read_to_string(fixture_path(ONE_ANGLE)).expect("read fixture");
    let shifted = source.replacen("hist = [\n\t0.120419361", "hist = [\n\t0.1204", 1);
    let actual = dir.path().join("shifted.py");
    fs::write(&actual, shifted).expect("write fixture");
    let policy = dir.path().join("policy.yaml");
    fs::write(&policy, "rel_tol: 0.001\n").expect("write policy");

    enc_tool()
        .args(["compare", "--expected"])
        .arg(fixture_path(ONE_ANGLE))
        .arg("--actual")
        .arg(&actual)
        .assert()
        .failure();

    enc_tool()
        .args(["compare", "--expected"])
        .arg(fixture_path(ONE_ANGLE))
        .arg("--actual")
        .arg(&actual)
        .arg("--policy")
        .arg(&policy)
        .assert()
        .success();

    enc_tool()
        .args(["compare", "--expected"])
        .arg(fixture_path(ONE_ANGLE))
        .arg("--actual")
        .arg(&actual)
        .arg("--policy")
        .arg(&policy)
        .args(["--rel-tol", "1e-7"])
        .assert()
        .failure();
}

#[test]
fn scan_pairs_directories() {
    let expected = tempfile::tempdir().expect("tempdir");
    let actual = tempfile::tempdir().expect("tempdir");
    for dir in [expected.path(), actual.path()] {
        fs::copy(fixture_path(ONE_ANGLE), dir.join(ONE_ANGLE)).expect("copy");
    }

    enc_tool()
        .args(["scan", "--expected"])
        .arg(expected.path())
        .arg("--actual")
        .arg(actual.path())
        .assert()
        .success();

    fs::copy(fixture_path(TWO_ANGLE), expected.path().join(TWO_ANGLE)).expect("copy");
    enc_tool()
        .args(["scan", "--expected"])
        .arg(expected.path())
        .arg("--actual")
        .arg(actual.path())
        .assert()
        .failure()
        .stdout(str::contains("enc_check.scan.missing_actual"));

    enc_tool()
        .args(["scan", "--expected"])
        .arg(expected.path())
        .assert()
        .success();
}

#[test]
fn render_reproduces_the_shipped_file() {
    let original = fs::read_to_string(fixture_path(ONE_ANGLE)).expect("read fixture");
    let output = enc_tool()
        .arg("render")
        .arg(fixture_path(ONE_ANGLE))
        .output()
        .expect("run render");
    assert!(output.status.success());
    let rendered = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(rendered.trim_end(), original.trim_end());
}

#[test]
fn render_names_files_like_the_producer() {
    let dir = tempfile::tempdir().expect("tempdir");
    enc_tool()
        .arg("render")
        .arg(fixture_path(TWO_ANGLE))
        .args(["--format", "mathematica", "--prefix", "10k_50bins", "--out-dir"])
        .arg(dir.path())
        .assert()
        .success();
    let written = dir
        .path()
        .join("twoangle_integrated_10k_50bins_nus_1-00_1-00.txt");
    let text = fs::read_to_string(written).expect("rendered file");
    assert!(text.contains("(* theta1_edges *)"));
    assert!(text.contains("Infinity"));
}

#[test]
fn axis_prints_producer_edges() {
    enc_tool()
        .args(["axis", "--minbin", "-6", "--maxbin", "1", "--nbins", "50"])
        .assert()
        .success()
        .stdout(str::starts_with("theta1_edges = [\n\t0, 1e-06, 1.39905e-06"))
        .stdout(str::contains("10, np.inf\n]"));
}

#[test]
fn axis_rejects_too_few_bins() {
    enc_tool()
        .args(["axis", "--minbin", "-6", "--nbins", "2"])
        .assert()
        .failure()
        .stderr(str::contains("enc_fixture.binning"));
}
