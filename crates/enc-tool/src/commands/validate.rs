use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use enc_check::{load_policy, validate_fixture, BatchEntry, CheckReport, Policy};
use enc_core::to_canonical_json_bytes;
use enc_fixture::load_fixture;

use super::emit;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Fixture files to check.
    #[arg(required = true)]
    pub fixtures: Vec<PathBuf>,
    /// YAML tolerance policy.
    #[arg(long)]
    pub policy: Option<PathBuf>,
    /// Write one JSON entry per fixture here instead of stdout. Fixtures that
    /// fail to load get an entry carrying the error.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &ValidateArgs) -> Result<(), Box<dyn Error>> {
    let policy = match &args.policy {
        Some(path) => load_policy(path)?,
        None => Policy::default(),
    };

    let mut lines = Vec::with_capacity(args.fixtures.len());
    let mut failed = 0usize;
    for path in &args.fixtures {
        let loaded = match load_fixture(path) {
            Ok(loaded) => loaded,
            Err(err) => {
                let at = err.position().map(|position| position.to_string());
                tracing::warn!(
                    path = %path.display(),
                    at = at.as_deref().unwrap_or("-"),
                    error = %err,
                    "fixture failed to load"
                );
                failed += 1;
                let entry = BatchEntry {
                    path: path.display().to_string(),
                    pass: false,
                    error: Some(err),
                    report: None,
                };
                lines.push(String::from_utf8(to_canonical_json_bytes(&entry)?)?);
                continue;
            }
        };
        let validation = validate_fixture(&loaded.fixture, &policy);
        let report = CheckReport::from_validation(validation, &policy, loaded.source)?;
        if !report.pass {
            failed += 1;
            for check in report.checks().filter(|check| !check.pass) {
                tracing::warn!(
                    path = %path.display(),
                    check = %check.name,
                    detail = check.detail.as_deref().unwrap_or(""),
                    "check failed"
                );
            }
        }
        let entry = BatchEntry {
            path: path.display().to_string(),
            pass: report.pass,
            error: None,
            report: Some(report),
        };
        lines.push(String::from_utf8(to_canonical_json_bytes(&entry)?)?);
    }
    emit(args.out.as_deref(), &lines.join("\n"))?;

    if failed > 0 {
        return Err(format!("{failed} of {} fixture(s) failed validation", args.fixtures.len()).into());
    }
    Ok(())
}
