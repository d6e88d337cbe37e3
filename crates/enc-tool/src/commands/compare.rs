use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use enc_check::{compare_fixtures, CheckReport};
use enc_core::to_canonical_json_pretty;
use enc_fixture::load_fixture;

use super::{emit, PolicyArgs};

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Reference fixture.
    #[arg(long)]
    pub expected: PathBuf,
    /// Fixture under test.
    #[arg(long)]
    pub actual: PathBuf,
    #[command(flatten)]
    pub tolerance: PolicyArgs,
    /// Write the report here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &CompareArgs) -> Result<(), Box<dyn Error>> {
    let policy = args.tolerance.resolve()?;
    let expected = load_fixture(&args.expected)?;
    let actual = load_fixture(&args.actual)?;

    let comparison = compare_fixtures(&expected.fixture, &actual.fixture, &policy);
    let failing_bins = comparison.failing_bins.len();
    let report = CheckReport::from_comparison(comparison, &policy, expected.source, actual.source)?;
    emit(args.out.as_deref(), &to_canonical_json_pretty(&report)?)?;

    if !report.pass {
        let failed: Vec<&str> = report
            .checks()
            .filter(|check| !check.pass)
            .map(|check| check.name.as_str())
            .collect();
        return Err(format!(
            "comparison failed ({}; {failing_bins} bin(s) out of tolerance)",
            failed.join(", ")
        )
        .into());
    }
    Ok(())
}
