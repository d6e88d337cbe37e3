use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use enc_check::{compare_dirs, validate_dir, ScanOptions};
use enc_core::to_canonical_json_pretty;

use super::{emit, PolicyArgs};

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory of reference fixtures; validated alone when `--actual` is absent.
    #[arg(long)]
    pub expected: PathBuf,
    /// Directory of fixtures under test, paired with `--expected` by relative path.
    #[arg(long)]
    pub actual: Option<PathBuf>,
    /// Glob pattern selecting fixture files; repeatable.
    #[arg(long = "glob", value_name = "PATTERN")]
    pub patterns: Vec<String>,
    #[command(flatten)]
    pub tolerance: PolicyArgs,
    /// Write the summary here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &ScanArgs) -> Result<(), Box<dyn Error>> {
    let policy = args.tolerance.resolve()?;
    let opts = if args.patterns.is_empty() {
        ScanOptions::default()
    } else {
        ScanOptions {
            patterns: args.patterns.clone(),
        }
    };

    let summary = match &args.actual {
        Some(actual) => compare_dirs(&args.expected, actual, &opts, &policy)?,
        None => validate_dir(&args.expected, &opts, &policy)?,
    };
    emit(args.out.as_deref(), &to_canonical_json_pretty(&summary)?)?;

    let failed = summary.failures().count();
    if failed > 0 {
        return Err(format!("{failed} of {} entries failed", summary.entries.len()).into());
    }
    Ok(())
}
