use std::error::Error;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use enc_fixture::{fixture_file_name, load_fixture, render_fixture, OutputFormat};

use super::emit;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Python,
    Mathematica,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Python => OutputFormat::Python,
            FormatArg::Mathematica => OutputFormat::Mathematica,
        }
    }
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Fixture file to re-emit.
    pub fixture: PathBuf,
    /// Output syntax.
    #[arg(long, value_enum, default_value = "python")]
    pub format: FormatArg,
    /// Output file; stdout when neither this nor `--out-dir` is given.
    #[arg(long, conflicts_with = "out_dir")]
    pub out: Option<PathBuf>,
    /// Directory to write into under the producer's file naming scheme.
    #[arg(long, requires = "prefix")]
    pub out_dir: Option<PathBuf>,
    /// File name prefix used with `--out-dir`, e.g. `10k_50bins`.
    #[arg(long)]
    pub prefix: Option<String>,
}

pub fn run(args: &RenderArgs) -> Result<(), Box<dyn Error>> {
    let fixture = load_fixture(&args.fixture)?.fixture;
    let format = OutputFormat::from(args.format);
    let mut rendered = render_fixture(&fixture, format);

    let out = match (&args.out_dir, &args.prefix) {
        (Some(dir), Some(prefix)) => {
            let kind = fixture
                .kind()
                .ok_or("cannot tell the fixture kind from its invocation or weights")?;
            Some(dir.join(fixture_file_name(kind, prefix, &fixture.metadata.weight, format)?))
        }
        _ => args.out.clone(),
    };
    if out.is_none() {
        // println adds the newline back.
        while rendered.ends_with('\n') {
            rendered.pop();
        }
    }
    emit(out.as_deref(), &rendered)
}
