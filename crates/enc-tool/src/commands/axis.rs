use std::error::Error;

use clap::Args;
use enc_fixture::builder::DEFAULT_AXIS;
use enc_fixture::{render_axis, Axis, AxisSpec, BinScheme, OutputFormat};

use super::emit;
use super::render::FormatArg;

#[derive(Args, Debug)]
pub struct AxisArgs {
    /// Lower bound of the regular range (base-10 exponent unless `--lin`).
    #[arg(long, allow_hyphen_values = true)]
    pub minbin: f64,
    /// Upper bound of the regular range (base-10 exponent unless `--lin`).
    #[arg(long, allow_hyphen_values = true, default_value_t = 1.0)]
    pub maxbin: f64,
    /// Total bins, outflow bins included.
    #[arg(long)]
    pub nbins: usize,
    /// Equal widths in value space instead of log space.
    #[arg(long)]
    pub lin: bool,
    /// Drop the underflow bin.
    #[arg(long)]
    pub no_underflow: bool,
    /// Drop the overflow bin.
    #[arg(long)]
    pub no_overflow: bool,
    /// Axis name used for the array keys.
    #[arg(long, default_value = DEFAULT_AXIS)]
    pub name: String,
    /// Output syntax.
    #[arg(long, value_enum, default_value = "python")]
    pub format: FormatArg,
}

pub fn run(args: &AxisArgs) -> Result<(), Box<dyn Error>> {
    let scheme = if args.lin {
        BinScheme::Linear
    } else {
        BinScheme::Logarithmic
    };
    let spec = AxisSpec::with_outflow(
        args.minbin,
        args.maxbin,
        args.nbins,
        scheme,
        !args.no_underflow,
        !args.no_overflow,
    )?;
    let axis = Axis::from_spec(args.name.as_str(), &spec);
    let rendered = render_axis(&axis, OutputFormat::from(args.format));
    emit(None, rendered.trim_end())
}
