use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    axis::{self, AxisArgs},
    compare::{self, CompareArgs},
    inspect::{self, InspectArgs},
    render::{self, RenderArgs},
    scan::{self, ScanArgs},
    validate::{self, ValidateArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "enc-tool", about = "Energy-correlator histogram fixture toolkit")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a parsed fixture as canonical JSON.
    Inspect(InspectArgs),
    /// Run structural checks on one or more fixtures.
    Validate(ValidateArgs),
    /// Compare an actual fixture against an expected one.
    Compare(CompareArgs),
    /// Validate a directory, or compare two directories pairwise.
    Scan(ScanArgs),
    /// Re-emit a fixture as Python or Mathematica.
    Render(RenderArgs),
    /// Print the edges and centers of a binning layout.
    Axis(AxisArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Inspect(args) => inspect::run(&args),
        Command::Validate(args) => validate::run(&args),
        Command::Compare(args) => compare::run(&args),
        Command::Scan(args) => scan::run(&args),
        Command::Render(args) => render::run(&args),
        Command::Axis(args) => axis::run(&args),
    }
}
