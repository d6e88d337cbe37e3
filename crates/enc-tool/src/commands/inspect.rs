use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use enc_core::{to_canonical_json_pretty, SourceProvenance};
use enc_fixture::{load_fixture, AxisSpec, FixtureKind, RunMetadata};
use serde::Serialize;

use super::emit;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Fixture file to read.
    pub fixture: PathBuf,
    /// Print every parsed array instead of the summary.
    #[arg(long)]
    pub full: bool,
    /// Relative tolerance on bin spacing when recovering axis layouts.
    #[arg(long, default_value_t = 1e-4)]
    pub spacing_rel_tol: f64,
    /// Write the JSON here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct AxisSummary {
    name: String,
    edges: usize,
    centers: usize,
    open_upper: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<AxisSpec>,
}

#[derive(Debug, Serialize)]
struct FixtureSummary {
    source: SourceProvenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<FixtureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    command_line: Option<String>,
    metadata: RunMetadata,
    axes: Vec<AxisSummary>,
    hist_shape: Vec<usize>,
    hist_sum: f64,
    extras: Vec<String>,
}

pub fn run(args: &InspectArgs) -> Result<(), Box<dyn Error>> {
    let loaded = load_fixture(&args.fixture)?;
    if args.full {
        return emit(args.out.as_deref(), &to_canonical_json_pretty(&loaded.fixture)?);
    }

    let fixture = &loaded.fixture;
    let summary = FixtureSummary {
        source: loaded.source.clone(),
        kind: fixture.kind(),
        command_line: fixture
            .invocation
            .as_ref()
            .map(|invocation| invocation.to_command_line()),
        metadata: fixture.metadata.clone(),
        axes: fixture
            .axes
            .iter()
            .map(|axis| AxisSummary {
                name: axis.name.clone(),
                edges: axis.edges.len(),
                centers: axis.centers.len(),
                open_upper: axis.is_open_upper(),
                layout: axis.infer_spec(args.spacing_rel_tol).ok(),
            })
            .collect(),
        hist_shape: fixture.hist.shape.clone(),
        hist_sum: fixture.hist.values.iter().filter(|v| v.is_finite()).sum(),
        extras: fixture.extras.keys().cloned().collect(),
    };
    emit(args.out.as_deref(), &to_canonical_json_pretty(&summary)?)
}
