#![deny(missing_docs)]
#![doc = "Energy-correlator histogram fixtures: parsing, binning and rendering."]

/// Axis arrays as stored in fixtures.
pub mod axis;
/// Histogram layouts with outflow bins.
pub mod binning;
/// Weighted histogram accumulation.
pub mod builder;
/// Typed fixture model and loading.
pub mod fixture;
/// C stream style number formatting.
pub mod format;
/// Producer command line parsing.
pub mod invocation;
/// Tokenizer.
pub mod lexer;
/// Fixture file naming conventions.
pub mod naming;
/// Statement parser.
pub mod parser;
/// Literal values.
pub mod value;
/// Fixture rendering.
pub mod writer;

pub use axis::Axis;
pub use binning::{AxisSpec, BinScheme};
pub use builder::HistBuilder;
pub use fixture::{
    load_fixture, parse_fixture, Fixture, HistValues, LoadedFixture, RunMetadata, HIST_KEY,
    METADATA_KEYS,
};
pub use format::format_general;
pub use invocation::{CmdOption, Invocation};
pub use naming::{fixture_file_name, periods_to_hyphens, str_round, FixtureKind};
pub use parser::{parse_document, Binding, Comment, Document, Import};
pub use value::Value;
pub use writer::{render_axis, render_fixture, OutputFormat, AXIS_PRECISION, HIST_PRECISION};

impl Fixture {
    /// Kind from the producer program, falling back to the weight count.
    pub fn kind(&self) -> Option<FixtureKind> {
        self.invocation
            .as_ref()
            .and_then(|invocation| FixtureKind::from_program(invocation.program_name()))
            .or_else(|| FixtureKind::from_weight_count(self.metadata.weight.len()))
    }
}
