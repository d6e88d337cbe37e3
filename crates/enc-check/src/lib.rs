#![deny(missing_docs)]
#![doc = "Validation and tolerance comparison of energy-correlator histogram fixtures."]

mod compare;
mod policies;
mod report;
mod scan;
mod validate;

pub use compare::{compare_fixtures, BinDeviation, ComparisonReport};
pub use policies::{load_policy, Policy};
pub use report::{Check, CheckReport};
pub use scan::{
    compare_dirs, discover, pair_dirs, validate_dir, BatchEntry, BatchSummary, FixturePair,
    ScanOptions,
};
pub use validate::{validate_fixture, ValidationReport};
