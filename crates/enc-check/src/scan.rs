//! Directory-level validation and comparison.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use enc_core::errors::{EncError, ErrorInfo};
use enc_fixture::load_fixture;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::compare::compare_fixtures;
use crate::policies::Policy;
use crate::report::CheckReport;
use crate::validate::validate_fixture;

/// Which files a scan picks up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Glob patterns matched against paths relative to the scan root.
    #[serde(default = "ScanOptions::default_patterns")]
    pub patterns: Vec<String>,
}

impl ScanOptions {
    fn default_patterns() -> Vec<String> {
        vec!["**/*.py".to_string()]
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            patterns: Self::default_patterns(),
        }
    }
}

/// Expected and actual files sharing a relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePair {
    /// Path relative to both roots, `/` separated.
    pub relative: String,
    /// File under the expected root.
    pub expected: Option<PathBuf>,
    /// File under the actual root.
    pub actual: Option<PathBuf>,
}

/// Result for one file or pair of files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchEntry {
    /// Path relative to the scan root.
    pub path: String,
    /// Whether the file loaded and every check passed.
    pub pass: bool,
    /// Load failure or missing counterpart.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EncError>,
    /// Report, when the inputs loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<CheckReport>,
}

/// Outcome of a directory run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    /// Whether every entry passed. An empty scan passes.
    pub pass: bool,
    /// Entries sorted by relative path.
    pub entries: Vec<BatchEntry>,
}

impl BatchSummary {
    fn from_entries(entries: Vec<BatchEntry>) -> Self {
        let pass = entries.iter().all(|entry| entry.pass);
        Self { pass, entries }
    }

    /// Entries that did not pass.
    pub fn failures(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter().filter(|entry| !entry.pass)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, EncError> {
    let mut builder = GlobSetBuilder::new();
    let defaults = ScanOptions::default_patterns();
    let patterns = if patterns.is_empty() { &defaults } else { patterns };
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|err| {
            EncError::Io(
                ErrorInfo::new("enc_check.scan.glob", err.to_string())
                    .with_context("pattern", pattern.as_str()),
            )
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|err| EncError::Io(ErrorInfo::new("enc_check.scan.glob", err.to_string())))
}

fn normalise(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Fixture files under `root` matching the scan patterns, keyed by
/// relative path.
pub fn discover(root: &Path, opts: &ScanOptions) -> Result<BTreeMap<String, PathBuf>, EncError> {
    if !root.is_dir() {
        return Err(EncError::Io(
            ErrorInfo::new(
                "enc_check.scan.not_a_directory",
                format!("{} is not a directory", root.display()),
            )
            .with_context("path", root.display().to_string()),
        ));
    }
    let globset = build_globset(&opts.patterns)?;
    let mut found = BTreeMap::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = match entry.path().strip_prefix(root) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        if !globset.is_match(rel) {
            continue;
        }
        found.insert(normalise(rel), entry.path().to_path_buf());
    }
    debug!(root = %root.display(), files = found.len(), "fixtures discovered");
    Ok(found)
}

/// Matches files under two roots by relative path.
pub fn pair_dirs(
    expected_root: &Path,
    actual_root: &Path,
    opts: &ScanOptions,
) -> Result<Vec<FixturePair>, EncError> {
    let mut expected = discover(expected_root, opts)?;
    let mut actual = discover(actual_root, opts)?;
    let mut keys: Vec<String> = expected.keys().chain(actual.keys()).cloned().collect();
    keys.sort();
    keys.dedup();
    Ok(keys
        .into_iter()
        .map(|relative| FixturePair {
            expected: expected.remove(&relative),
            actual: actual.remove(&relative),
            relative,
        })
        .collect())
}

fn failed(path: String, error: EncError) -> BatchEntry {
    BatchEntry {
        path,
        pass: false,
        error: Some(error),
        report: None,
    }
}

fn finished(path: String, report: CheckReport) -> BatchEntry {
    BatchEntry {
        path,
        pass: report.pass,
        error: None,
        report: Some(report),
    }
}

/// Validates every fixture under `root`.
pub fn validate_dir(root: &Path, opts: &ScanOptions, policy: &Policy) -> Result<BatchSummary, EncError> {
    let mut entries = Vec::new();
    for (relative, path) in discover(root, opts)? {
        let loaded = match load_fixture(&path) {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(path = %relative, error = %err, "fixture failed to load");
                entries.push(failed(relative, err));
                continue;
            }
        };
        let validation = validate_fixture(&loaded.fixture, policy);
        let report = CheckReport::from_validation(validation, policy, loaded.source)?;
        entries.push(finished(relative, report));
    }
    let summary = BatchSummary::from_entries(entries);
    info!(
        root = %root.display(),
        files = summary.entries.len(),
        pass = summary.pass,
        "directory validated"
    );
    Ok(summary)
}

/// Compares every fixture under `actual_root` against its counterpart
/// under `expected_root`. A file present on one side only fails.
pub fn compare_dirs(
    expected_root: &Path,
    actual_root: &Path,
    opts: &ScanOptions,
    policy: &Policy,
) -> Result<BatchSummary, EncError> {
    let mut entries = Vec::new();
    for pair in pair_dirs(expected_root, actual_root, opts)? {
        let (expected, actual) = match (pair.expected, pair.actual) {
            (Some(expected), Some(actual)) => (expected, actual),
            (expected, _) => {
                let (code, side, root) = if expected.is_some() {
                    ("enc_check.scan.missing_actual", "actual", actual_root)
                } else {
                    ("enc_check.scan.missing_expected", "expected", expected_root)
                };
                let err = EncError::Compare(
                    ErrorInfo::new(code, format!("no {side} fixture for {}", pair.relative))
                        .with_context("root", root.display().to_string()),
                );
                warn!(path = %pair.relative, side, "fixture has no counterpart");
                entries.push(failed(pair.relative, err));
                continue;
            }
        };
        let loaded = load_fixture(&expected).and_then(|e| load_fixture(&actual).map(|a| (e, a)));
        let (expected, actual) = match loaded {
            Ok(pair) => pair,
            Err(err) => {
                warn!(path = %pair.relative, error = %err, "fixture failed to load");
                entries.push(failed(pair.relative, err));
                continue;
            }
        };
        let comparison = compare_fixtures(&expected.fixture, &actual.fixture, policy);
        let report =
            CheckReport::from_comparison(comparison, policy, expected.source, actual.source)?;
        entries.push(finished(pair.relative, report));
    }
    let summary = BatchSummary::from_entries(entries);
    info!(
        expected = %expected_root.display(),
        actual = %actual_root.display(),
        pairs = summary.entries.len(),
        pass = summary.pass,
        "directories compared"
    );
    Ok(summary)
}
