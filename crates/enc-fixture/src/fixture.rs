//! Typed view over a parsed fixture document.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use enc_core::errors::{EncError, ErrorInfo};
use enc_core::{sha256_hex, SourceProvenance};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::axis::Axis;
use crate::invocation::Invocation;
use crate::parser::{parse_document, Document};
use crate::value::Value;

/// Name of the histogram binding.
pub const HIST_KEY: &str = "hist";

/// Metadata bindings every fixture carries, in writing order.
pub const METADATA_KEYS: [&str; 10] = [
    "n_events",
    "energy",
    "level",
    "pid_1",
    "pid_2",
    "outstate_str",
    "weight",
    "jet_alg",
    "jet_scheme",
    "jet_rad",
];

/// Run configuration the histogram was produced under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Number of generated or read events.
    pub n_events: u64,
    /// Collision energy in GeV.
    pub energy: f64,
    /// Event level tag (`data`, `hadron`, `parton`).
    pub level: String,
    /// PDG id of the first beam particle.
    pub pid_1: i64,
    /// PDG id of the second beam particle.
    pub pid_2: i64,
    /// Hard process label.
    pub outstate_str: String,
    /// Energy weight exponents, one per angular observable.
    pub weight: Vec<f64>,
    /// Jet algorithm name.
    pub jet_alg: String,
    /// Recombination scheme name.
    pub jet_scheme: String,
    /// Jet radius.
    pub jet_rad: f64,
}

/// Histogram values stored row-major with their shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistValues {
    /// Extent along each axis.
    pub shape: Vec<usize>,
    /// Row-major values.
    pub values: Vec<f64>,
}

impl HistValues {
    /// One dimensional histogram.
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self {
            shape: vec![values.len()],
            values,
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no values are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Value at a multi-index.
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        self.flat_index(index).and_then(|flat| self.values.get(flat).copied())
    }

    /// Row-major offset of a multi-index.
    pub fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0;
        for (idx, extent) in index.iter().zip(&self.shape) {
            if idx >= extent {
                return None;
            }
            flat = flat * extent + idx;
        }
        Some(flat)
    }

    /// Multi-index of a row-major offset.
    pub fn unflatten(&self, mut flat: usize) -> Vec<usize> {
        let mut index = vec![0; self.shape.len()];
        for (slot, extent) in index.iter_mut().zip(&self.shape).rev() {
            if *extent == 0 {
                continue;
            }
            *slot = flat % extent;
            flat /= extent;
        }
        index
    }
}

/// A loaded regression fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    /// Producer command line from the header, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation: Option<Invocation>,
    /// Top level comments, in order.
    pub comments: Vec<String>,
    /// Run configuration.
    pub metadata: RunMetadata,
    /// Angular axes in source order.
    pub axes: Vec<Axis>,
    /// Histogram densities.
    pub hist: HistValues,
    /// Bindings the toolkit does not interpret, kept for re-emission.
    #[serde(default)]
    pub extras: BTreeMap<String, Value>,
}

/// Fixture together with where it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedFixture {
    /// Parsed fixture.
    pub fixture: Fixture,
    /// Path and content hash.
    pub source: SourceProvenance,
}

fn fixture_error(code: &str, message: impl Into<String>, binding: &str) -> EncError {
    EncError::Fixture(ErrorInfo::new(code, message).with_context("binding", binding))
}

fn required<'a>(doc: &'a Document, name: &str) -> Result<&'a Value, EncError> {
    doc.get(name).ok_or_else(|| {
        fixture_error(
            "enc_fixture.missing_binding",
            format!("fixture does not bind '{name}'"),
            name,
        )
    })
}

fn wrong_type(name: &str, expected: &str, found: &Value) -> EncError {
    fixture_error(
        "enc_fixture.wrong_type",
        format!("'{name}' must be {expected}, found {}", found.type_name()),
        name,
    )
}

fn required_f64(doc: &Document, name: &str) -> Result<f64, EncError> {
    let value = required(doc, name)?;
    value.as_f64().ok_or_else(|| wrong_type(name, "a number", value))
}

fn required_i64(doc: &Document, name: &str) -> Result<i64, EncError> {
    let value = required(doc, name)?;
    value.as_i64().ok_or_else(|| wrong_type(name, "an integer", value))
}

fn required_str(doc: &Document, name: &str) -> Result<String, EncError> {
    let value = required(doc, name)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| wrong_type(name, "a string", value))
}

fn required_seq(doc: &Document, name: &str) -> Result<Vec<f64>, EncError> {
    let value = required(doc, name)?;
    value
        .as_f64_seq()
        .ok_or_else(|| wrong_type(name, "a numeric sequence", value))
}

impl RunMetadata {
    fn from_document(doc: &Document) -> Result<Self, EncError> {
        let n_events = required_i64(doc, "n_events")?;
        let n_events = u64::try_from(n_events).map_err(|_| {
            fixture_error(
                "enc_fixture.negative_events",
                format!("n_events must be non-negative, got {n_events}"),
                "n_events",
            )
        })?;
        Ok(Self {
            n_events,
            energy: required_f64(doc, "energy")?,
            level: required_str(doc, "level")?,
            pid_1: required_i64(doc, "pid_1")?,
            pid_2: required_i64(doc, "pid_2")?,
            outstate_str: required_str(doc, "outstate_str")?,
            weight: required_seq(doc, "weight")?,
            jet_alg: required_str(doc, "jet_alg")?,
            jet_scheme: required_str(doc, "jet_scheme")?,
            jet_rad: required_f64(doc, "jet_rad")?,
        })
    }
}

impl Fixture {
    /// Builds the typed fixture from a parsed document.
    pub fn from_document(doc: &Document) -> Result<Self, EncError> {
        let metadata = RunMetadata::from_document(doc)?;

        let mut axes = Vec::new();
        let mut consumed: Vec<String> = METADATA_KEYS.iter().map(|k| k.to_string()).collect();
        consumed.push(HIST_KEY.to_string());
        for binding in &doc.bindings {
            let Some(name) = binding.name.strip_suffix("_edges") else {
                continue;
            };
            if axes.iter().any(|axis: &Axis| axis.name == name) {
                continue;
            }
            let edges_key = binding.name.clone();
            let centers_key = format!("{name}_centers");
            let edges = required_seq(doc, &edges_key)?;
            let centers = required_seq(doc, &centers_key)?;
            axes.push(Axis::new(name, edges, centers));
            consumed.push(edges_key);
            consumed.push(centers_key);
        }
        if axes.is_empty() {
            return Err(fixture_error(
                "enc_fixture.no_axes",
                "fixture binds no '<axis>_edges' array",
                "*_edges",
            ));
        }

        let hist_value = required(doc, HIST_KEY)?;
        let (shape, values) = hist_value
            .to_array()
            .filter(|(shape, _)| !shape.is_empty())
            .ok_or_else(|| wrong_type(HIST_KEY, "a rectangular numeric list", hist_value))?;

        let extras = doc
            .latest()
            .into_iter()
            .filter(|(name, _)| !consumed.iter().any(|c| c == name))
            .map(|(name, binding)| (name.to_string(), binding.value.clone()))
            .collect();

        Ok(Self {
            invocation: Invocation::from_comments(&doc.comments)?,
            comments: doc.comments.iter().map(|c| c.text.clone()).collect(),
            metadata,
            axes,
            hist: HistValues { shape, values },
            extras,
        })
    }

    /// Axis by observable name.
    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.name == name)
    }

    /// Shape implied by the axes' center counts.
    pub fn axes_shape(&self) -> Vec<usize> {
        self.axes.iter().map(Axis::nbins).collect()
    }
}

/// Parses fixture source text.
pub fn parse_fixture(src: &str) -> Result<Fixture, EncError> {
    let doc = parse_document(src)?;
    Fixture::from_document(&doc)
}

/// Reads and parses a fixture file, recording its content hash.
pub fn load_fixture(path: &Path) -> Result<LoadedFixture, EncError> {
    let bytes = fs::read(path).map_err(|err| EncError::io("enc_fixture.read", path, err))?;
    let text = String::from_utf8(bytes).map_err(|err| {
        EncError::Parse(
            ErrorInfo::new("enc_fixture.utf8", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let fixture = parse_fixture(&text).map_err(|err| with_path(err, path))?;
    debug!(
        path = %path.display(),
        axes = fixture.axes.len(),
        bins = fixture.hist.len(),
        "fixture loaded"
    );
    Ok(LoadedFixture {
        fixture,
        source: SourceProvenance {
            path: Some(path.display().to_string()),
            content_hash: sha256_hex(text.as_bytes()),
        },
    })
}

fn with_path(err: EncError, path: &Path) -> EncError {
    let path = path.display().to_string();
    match err {
        EncError::Parse(info) => EncError::Parse(info.with_context("path", path)),
        EncError::Fixture(info) => EncError::Fixture(info.with_context("path", path)),
        other => other,
    }
}
