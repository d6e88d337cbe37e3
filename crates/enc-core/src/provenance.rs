//! Provenance and schema descriptors attached to emitted reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes and documentation updates.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Where a fixture came from and what it hashed to when loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SourceProvenance {
    /// Path the fixture was read from, if it came from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// SHA-256 of the raw file bytes.
    pub content_hash: String,
}

/// Provenance block shared by every report the toolkit writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReportProvenance {
    /// Schema of the report payload.
    pub schema_version: SchemaVersion,
    /// Inputs keyed by role (`expected`, `actual`, ...).
    pub inputs: BTreeMap<String, SourceProvenance>,
    /// Version map for all tools involved in the run.
    pub tool_versions: BTreeMap<String, String>,
}

impl ReportProvenance {
    /// Creates provenance stamped with the calling crate's version.
    pub fn new(tool: &str, version: &str) -> Self {
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert(tool.to_string(), version.to_string());
        Self {
            schema_version: SchemaVersion::default(),
            inputs: BTreeMap::new(),
            tool_versions,
        }
    }

    /// Records an input under the given role.
    pub fn with_input(mut self, role: impl Into<String>, source: SourceProvenance) -> Self {
        self.inputs.insert(role.into(), source);
        self
    }
}
