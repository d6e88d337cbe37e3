#![deny(missing_docs)]
#![doc = "Shared error, provenance and hashing types for the ENC fixture toolkit."]

pub mod errors;
/// Canonical hashing helpers.
pub mod hash;
pub mod provenance;
/// Canonical JSON helpers.
pub mod serde;

pub use errors::{EncError, ErrorInfo, SourcePosition};
pub use hash::{sha256_hex, stable_hash_string};
pub use provenance::{ReportProvenance, SchemaVersion, SourceProvenance};
pub use serde::{to_canonical_json_bytes, to_canonical_json_pretty};
