//! Snapshot codec for the Deen Journal store.
//!
//! Converts between the portable JSON backup document and
//! [`deen_core::snapshot::Document`]. Pure synchronous; no database
//! dependencies. Decoding either yields a fully validated document or fails
//! on the first problem, naming the collection, record and field.
//!
//! # Quick start
//!
//! ```no_run
//! let bytes = std::fs::read("deen-journal-backup-2024-03-11.json").unwrap();
//! let document = deen_snapshot::decode(&bytes).unwrap();
//! println!("{} records", document.collections.record_count());
//! ```

mod decode;
pub mod error;
mod rules;

use chrono::{DateTime, Utc};
use deen_core::snapshot::Document;
pub use error::{Error, Result};
use sha2::{Digest, Sha256};

/// Serialise `document` as pretty-printed JSON. Identical contents always
/// produce identical output.
pub fn encode(document: &Document) -> Result<String> {
  Ok(serde_json::to_string_pretty(document)?)
}

/// Parse and validate a snapshot document. Has no side effects.
pub fn decode(input: &[u8]) -> Result<Document> { decode::decode(input) }

/// The conventional file name for a backup exported at `exported_at`.
pub fn backup_file_name(exported_at: DateTime<Utc>) -> String {
  format!("deen-journal-backup-{}.json", exported_at.format("%Y-%m-%d"))
}

/// Hex SHA-256 of an encoded document.
pub fn digest(encoded: &str) -> String { hex::encode(Sha256::digest(encoded.as_bytes())) }
