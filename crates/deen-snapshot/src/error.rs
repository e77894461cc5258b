//! Error types for the snapshot codec.

use deen_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The input is not UTF-8 JSON holding an object.
  #[error("not a snapshot document: {0}")]
  MalformedInput(String),

  #[error(
    "unsupported snapshot format version {found} (this build reads 1 to {supported})"
  )]
  SchemaMismatch { found: String, supported: u32 },

  /// A document-level field (`exportedAt`, `collections`) is missing or has
  /// the wrong shape.
  #[error("invalid snapshot field `{field}`: {message}")]
  InvalidDocument { field: &'static str, message: String },

  #[error("unknown collection `{0}` in snapshot")]
  UnknownCollection(String),

  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
