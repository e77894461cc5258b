//! Error type for `deen-store-sqlite`.

use deen_core::{Collection, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] deen_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored column value that does not map back onto its domain type.
  #[error("cannot decode `{column}` in {collection}: {message}")]
  Decode {
    collection: Collection,
    column:     &'static str,
    message:    String,
  },

  #[error("a reconciliation is already in progress")]
  ConcurrentReconciliationInProgress,

  #[error("schema version {found} is not supported (newest known is {supported})")]
  UnsupportedSchemaVersion { found: u32, supported: u32 },
}

impl Error {
  /// True when the error is a missing-record error, so callers can fall back
  /// to an upsert.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::Core(deen_core::Error::NotFound { .. }))
  }
}

impl From<ValidationError> for Error {
  fn from(err: ValidationError) -> Self { Self::Core(err.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
