//! Error types for `deen-core`.

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use crate::{collection::Collection, journal::MIN_SEAL_WORDS};

#[derive(Debug, Error)]
pub enum Error {
  #[error("{collection} record not found: {key}")]
  NotFound { collection: Collection, key: String },

  #[error(
    "journal entry for {date} has {words} words; sealing needs at least {}",
    MIN_SEAL_WORDS
  )]
  TooShortToSeal { date: NaiveDate, words: u32 },

  #[error("journal entry for {0} is sealed and can no longer be edited")]
  Sealed(NaiveDate),

  #[error("`{field}` of {collection} record {key} cannot change once written")]
  Immutable {
    collection: Collection,
    key:        String,
    field:      &'static str,
  },

  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn not_found(collection: Collection, key: impl fmt::Display) -> Self {
    Self::NotFound { collection, key: key.to_string() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Validation ──────────────────────────────────────────────────────────────

/// A single field-level problem found by [`crate::record::Record::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
  pub field:   &'static str,
  pub message: String,
}

impl FieldError {
  pub fn new(field: &'static str, message: impl Into<String>) -> Self {
    Self { field, message: message.into() }
  }
}

/// A record that does not conform to the field/type contract of its kind.
///
/// Names the collection and, when known, the record's position in an import
/// document, its key, and the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
  pub collection: Collection,
  pub index:      Option<usize>,
  pub key:        Option<String>,
  pub field:      Option<String>,
  pub message:    String,
}

impl ValidationError {
  pub fn new(collection: Collection, message: impl Into<String>) -> Self {
    Self {
      collection,
      index: None,
      key: None,
      field: None,
      message: message.into(),
    }
  }

  pub fn at(mut self, index: usize) -> Self {
    self.index = Some(index);
    self
  }

  pub fn key(mut self, key: Option<String>) -> Self {
    self.key = key;
    self
  }

  pub fn field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }

  /// Attach a [`FieldError`] raised by a record's own validation.
  pub fn from_field(collection: Collection, err: FieldError) -> Self {
    Self::new(collection, err.message).field(err.field)
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "invalid record in `{}`", self.collection)?;
    if let Some(index) = self.index {
      write!(f, " at index {index}")?;
    }
    if let Some(key) = &self.key {
      write!(f, " (key {key})")?;
    }
    if let Some(field) = &self.field {
      write!(f, ", field `{field}`")?;
    }
    write!(f, ": {}", self.message)
  }
}

impl std::error::Error for ValidationError {}
