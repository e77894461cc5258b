//! Traits shared by every record kind.
//!
//! A record kind names its collection, exposes its key, and validates itself.
//! Kinds that accept partial updates implement [`Patchable`]; kinds keyed by a
//! calendar date and created lazily implement [`DateKeyed`]; kinds keyed by a
//! store-assigned integer implement [`Surrogate`].

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, de::DeserializeOwned};

use crate::{Result, collection::Collection, error::FieldError};

pub trait Record:
  Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
  type Key: Clone + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static;

  const COLLECTION: Collection;

  fn key(&self) -> Self::Key;

  /// Domain checks beyond what the type system already guarantees.
  fn validate(&self) -> Result<(), FieldError> { Ok(()) }

  /// Called before `existing` is replaced wholesale by `self` at the same key.
  fn check_replace(&self, _existing: &Self) -> Result<()> { Ok(()) }
}

/// A record kind that can be partially updated.
pub trait Patchable: Record {
  /// The set of fields a caller may change; unspecified fields stay as they
  /// are.
  type Patch: fmt::Debug + Send + 'static;

  /// Merge `patch` into `self`, bumping modification metadata where the kind
  /// carries any.
  fn apply(&mut self, patch: Self::Patch, now: DateTime<Utc>) -> Result<()>;
}

/// A record kind with at most one record per calendar date, created on first
/// write from a single zero-value record.
pub trait DateKeyed: Patchable<Key = NaiveDate> {
  /// The record a date has before anything was written to it.
  fn blank(date: NaiveDate, now: DateTime<Utc>) -> Self;
}

/// A record kind keyed by a store-assigned, never reused integer id.
pub trait Surrogate: Record<Key = i64> {
  /// Input to an insert; everything except the id and creation timestamp.
  type New: fmt::Debug + Send + 'static;

  fn assign(new: Self::New, id: i64, now: DateTime<Utc>) -> Self;
}

/// Trim tags, drop blanks and duplicates, and keep first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut out: Vec<String> = Vec::new();
  for tag in tags {
    let tag = tag.as_ref().trim();
    if !tag.is_empty() && !out.iter().any(|t| t == tag) {
      out.push(tag.to_owned());
    }
  }
  out
}
