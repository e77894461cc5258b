//! Gratitude notes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  collection::Collection,
  error::FieldError,
  record::{Patchable, Record, Surrogate},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GratitudeEntry {
  pub id:         i64,
  pub date:       NaiveDate,
  pub content:    String,
  pub category:   Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::DeenStore::add_gratitude`].
#[derive(Debug, Clone)]
pub struct NewGratitudeEntry {
  pub date:     NaiveDate,
  pub content:  String,
  pub category: Option<String>,
}

impl Record for GratitudeEntry {
  type Key = i64;

  const COLLECTION: Collection = Collection::GratitudeLogs;

  fn key(&self) -> i64 { self.id }

  fn validate(&self) -> Result<(), FieldError> {
    if self.content.trim().is_empty() {
      return Err(FieldError::new("content", "gratitude note is empty"));
    }
    Ok(())
  }
}

impl Surrogate for GratitudeEntry {
  type New = NewGratitudeEntry;

  fn assign(new: NewGratitudeEntry, id: i64, now: DateTime<Utc>) -> Self {
    Self {
      id,
      date: new.date,
      content: new.content.trim().to_owned(),
      category: new
        .category
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty()),
      created_at: now,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GratitudePatch {
  pub content:  Option<String>,
  pub category: Option<Option<String>>,
}

impl Patchable for GratitudeEntry {
  type Patch = GratitudePatch;

  fn apply(&mut self, patch: GratitudePatch, _now: DateTime<Utc>) -> Result<()> {
    if let Some(content) = patch.content {
      self.content = content.trim().to_owned();
    }
    if let Some(category) = patch.category {
      self.category = category;
    }
    Ok(())
  }
}
