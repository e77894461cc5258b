//! Quran-study reflections.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  collection::Collection,
  error::FieldError,
  record::{Patchable, Record, Surrogate, normalize_tags},
};

/// Number of surahs; valid surah numbers are `1..=SURAH_COUNT`.
pub const SURAH_COUNT: u16 = 114;

/// The verse snapshot is cut to this many characters when a reflection is
/// created.
pub const VERSE_SNAPSHOT_CHARS: usize = 200;

/// A reflection in three named sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reflection {
  pub observation: String,
  pub application: String,
  pub prayer:      String,
}

impl Reflection {
  pub fn is_blank(&self) -> bool {
    self.observation.trim().is_empty()
      && self.application.trim().is_empty()
      && self.prayer.trim().is_empty()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuranReflection {
  pub id:         i64,
  pub date:       NaiveDate,
  pub surah:      u16,
  pub verse:      u16,
  /// Denormalised copy of the verse text; never changes after creation.
  pub verse_text: String,
  pub reflection: Reflection,
  pub tags:       Vec<String>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::DeenStore::add_reflection`]. The id and
/// `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewQuranReflection {
  pub date:       NaiveDate,
  pub surah:      u16,
  pub verse:      u16,
  pub verse_text: String,
  pub reflection: Reflection,
  pub tags:       Vec<String>,
}

impl Record for QuranReflection {
  type Key = i64;

  const COLLECTION: Collection = Collection::QuranLogs;

  fn key(&self) -> i64 { self.id }

  fn validate(&self) -> Result<(), FieldError> {
    if !(1..=SURAH_COUNT).contains(&self.surah) {
      return Err(FieldError::new(
        "surah",
        format!("surah must be between 1 and {SURAH_COUNT}, got {}", self.surah),
      ));
    }
    if self.verse == 0 {
      return Err(FieldError::new("verse", "verse numbers start at 1"));
    }
    if self.reflection.is_blank() {
      return Err(FieldError::new(
        "reflection",
        "at least one of observation, application or prayer is required",
      ));
    }
    Ok(())
  }

  fn check_replace(&self, existing: &Self) -> Result<()> {
    if self.verse_text != existing.verse_text {
      return Err(Error::Immutable {
        collection: Self::COLLECTION,
        key:        self.id.to_string(),
        field:      "verseText",
      });
    }
    Ok(())
  }
}

impl Surrogate for QuranReflection {
  type New = NewQuranReflection;

  fn assign(new: NewQuranReflection, id: i64, now: DateTime<Utc>) -> Self {
    Self {
      id,
      date: new.date,
      surah: new.surah,
      verse: new.verse,
      verse_text: new.verse_text.chars().take(VERSE_SNAPSHOT_CHARS).collect(),
      reflection: new.reflection,
      tags: normalize_tags(new.tags),
      created_at: now,
    }
  }
}

/// Partial update of a [`QuranReflection`]. The verse reference and its text
/// snapshot are not editable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuranReflectionPatch {
  pub reflection: Option<Reflection>,
  pub tags:       Option<Vec<String>>,
}

impl Patchable for QuranReflection {
  type Patch = QuranReflectionPatch;

  fn apply(&mut self, patch: QuranReflectionPatch, _now: DateTime<Utc>) -> Result<()> {
    if let Some(reflection) = patch.reflection {
      self.reflection = reflection;
    }
    if let Some(tags) = patch.tags {
      self.tags = normalize_tags(tags);
    }
    Ok(())
  }
}
