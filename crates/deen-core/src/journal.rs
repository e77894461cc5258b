//! Journal entries: one free-text page per calendar date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
  Error, Result,
  collection::Collection,
  error::FieldError,
  record::{DateKeyed, Patchable, Record, normalize_tags},
};

/// An entry can only be sealed once it holds at least this many words.
pub const MIN_SEAL_WORDS: u32 = 10;

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> u32 {
  u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Mood {
  Peace,
  Struggle,
  #[default]
  Neutral,
  HighResolve,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
  pub date:           NaiveDate,
  pub content_raw:    String,
  /// Rendered form of `content_raw`, if the editor produced one.
  pub content_html:   Option<String>,
  pub prompt_id:      Option<String>,
  /// Set semantics for lookup; insertion order is kept for display.
  pub tags:           Vec<String>,
  pub mood:           Mood,
  /// Always derived from `content_raw`; never set directly.
  pub word_count:     u32,
  pub sealed:         bool,
  pub last_modified:  DateTime<Utc>,
  /// True when the entry changed since the last acknowledged backup.
  pub pending_backup: bool,
}

impl JournalEntry {
  /// Seal the entry. Re-sealing an already sealed entry only refreshes the
  /// seal timestamp.
  pub fn seal(&mut self, now: DateTime<Utc>) -> Result<()> {
    if self.word_count < MIN_SEAL_WORDS {
      return Err(Error::TooShortToSeal {
        date:  self.date,
        words: self.word_count,
      });
    }
    self.sealed = true;
    self.last_modified = now;
    self.pending_backup = true;
    Ok(())
  }

  fn same_content(&self, other: &Self) -> bool {
    self.content_raw == other.content_raw
      && self.content_html == other.content_html
      && self.prompt_id == other.prompt_id
      && self.tags == other.tags
      && self.mood == other.mood
      && self.word_count == other.word_count
  }
}

impl Record for JournalEntry {
  type Key = NaiveDate;

  const COLLECTION: Collection = Collection::Entries;

  fn key(&self) -> NaiveDate { self.date }

  fn validate(&self) -> Result<(), FieldError> {
    let counted = word_count(&self.content_raw);
    if self.word_count != counted {
      return Err(FieldError::new(
        "wordCount",
        format!("{} does not match the {counted} words in contentRaw", self.word_count),
      ));
    }
    if self.sealed && self.word_count < MIN_SEAL_WORDS {
      return Err(FieldError::new(
        "wordCount",
        format!(
          "a sealed entry needs at least {MIN_SEAL_WORDS} words, found {}",
          self.word_count
        ),
      ));
    }
    if self.tags.iter().any(|t| t.trim().is_empty()) {
      return Err(FieldError::new("tags", "tags must not be blank"));
    }
    Ok(())
  }

  fn check_replace(&self, existing: &Self) -> Result<()> {
    if existing.sealed && (!self.sealed || !self.same_content(existing)) {
      return Err(Error::Sealed(existing.date));
    }
    Ok(())
  }
}

impl DateKeyed for JournalEntry {
  fn blank(date: NaiveDate, now: DateTime<Utc>) -> Self {
    Self {
      date,
      content_raw: String::new(),
      content_html: None,
      prompt_id: None,
      tags: Vec::new(),
      mood: Mood::default(),
      word_count: 0,
      sealed: false,
      last_modified: now,
      pending_backup: true,
    }
  }
}

// ─── Patch ───────────────────────────────────────────────────────────────────

/// Partial update of a [`JournalEntry`]. `None` leaves a field unchanged;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalPatch {
  pub content_raw:  Option<String>,
  pub content_html: Option<Option<String>>,
  pub prompt_id:    Option<Option<String>>,
  pub tags:         Option<Vec<String>>,
  pub mood:         Option<Mood>,
}

impl JournalPatch {
  pub fn content(text: impl Into<String>) -> Self {
    Self { content_raw: Some(text.into()), ..Self::default() }
  }

  pub fn with_html(mut self, html: Option<String>) -> Self {
    self.content_html = Some(html);
    self
  }

  pub fn with_prompt(mut self, prompt_id: Option<String>) -> Self {
    self.prompt_id = Some(prompt_id);
    self
  }

  pub fn with_tags<I, S>(mut self, tags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    self.tags = Some(normalize_tags(tags));
    self
  }

  pub fn with_mood(mut self, mood: Mood) -> Self {
    self.mood = Some(mood);
    self
  }

  pub fn is_empty(&self) -> bool { *self == Self::default() }

  /// Combine two patches; fields set in `later` win.
  pub fn merge(self, later: Self) -> Self {
    Self {
      content_raw:  later.content_raw.or(self.content_raw),
      content_html: later.content_html.or(self.content_html),
      prompt_id:    later.prompt_id.or(self.prompt_id),
      tags:         later.tags.or(self.tags),
      mood:         later.mood.or(self.mood),
    }
  }
}

impl Patchable for JournalEntry {
  type Patch = JournalPatch;

  fn apply(&mut self, patch: JournalPatch, now: DateTime<Utc>) -> Result<()> {
    if patch.is_empty() {
      return Ok(());
    }
    if self.sealed {
      return Err(Error::Sealed(self.date));
    }
    if let Some(content) = patch.content_raw {
      self.word_count = word_count(&content);
      self.content_raw = content;
    }
    if let Some(html) = patch.content_html {
      self.content_html = html;
    }
    if let Some(prompt_id) = patch.prompt_id {
      self.prompt_id = prompt_id;
    }
    if let Some(tags) = patch.tags {
      self.tags = normalize_tags(tags);
    }
    if let Some(mood) = patch.mood {
      self.mood = mood;
    }
    self.last_modified = now;
    self.pending_backup = true;
    Ok(())
  }
}
