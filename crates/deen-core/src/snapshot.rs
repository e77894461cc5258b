//! The portable snapshot document and the reconciliation vocabulary.
//!
//! A [`Document`] is what an export produces and what an import consumes:
//!
//! ```json
//! { "formatVersion": 1, "exportedAt": "...", "collections": { "entries": [...] } }
//! ```
//!
//! Decoding and validation live in `deen-snapshot`; applying a document to a
//! live store lives in the storage backend.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumString};

use crate::{
  collection::Collection,
  gratitude::GratitudeEntry,
  ibadah::IbadahLog,
  journal::JournalEntry,
  quran::QuranReflection,
  setting::Setting,
};

/// The newest document format this build reads and the one it writes.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
  pub format_version: u32,
  pub exported_at:    DateTime<Utc>,
  pub collections:    Collections,
}

impl Document {
  pub fn new(exported_at: DateTime<Utc>, collections: Collections) -> Self {
    Self { format_version: FORMAT_VERSION, exported_at, collections }
  }
}

/// Records per collection. A `None` collection is absent from the document
/// and is never touched when the document is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Collections {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub entries:        Option<Vec<JournalEntry>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ibadah_log:     Option<Vec<IbadahLog>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_settings:  Option<Vec<Setting>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub quran_logs:     Option<Vec<QuranReflection>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub gratitude_logs: Option<Vec<GratitudeEntry>>,
}

impl Collections {
  /// Number of records in `collection`, or `None` if it is absent.
  pub fn len_of(&self, collection: Collection) -> Option<usize> {
    match collection {
      Collection::Entries => self.entries.as_ref().map(Vec::len),
      Collection::IbadahLog => self.ibadah_log.as_ref().map(Vec::len),
      Collection::UserSettings => self.user_settings.as_ref().map(Vec::len),
      Collection::QuranLogs => self.quran_logs.as_ref().map(Vec::len),
      Collection::GratitudeLogs => self.gratitude_logs.as_ref().map(Vec::len),
    }
  }

  /// The collections this document covers, in declaration order.
  pub fn present(&self) -> Vec<Collection> {
    use strum::IntoEnumIterator as _;
    Collection::iter()
      .filter(|c| self.len_of(*c).is_some())
      .collect()
  }

  pub fn record_count(&self) -> usize {
    self.present().into_iter().filter_map(|c| self.len_of(c)).sum()
  }
}

// ─── Export scope ────────────────────────────────────────────────────────────

/// Which collections an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ExportScope {
  /// Every collection the store defines.
  #[default]
  Full,
  /// Journal entries and tracker logs only.
  Core,
}

impl ExportScope {
  pub fn includes(self, collection: Collection) -> bool {
    match self {
      Self::Full => true,
      Self::Core => matches!(collection, Collection::Entries | Collection::IbadahLog),
    }
  }
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

/// How an imported document is applied to the live store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Strategy {
  /// Replace every collection the document covers with its records.
  Overwrite,
  /// Insert only records whose key does not exist locally; local wins.
  Merge,
}

/// What reconciliation did to one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
  pub collection: Collection,
  /// Records removed before inserting (overwrite only).
  pub cleared:    usize,
  pub inserted:   usize,
  /// Incoming records discarded because the key already existed (merge only).
  pub kept_local: usize,
}

impl CollectionReport {
  pub fn new(collection: Collection) -> Self {
    Self { collection, cleared: 0, inserted: 0, kept_local: 0 }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
  pub strategy:    Strategy,
  pub collections: Vec<CollectionReport>,
}

impl ReconcileReport {
  pub fn inserted(&self) -> usize { self.collections.iter().map(|c| c.inserted).sum() }

  pub fn kept_local(&self) -> usize {
    self.collections.iter().map(|c| c.kept_local).sum()
  }
}
