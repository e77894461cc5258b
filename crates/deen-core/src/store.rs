//! The `DeenStore` trait: the read/write surface offered to the journal,
//! tracker, study and settings screens, plus the backup flow.
//!
//! The trait is implemented by storage backends (e.g. `deen-store-sqlite`).
//! Front ends (`deen-cli`) depend on this abstraction, not on a concrete
//! backend.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
  collection::Collection,
  gratitude::{GratitudeEntry, GratitudePatch, NewGratitudeEntry},
  ibadah::{IbadahLog, IbadahPatch},
  journal::{JournalEntry, JournalPatch},
  quran::{NewQuranReflection, QuranReflection, QuranReflectionPatch},
  setting::{Setting, SettingKey},
  snapshot::{Document, ExportScope, ReconcileReport, Strategy},
};

/// Abstraction over a Deen Journal store backend.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait DeenStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Store ─────────────────────────────────────────────────────────────

  /// The schema version the store is currently at.
  fn schema_version(
    &self,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  /// Collections defined at the current schema version.
  fn collections(
    &self,
  ) -> impl Future<Output = Result<Vec<Collection>, Self::Error>> + Send + '_;

  // ── Journal ───────────────────────────────────────────────────────────

  fn entry(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<JournalEntry>, Self::Error>> + Send + '_;

  /// Create the entry for `date` if needed, then apply `patch`.
  fn write_entry(
    &self,
    date: NaiveDate,
    patch: JournalPatch,
  ) -> impl Future<Output = Result<JournalEntry, Self::Error>> + Send + '_;

  /// Apply `patch` to an existing entry. Fails with a not-found error if
  /// there is no entry for `date`.
  fn update_entry(
    &self,
    date: NaiveDate,
    patch: JournalPatch,
  ) -> impl Future<Output = Result<JournalEntry, Self::Error>> + Send + '_;

  /// Seal an entry, making its content immutable.
  fn seal_entry(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<JournalEntry, Self::Error>> + Send + '_;

  /// All entries, newest date first.
  fn entries(
    &self,
  ) -> impl Future<Output = Result<Vec<JournalEntry>, Self::Error>> + Send + '_;

  /// Entries with `from <= date <= to`, oldest first.
  fn entries_between(
    &self,
    from: NaiveDate,
    to: NaiveDate,
  ) -> impl Future<Output = Result<Vec<JournalEntry>, Self::Error>> + Send + '_;

  /// Case-insensitive substring search over content and tags, newest first.
  fn search_entries<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Vec<JournalEntry>, Self::Error>> + Send + 'a;

  /// Mark entries last modified at or before `as_of` as backed up. Returns
  /// the number of entries updated.
  fn mark_backed_up(
    &self,
    as_of: DateTime<Utc>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Tracker ───────────────────────────────────────────────────────────

  fn ibadah_log(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<IbadahLog>, Self::Error>> + Send + '_;

  /// Create the log for `date` if needed, then apply `patch` atomically.
  fn log_ibadah(
    &self,
    date: NaiveDate,
    patch: IbadahPatch,
  ) -> impl Future<Output = Result<IbadahLog, Self::Error>> + Send + '_;

  /// Logs with `from <= date <= to`, oldest first.
  fn ibadah_between(
    &self,
    from: NaiveDate,
    to: NaiveDate,
  ) -> impl Future<Output = Result<Vec<IbadahLog>, Self::Error>> + Send + '_;

  // ── Quran reflections ─────────────────────────────────────────────────

  fn add_reflection(
    &self,
    input: NewQuranReflection,
  ) -> impl Future<Output = Result<QuranReflection, Self::Error>> + Send + '_;

  fn reflection(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<QuranReflection>, Self::Error>> + Send + '_;

  fn update_reflection(
    &self,
    id: i64,
    patch: QuranReflectionPatch,
  ) -> impl Future<Output = Result<QuranReflection, Self::Error>> + Send + '_;

  /// All reflections, most recently created first.
  fn reflections(
    &self,
  ) -> impl Future<Output = Result<Vec<QuranReflection>, Self::Error>> + Send + '_;

  fn reflections_on(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<QuranReflection>, Self::Error>> + Send + '_;

  /// Returns `false` if nothing was stored under `id`.
  fn delete_reflection(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Gratitude ─────────────────────────────────────────────────────────

  fn add_gratitude(
    &self,
    input: NewGratitudeEntry,
  ) -> impl Future<Output = Result<GratitudeEntry, Self::Error>> + Send + '_;

  fn gratitude(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<GratitudeEntry>, Self::Error>> + Send + '_;

  fn update_gratitude(
    &self,
    id: i64,
    patch: GratitudePatch,
  ) -> impl Future<Output = Result<GratitudeEntry, Self::Error>> + Send + '_;

  /// At most `limit` notes, most recently created first.
  fn recent_gratitude(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<GratitudeEntry>, Self::Error>> + Send + '_;

  fn delete_gratitude(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Settings ──────────────────────────────────────────────────────────

  fn setting(
    &self,
    key: SettingKey,
  ) -> impl Future<Output = Result<Option<Setting>, Self::Error>> + Send + '_;

  fn put_setting(
    &self,
    setting: Setting,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn settings(
    &self,
  ) -> impl Future<Output = Result<Vec<Setting>, Self::Error>> + Send + '_;

  // ── Backup ────────────────────────────────────────────────────────────

  /// Read every collection in `scope` into a [`Document`]. Never writes.
  fn export(
    &self,
    scope: ExportScope,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Apply a validated document under `strategy`, all or nothing.
  fn reconcile(
    &self,
    document: Document,
    strategy: Strategy,
  ) -> impl Future<Output = Result<ReconcileReport, Self::Error>> + Send + '_;

  /// Empty every collection in one transaction.
  fn clear_all(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
