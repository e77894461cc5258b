//! [`SqliteStore`]: the SQLite implementation of [`DeenStore`].

use std::{path::Path, sync::Arc};

use chrono::{DateTime, NaiveDate, Utc};
use deen_core::{
  Collection, Error as CoreError,
  collection::LATEST_SCHEMA_VERSION,
  gratitude::{GratitudeEntry, GratitudePatch, NewGratitudeEntry},
  ibadah::{IbadahLog, IbadahPatch},
  journal::{JournalEntry, JournalPatch},
  quran::{NewQuranReflection, QuranReflection, QuranReflectionPatch},
  record::{DateKeyed, Patchable, Surrogate},
  setting::{Setting, SettingKey},
  snapshot::{Collections, Document, ExportScope, ReconcileReport, Strategy},
  store::DeenStore,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
  Error, Result,
  encode::{encode_date, encode_dt},
  schema,
  table::Table,
  txn::Txn,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Deen Journal store backed by a single SQLite file.
///
/// Cloning is cheap; clones share the connection and the reconciliation lock.
#[derive(Clone)]
pub struct SqliteStore {
  conn:                      tokio_rusqlite::Connection,
  pub(crate) reconcile_lock: Arc<Mutex<()>>,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, upgrading it to the newest schema.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_at(path, LATEST_SCHEMA_VERSION).await
  }

  /// Open an in-memory store at the newest schema.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_in_memory_at(LATEST_SCHEMA_VERSION).await
  }

  /// Open (or create) a store at `path`, upgrading it no further than
  /// `version`. A store already past `version` is left as it is.
  pub async fn open_at(path: impl AsRef<Path>, version: u32) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn, version).await
  }

  pub async fn open_in_memory_at(version: u32) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn, version).await
  }

  async fn init(conn: tokio_rusqlite::Connection, version: u32) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(schema::PRAGMAS)?;
        Ok(())
      })
      .await?;
    let store = Self { conn, reconcile_lock: Arc::new(Mutex::new(())) };
    store.upgrade_to(version).await?;
    Ok(store)
  }

  /// Close the underlying connection, flushing any pending work.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  /// Apply pending migrations up to `version`. Idempotent; returns the
  /// versions that were applied by this call.
  pub async fn upgrade_to(&self, version: u32) -> Result<Vec<u32>> {
    let current = self.schema_version().await?;
    for found in [current, version] {
      if found > LATEST_SCHEMA_VERSION {
        return Err(Error::UnsupportedSchemaVersion {
          found,
          supported: LATEST_SCHEMA_VERSION,
        });
      }
    }

    let applied = self
      .conn
      .call(move |conn| Ok(schema::upgrade(conn, version)?))
      .await?;
    for v in &applied {
      info!(version = v, "applied schema migration");
    }
    Ok(applied)
  }

  /// Run `body` inside one transaction. The transaction commits only if
  /// `body` returns `Ok`; otherwise none of its writes become visible.
  pub async fn run_atomic<T, F>(&self, body: F) -> Result<T>
  where
    F: FnOnce(&Txn<'_>) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    let now = Utc::now();
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let result = body(&Txn::new(&tx, now));
        match result {
          Ok(value) => {
            tx.commit()?;
            Ok(Ok(value))
          }
          // Dropping `tx` rolls back.
          Err(err) => Ok(Err(err)),
        }
      })
      .await?;
    outcome
  }

  // ── Generic table operations ──────────────────────────────────────────────

  pub async fn get<R: Table>(&self, key: R::Key) -> Result<Option<R>> {
    self.run_atomic(move |txn| txn.get::<R>(&key)).await
  }

  pub async fn put<R: Table>(&self, record: R) -> Result<()> {
    self.run_atomic(move |txn| txn.put(&record)).await
  }

  pub async fn add<R: Table + Surrogate>(&self, new: R::New) -> Result<R> {
    self.run_atomic(move |txn| txn.add::<R>(new)).await
  }

  pub async fn update<R: Table + Patchable>(
    &self,
    key: R::Key,
    patch: R::Patch,
  ) -> Result<R> {
    self.run_atomic(move |txn| txn.update::<R>(&key, patch)).await
  }

  pub async fn upsert<R: Table + DateKeyed>(
    &self,
    date: NaiveDate,
    patch: R::Patch,
  ) -> Result<R> {
    self.run_atomic(move |txn| txn.upsert::<R>(date, patch)).await
  }

  pub async fn delete<R: Table>(&self, key: R::Key) -> Result<bool> {
    self.run_atomic(move |txn| txn.delete::<R>(&key)).await
  }

  pub async fn range<R: Table>(&self, low: R::Key, high: R::Key) -> Result<Vec<R>> {
    self.run_atomic(move |txn| txn.range::<R>(&low, &high)).await
  }

  /// Collections that exist at the store's current schema version.
  pub async fn list_collections(&self) -> Result<Vec<Collection>> {
    Ok(Collection::available_at(self.schema_version().await?))
  }
}

/// Run `$body` with `$R` bound to the record type of `$collection`.
macro_rules! with_record_type {
  ($collection:expr, $R:ident => $body:expr) => {
    match $collection {
      Collection::Entries => {
        type $R = JournalEntry;
        $body
      }
      Collection::IbadahLog => {
        type $R = IbadahLog;
        $body
      }
      Collection::UserSettings => {
        type $R = Setting;
        $body
      }
      Collection::QuranLogs => {
        type $R = QuranReflection;
        $body
      }
      Collection::GratitudeLogs => {
        type $R = GratitudeEntry;
        $body
      }
    }
  };
}

// ─── DeenStore impl ──────────────────────────────────────────────────────────

impl DeenStore for SqliteStore {
  type Error = Error;

  async fn schema_version(&self) -> Result<u32> {
    Ok(self.conn.call(|conn| Ok(schema::user_version(conn)?)).await?)
  }

  async fn collections(&self) -> Result<Vec<Collection>> { self.list_collections().await }

  // ── Journal ───────────────────────────────────────────────────────────────

  async fn entry(&self, date: NaiveDate) -> Result<Option<JournalEntry>> {
    self.get::<JournalEntry>(date).await
  }

  async fn write_entry(&self, date: NaiveDate, patch: JournalPatch) -> Result<JournalEntry> {
    self.upsert::<JournalEntry>(date, patch).await
  }

  async fn update_entry(&self, date: NaiveDate, patch: JournalPatch) -> Result<JournalEntry> {
    self.update::<JournalEntry>(date, patch).await
  }

  async fn seal_entry(&self, date: NaiveDate) -> Result<JournalEntry> {
    self
      .run_atomic(move |txn| {
        let mut entry = txn
          .get::<JournalEntry>(&date)?
          .ok_or_else(|| CoreError::not_found(Collection::Entries, date))?;
        entry.seal(txn.now())?;
        txn.put(&entry)?;
        Ok(entry)
      })
      .await
  }

  async fn entries(&self) -> Result<Vec<JournalEntry>> {
    self
      .run_atomic(|txn| txn.select("ORDER BY date DESC", &[]))
      .await
  }

  async fn entries_between(
    &self,
    from: NaiveDate,
    to: NaiveDate,
  ) -> Result<Vec<JournalEntry>> {
    self.range::<JournalEntry>(from, to).await
  }

  async fn search_entries(&self, query: &str) -> Result<Vec<JournalEntry>> {
    let needle = query.trim().to_lowercase();
    let mut entries = self.entries().await?;
    if !needle.is_empty() {
      entries.retain(|e| {
        e.content_raw.to_lowercase().contains(&needle)
          || e.tags.iter().any(|t| t.to_lowercase().contains(&needle))
      });
    }
    Ok(entries)
  }

  async fn mark_backed_up(&self, as_of: DateTime<Utc>) -> Result<usize> {
    let as_of_str = encode_dt(as_of);
    let updated = self
      .run_atomic(move |txn| {
        txn.execute(
          "UPDATE entries SET pending_backup = 0
           WHERE pending_backup = 1 AND last_modified <= ?1",
          &[&as_of_str],
        )
      })
      .await?;
    debug!(updated, %as_of, "cleared pending-backup markers");
    Ok(updated)
  }

  // ── Tracker ───────────────────────────────────────────────────────────────

  async fn ibadah_log(&self, date: NaiveDate) -> Result<Option<IbadahLog>> {
    self.get::<IbadahLog>(date).await
  }

  async fn log_ibadah(&self, date: NaiveDate, patch: IbadahPatch) -> Result<IbadahLog> {
    self.upsert::<IbadahLog>(date, patch).await
  }

  async fn ibadah_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<IbadahLog>> {
    self.range::<IbadahLog>(from, to).await
  }

  // ── Quran reflections ─────────────────────────────────────────────────────

  async fn add_reflection(&self, input: NewQuranReflection) -> Result<QuranReflection> {
    self.add::<QuranReflection>(input).await
  }

  async fn reflection(&self, id: i64) -> Result<Option<QuranReflection>> {
    self.get::<QuranReflection>(id).await
  }

  async fn update_reflection(
    &self,
    id: i64,
    patch: QuranReflectionPatch,
  ) -> Result<QuranReflection> {
    self.update::<QuranReflection>(id, patch).await
  }

  async fn reflections(&self) -> Result<Vec<QuranReflection>> {
    self
      .run_atomic(|txn| txn.select("ORDER BY created_at DESC, id DESC", &[]))
      .await
  }

  async fn reflections_on(&self, date: NaiveDate) -> Result<Vec<QuranReflection>> {
    let date = encode_date(date);
    self
      .run_atomic(move |txn| txn.select("WHERE date = ?1 ORDER BY created_at, id", &[&date]))
      .await
  }

  async fn delete_reflection(&self, id: i64) -> Result<bool> {
    self.delete::<QuranReflection>(id).await
  }

  // ── Gratitude ─────────────────────────────────────────────────────────────

  async fn add_gratitude(&self, input: NewGratitudeEntry) -> Result<GratitudeEntry> {
    self.add::<GratitudeEntry>(input).await
  }

  async fn gratitude(&self, id: i64) -> Result<Option<GratitudeEntry>> {
    self.get::<GratitudeEntry>(id).await
  }

  async fn update_gratitude(&self, id: i64, patch: GratitudePatch) -> Result<GratitudeEntry> {
    self.update::<GratitudeEntry>(id, patch).await
  }

  async fn recent_gratitude(&self, limit: usize) -> Result<Vec<GratitudeEntry>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    self
      .run_atomic(move |txn| {
        txn.select("ORDER BY created_at DESC, id DESC LIMIT ?1", &[&limit])
      })
      .await
  }

  async fn delete_gratitude(&self, id: i64) -> Result<bool> {
    self.delete::<GratitudeEntry>(id).await
  }

  // ── Settings ──────────────────────────────────────────────────────────────

  async fn setting(&self, key: SettingKey) -> Result<Option<Setting>> {
    self.get::<Setting>(key).await
  }

  async fn put_setting(&self, setting: Setting) -> Result<()> { self.put(setting).await }

  async fn settings(&self) -> Result<Vec<Setting>> {
    self.run_atomic(|txn| txn.all::<Setting>()).await
  }

  // ── Backup ────────────────────────────────────────────────────────────────

  async fn export(&self, scope: ExportScope) -> Result<Document> {
    let available = self.list_collections().await?;
    let document = self
      .run_atomic(move |txn| {
        let wanted = |c: Collection| scope.includes(c) && available.contains(&c);
        let mut collections = Collections::default();
        if wanted(Collection::Entries) {
          collections.entries = Some(txn.all()?);
        }
        if wanted(Collection::IbadahLog) {
          collections.ibadah_log = Some(txn.all()?);
        }
        if wanted(Collection::UserSettings) {
          collections.user_settings = Some(txn.all()?);
        }
        if wanted(Collection::QuranLogs) {
          collections.quran_logs = Some(txn.all()?);
        }
        if wanted(Collection::GratitudeLogs) {
          collections.gratitude_logs = Some(txn.all()?);
        }
        Ok(Document::new(txn.now(), collections))
      })
      .await?;
    info!(
      %scope,
      records = document.collections.record_count(),
      "exported snapshot"
    );
    Ok(document)
  }

  async fn reconcile(
    &self,
    document: Document,
    strategy: Strategy,
  ) -> Result<ReconcileReport> {
    self.reconcile_document(document, strategy).await
  }

  async fn clear_all(&self) -> Result<()> {
    let available = self.list_collections().await?;
    let cleared = self
      .run_atomic(move |txn| {
        let mut total = 0;
        for collection in available {
          total += with_record_type!(collection, R => txn.clear::<R>()?);
        }
        Ok(total)
      })
      .await?;
    info!(records = cleared, "cleared every collection");
    Ok(())
  }
}
