//! [`Txn`]: the synchronous, generic table operations available inside
//! [`crate::SqliteStore::run_atomic`].
//!
//! Every method runs against the open transaction, so a closure that combines
//! several of them commits all of its writes together or none at all.

use chrono::{DateTime, Utc};
use deen_core::{
  Error as CoreError, ValidationError,
  record::{DateKeyed, Patchable, Record, Surrogate},
};
use rusqlite::{Connection, OptionalExtension as _, ToSql};

use crate::{Result, table::Table};

/// A handle on one open transaction.
///
/// `now` is fixed when the transaction starts and used for every timestamp
/// the transaction writes.
pub struct Txn<'c> {
  conn: &'c Connection,
  now:  DateTime<Utc>,
}

impl<'c> Txn<'c> {
  pub(crate) fn new(conn: &'c Connection, now: DateTime<Utc>) -> Self {
    Self { conn, now }
  }

  pub fn now(&self) -> DateTime<Utc> { self.now }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub fn get<R: Table>(&self, key: &R::Key) -> Result<Option<R>> {
    let sql = format!(
      "SELECT {} FROM {} WHERE {} = ?1",
      R::COLUMNS.join(", "),
      R::table(),
      R::KEY_COLUMN
    );
    let mut stmt = self.conn.prepare(&sql)?;
    let mut rows = stmt.query([R::key_value(key)])?;
    match rows.next()? {
      Some(row) => Ok(Some(R::from_row(row)?)),
      None => Ok(None),
    }
  }

  pub fn contains<R: Table>(&self, key: &R::Key) -> Result<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE {} = ?1", R::table(), R::KEY_COLUMN);
    Ok(
      self
        .conn
        .query_row(&sql, [R::key_value(key)], |_| Ok(()))
        .optional()?
        .is_some(),
    )
  }

  /// Records with `low <= key <= high`, in key order.
  pub fn range<R: Table>(&self, low: &R::Key, high: &R::Key) -> Result<Vec<R>> {
    let (low, high) = (R::key_value(low), R::key_value(high));
    self.select(
      &format!("WHERE {0} BETWEEN ?1 AND ?2 ORDER BY {0}", R::KEY_COLUMN),
      &[&low, &high],
    )
  }

  /// Every record in the collection, in key order.
  pub fn all<R: Table>(&self) -> Result<Vec<R>> {
    self.select(&format!("ORDER BY {}", R::KEY_COLUMN), &[])
  }

  /// `SELECT <all columns> FROM <table> <tail>`, decoding every row.
  pub fn select<R: Table>(&self, tail: &str, params: &[&dyn ToSql]) -> Result<Vec<R>> {
    let sql = format!("SELECT {} FROM {} {tail}", R::COLUMNS.join(", "), R::table());
    let mut stmt = self.conn.prepare(&sql)?;
    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
      out.push(R::from_row(row)?);
    }
    Ok(out)
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Replace the record stored at `record`'s key, or insert it.
  pub fn put<R: Table>(&self, record: &R) -> Result<()> {
    validate(record)?;
    if let Some(existing) = self.get::<R>(&record.key())? {
      record.check_replace(&existing)?;
    }
    self.write(record, "INSERT OR REPLACE")
  }

  /// Insert a record whose key must not exist yet.
  pub fn insert<R: Table>(&self, record: &R) -> Result<()> {
    validate(record)?;
    self.write(record, "INSERT")
  }

  /// Allocate the next unused id and insert the record built from `new`.
  pub fn add<R: Table + Surrogate>(&self, new: R::New) -> Result<R> {
    let id = self.next_id::<R>()?;
    let record = R::assign(new, id, self.now);
    self.insert(&record)?;
    Ok(record)
  }

  /// Merge `patch` into the existing record at `key`.
  pub fn update<R: Table + Patchable>(&self, key: &R::Key, patch: R::Patch) -> Result<R> {
    let mut record = self
      .get::<R>(key)?
      .ok_or_else(|| CoreError::not_found(R::COLLECTION, key))?;
    record.apply(patch, self.now)?;
    self.put(&record)?;
    Ok(record)
  }

  /// Merge `patch` into the record for `date`, starting from
  /// [`DateKeyed::blank`] when there is none yet.
  pub fn upsert<R: Table + DateKeyed>(
    &self,
    date: chrono::NaiveDate,
    patch: R::Patch,
  ) -> Result<R> {
    let mut record = match self.get::<R>(&date)? {
      Some(record) => record,
      None => R::blank(date, self.now),
    };
    record.apply(patch, self.now)?;
    self.put(&record)?;
    Ok(record)
  }

  /// Returns `false` if nothing was stored under `key`.
  pub fn delete<R: Table>(&self, key: &R::Key) -> Result<bool> {
    let sql = format!("DELETE FROM {} WHERE {} = ?1", R::table(), R::KEY_COLUMN);
    Ok(self.conn.execute(&sql, [R::key_value(key)])? > 0)
  }

  /// Delete every record in the collection. Id sequences are kept.
  pub fn clear<R: Table>(&self) -> Result<usize> {
    Ok(self.conn.execute(&format!("DELETE FROM {}", R::table()), [])?)
  }

  /// Run a statement that is not tied to one collection.
  pub fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> Result<usize> {
    Ok(self.conn.execute(sql, params)?)
  }

  fn write<R: Table>(&self, record: &R, verb: &str) -> Result<()> {
    let placeholders = (1..=R::COLUMNS.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!(
      "{verb} INTO {} ({}) VALUES ({placeholders})",
      R::table(),
      R::COLUMNS.join(", ")
    );
    self
      .conn
      .execute(&sql, rusqlite::params_from_iter(record.to_row()?))?;
    Ok(())
  }

  /// One past the highest id ever handed out, including deleted ones.
  fn next_id<R: Table>(&self) -> Result<i64> {
    let seq: i64 = self.conn.query_row(
      "SELECT COALESCE((SELECT seq FROM sqlite_sequence WHERE name = ?1), 0)",
      [R::table()],
      |row| row.get(0),
    )?;
    let max: i64 = self.conn.query_row(
      &format!("SELECT COALESCE(MAX({}), 0) FROM {}", R::KEY_COLUMN, R::table()),
      [],
      |row| row.get(0),
    )?;
    Ok(seq.max(max) + 1)
  }
}

fn validate<R: Record>(record: &R) -> Result<()> {
  record.validate().map_err(|err| {
    ValidationError::from_field(R::COLLECTION, err)
      .key(Some(record.key().to_string()))
      .into()
  })
}
