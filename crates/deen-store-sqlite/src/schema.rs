//! Versioned SQL schema for the Deen Journal SQLite store.
//!
//! The current version lives in `PRAGMA user_version`. Each migration is
//! additive, runs in its own transaction, and bumps `user_version` in that
//! same transaction, so an interrupted upgrade resumes from the last completed
//! step.

use rusqlite::Connection;

/// Per-connection settings; not part of any migration.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

pub struct Migration {
  pub version: u32,
  pub sql:     &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
  Migration { version: 1, sql: V1 },
  Migration { version: 2, sql: V2 },
  Migration { version: 3, sql: V3 },
];

/// Journal, tracker and settings.
const V1: &str = "
CREATE TABLE IF NOT EXISTS entries (
    date           TEXT PRIMARY KEY,      -- YYYY-MM-DD
    content_raw    TEXT NOT NULL DEFAULT '',
    content_html   TEXT,
    prompt_id      TEXT,
    tags           TEXT NOT NULL DEFAULT '[]',
    mood           TEXT NOT NULL DEFAULT 'neutral',
    word_count     INTEGER NOT NULL DEFAULT 0,
    sealed         INTEGER NOT NULL DEFAULT 0,
    last_modified  TEXT NOT NULL,         -- RFC 3339 UTC, fixed width
    pending_backup INTEGER NOT NULL DEFAULT 1
);

-- Prayer slots: NULL is unset, otherwise 0 missed / 1 late / 2 on time.
CREATE TABLE IF NOT EXISTS ibadah_log (
    date             TEXT PRIMARY KEY,
    fajr             INTEGER CHECK (fajr    IN (0, 1, 2)),
    dhuhr            INTEGER CHECK (dhuhr   IN (0, 1, 2)),
    asr              INTEGER CHECK (asr     IN (0, 1, 2)),
    maghrib          INTEGER CHECK (maghrib IN (0, 1, 2)),
    isha             INTEGER CHECK (isha    IN (0, 1, 2)),
    qiyam            INTEGER NOT NULL DEFAULT 0,
    duha             INTEGER NOT NULL DEFAULT 0,
    quran_pages_read INTEGER NOT NULL DEFAULT 0 CHECK (quran_pages_read >= 0),
    fasting_type     TEXT NOT NULL DEFAULT 'none'
);

CREATE TABLE IF NOT EXISTS user_settings (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL                   -- JSON-encoded typed value
);
";

/// Quran reflections and gratitude notes. AUTOINCREMENT keeps ids from being
/// reused after deletes.
const V2: &str = "
CREATE TABLE IF NOT EXISTS quran_logs (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    date        TEXT NOT NULL,
    surah       INTEGER NOT NULL CHECK (surah BETWEEN 1 AND 114),
    verse       INTEGER NOT NULL CHECK (verse >= 1),
    verse_text  TEXT NOT NULL DEFAULT '',
    observation TEXT NOT NULL DEFAULT '',
    application TEXT NOT NULL DEFAULT '',
    prayer      TEXT NOT NULL DEFAULT '',
    tags        TEXT NOT NULL DEFAULT '[]',
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS gratitude_logs (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    date       TEXT NOT NULL,
    content    TEXT NOT NULL,
    category   TEXT,
    created_at TEXT NOT NULL
);
";

const V3: &str = "
CREATE INDEX IF NOT EXISTS entries_sealed_idx         ON entries(sealed);
CREATE INDEX IF NOT EXISTS entries_pending_backup_idx ON entries(pending_backup);
CREATE INDEX IF NOT EXISTS quran_logs_date_idx        ON quran_logs(date);
CREATE INDEX IF NOT EXISTS gratitude_logs_date_idx    ON gratitude_logs(date);
CREATE INDEX IF NOT EXISTS gratitude_logs_created_idx ON gratitude_logs(created_at);
";

pub fn user_version(conn: &Connection) -> rusqlite::Result<u32> {
  conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

/// Apply every migration above the current version up to and including
/// `target`. Returns the versions that were applied.
pub fn upgrade(conn: &mut Connection, target: u32) -> rusqlite::Result<Vec<u32>> {
  let current = user_version(conn)?;
  let mut applied = Vec::new();

  for migration in MIGRATIONS
    .iter()
    .filter(|m| m.version > current && m.version <= target)
  {
    let tx = conn.transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.pragma_update(None, "user_version", migration.version)?;
    tx.commit()?;
    applied.push(migration.version);
  }

  Ok(applied)
}
