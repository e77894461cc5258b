//! Command dispatch. Every command runs against any [`DeenStore`].

mod backup;
mod journal;
mod study;
mod tracker;
mod user_settings;

use std::io::Write;

use anyhow::{Context as _, Result};
use chrono::{Local, NaiveDate};
use deen_core::{Collection, store::DeenStore};
use serde::Serialize;

use crate::{args::Command, render::Output, settings::Settings};

/// The local calendar date, used when a command is not given `--date`.
fn today() -> NaiveDate { Local::now().date_naive() }

#[derive(Serialize)]
struct SchemaInfo {
  version:     u32,
  collections: Vec<Collection>,
}

pub async fn run<S: DeenStore>(
  store: &S,
  settings: &Settings,
  command: Command,
  out: &mut Output<impl Write>,
) -> Result<()> {
  match command {
    Command::Journal(command) => journal::run(store, command, out).await,
    Command::Tracker(command) => tracker::run(store, command, out).await,
    Command::Quran(command) => study::quran(store, command, out).await,
    Command::Gratitude(command) => study::gratitude(store, command, out).await,
    Command::Settings(command) => user_settings::run(store, command, out).await,
    Command::Export { scope, out: path } => backup::export(store, settings, scope, path, out).await,
    Command::Import { file, strategy } => backup::import(store, file, strategy, out).await,
    Command::Validate { file } => backup::validate(file, out).await,
    Command::Reset { yes, confirm } => backup::reset(store, yes, confirm, out).await,
    Command::Schema => {
      let info = SchemaInfo {
        version:     store.schema_version().await.context("failed to read schema version")?,
        collections: store.collections().await.context("failed to list collections")?,
      };
      out.record(&info, |info| {
        let names: Vec<_> = info.collections.iter().map(|c| c.name()).collect();
        format!("schema version {}: {}", info.version, names.join(", "))
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use clap::Parser;
  use deen_core::ibadah::PrayerStatus;
  use deen_store_sqlite::SqliteStore;
  use serde_json::Value;

  use super::*;
  use crate::args::Cli;

  fn date(day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, day).unwrap() }

  fn settings(backup_dir: &Path) -> Settings {
    Settings { store_path: ":memory:".into(), backup_dir: backup_dir.to_path_buf() }
  }

  async fn exec(store: &SqliteStore, settings: &Settings, args: &[&str]) -> Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("deen").chain(args.iter().copied()))?;
    let mut out = Output::new(Vec::new(), cli.json);
    run(store, settings, cli.command, &mut out).await?;
    Ok(String::from_utf8(out.into_inner())?)
  }

  const TEN_WORDS: &str = "one two three four five six seven eight nine ten";

  #[tokio::test]
  async fn journal_write_show_and_seal() {
    let dir = tempfile::tempdir().unwrap();
    let (store, settings) = (SqliteStore::open_in_memory().await.unwrap(), settings(dir.path()));

    exec(&store, &settings, &[
      "journal", "write", "--date", "2024-03-10", "--mood", "peace", "--tags", "sabr,shukr",
      "too short",
    ])
    .await
    .unwrap();
    assert!(
      exec(&store, &settings, &["journal", "seal", "2024-03-10"])
        .await
        .is_err()
    );

    exec(&store, &settings, &["journal", "write", "--date", "2024-03-10", TEN_WORDS])
      .await
      .unwrap();
    let shown = exec(&store, &settings, &["journal", "seal", "2024-03-10"])
      .await
      .unwrap();
    assert!(shown.contains("sealed"), "{shown}");
    assert!(shown.contains("#sabr #shukr"), "{shown}");

    let entry = store.entry(date(10)).await.unwrap().unwrap();
    assert!(entry.sealed);
    assert_eq!(entry.word_count, 10);
    assert!(
      exec(&store, &settings, &["journal", "write", "--date", "2024-03-10", "edit"])
        .await
        .is_err()
    );
  }

  #[tokio::test]
  async fn empty_write_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let (store, settings) = (SqliteStore::open_in_memory().await.unwrap(), settings(dir.path()));
    assert!(exec(&store, &settings, &["journal", "write"]).await.is_err());
    assert!(store.entries().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn tracker_flags_land_in_one_log() {
    let dir = tempfile::tempdir().unwrap();
    let (store, settings) = (SqliteStore::open_in_memory().await.unwrap(), settings(dir.path()));

    exec(&store, &settings, &[
      "tracker", "log", "--date", "2024-03-10", "--fajr", "on-time", "--isha", "1", "--qiyam",
      "true", "--pages", "4",
    ])
    .await
    .unwrap();
    exec(&store, &settings, &["tracker", "log", "--date", "2024-03-10", "--fajr", "unset"])
      .await
      .unwrap();

    let log = store.ibadah_log(date(10)).await.unwrap().unwrap();
    assert_eq!(log.fajr, None);
    assert_eq!(log.isha, Some(PrayerStatus::Late));
    assert!(log.qiyam);
    assert_eq!(log.quran_pages_read, 4);
  }

  #[tokio::test]
  async fn week_summary_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let (store, settings) = (SqliteStore::open_in_memory().await.unwrap(), settings(dir.path()));
    exec(&store, &settings, &[
      "tracker", "log", "--date", "2024-03-10", "--fajr", "on-time", "--dhuhr", "missed",
    ])
    .await
    .unwrap();

    let json = exec(&store, &settings, &["--json", "tracker", "week", "--date", "2024-03-13"])
      .await
      .unwrap();
    let week: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(week["start"], "2024-03-10");
    assert_eq!(week["end"], "2024-03-16");
    assert_eq!(week["score"], 50);
    assert_eq!(week["days"].as_array().unwrap().len(), 7);
  }

  #[tokio::test]
  async fn export_then_import_into_a_fresh_store() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let store = SqliteStore::open_in_memory().await.unwrap();
    exec(&store, &settings, &["journal", "write", "--date", "2024-03-10", TEN_WORDS])
      .await
      .unwrap();
    exec(&store, &settings, &["gratitude", "add", "a warm meal", "--category", "family"])
      .await
      .unwrap();

    let file = dir.path().join("backup.json");
    let file_arg = file.to_str().unwrap();
    let written = exec(&store, &settings, &["export", "--out", file_arg]).await.unwrap();
    assert!(written.contains("wrote 2 records"), "{written}");
    assert!(!store.entry(date(10)).await.unwrap().unwrap().pending_backup);

    let summary = exec(&store, &settings, &["--json", "validate", file_arg])
      .await
      .unwrap();
    let summary: Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(summary["formatVersion"], 1);

    let fresh = SqliteStore::open_in_memory().await.unwrap();
    let report = exec(&fresh, &settings, &["import", file_arg, "--strategy", "merge"])
      .await
      .unwrap();
    assert!(report.contains("merge: 2 records restored"), "{report}");
    assert_eq!(fresh.entry(date(10)).await.unwrap().unwrap().content_raw, TEN_WORDS);
    assert_eq!(fresh.recent_gratitude(5).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn default_export_path_uses_the_backup_dir() {
    let dir = tempfile::tempdir().unwrap();
    let (store, settings) = (SqliteStore::open_in_memory().await.unwrap(), settings(dir.path()));
    let json = exec(&store, &settings, &["--json", "export", "--scope", "core"])
      .await
      .unwrap();
    let exported: Value = serde_json::from_str(&json).unwrap();
    let path = exported["path"].as_str().unwrap();
    assert!(path.starts_with(dir.path().to_str().unwrap()));
    assert!(path.contains("deen-journal-backup-"));
    assert_eq!(exported["scope"], "core");
    assert_eq!(exported["sha256"].as_str().unwrap().len(), 64);
  }

  #[tokio::test]
  async fn invalid_backup_is_rejected_without_changes() {
    let dir = tempfile::tempdir().unwrap();
    let (store, settings) = (SqliteStore::open_in_memory().await.unwrap(), settings(dir.path()));
    exec(&store, &settings, &["tracker", "log", "--date", "2024-03-10", "--asr", "late"])
      .await
      .unwrap();

    let file = dir.path().join("bad.json");
    std::fs::write(
      &file,
      r#"{
        "formatVersion": 1,
        "exportedAt": "2024-03-11T20:15:00Z",
        "collections": { "ibadah_log": [{
          "date": "2024-03-10", "fajr": 5, "qiyam": false, "duha": false,
          "quranPagesRead": 0, "fastingType": "none"
        }] }
      }"#,
    )
    .unwrap();
    let file_arg = file.to_str().unwrap();

    let err = exec(&store, &settings, &["validate", file_arg]).await.unwrap_err();
    assert!(err.chain().any(|e| e.to_string().contains("`fajr`")), "{err:#}");

    let err = exec(&store, &settings, &["import", file_arg, "--strategy", "overwrite"])
      .await
      .unwrap_err();
    assert!(format!("{err:#}").contains("not a valid backup"), "{err:#}");
    let log = store.ibadah_log(date(10)).await.unwrap().unwrap();
    assert_eq!(log.asr, Some(PrayerStatus::Late));
  }

  #[tokio::test]
  async fn reset_needs_both_confirmations() {
    let dir = tempfile::tempdir().unwrap();
    let (store, settings) = (SqliteStore::open_in_memory().await.unwrap(), settings(dir.path()));
    exec(&store, &settings, &["journal", "write", "--date", "2024-03-10", "bismillah"])
      .await
      .unwrap();

    assert!(exec(&store, &settings, &["reset", "--yes"]).await.is_err());
    assert!(exec(&store, &settings, &["reset", "--confirm", "DELETE"]).await.is_err());
    assert!(
      exec(&store, &settings, &["reset", "--yes", "--confirm", "delete"])
        .await
        .is_err()
    );
    assert_eq!(store.entries().await.unwrap().len(), 1);

    exec(&store, &settings, &["reset", "--yes", "--confirm", "DELETE"])
      .await
      .unwrap();
    assert!(store.entries().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn settings_round_trip_through_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let (store, settings) = (SqliteStore::open_in_memory().await.unwrap(), settings(dir.path()));

    let unset = exec(&store, &settings, &["settings", "get", "theme"]).await.unwrap();
    assert_eq!(unset.trim(), "theme is not set");

    exec(&store, &settings, &["settings", "set", "hijriOffset", "-1"])
      .await
      .unwrap();
    exec(&store, &settings, &["settings", "set", "dailyReminder", "21:30"])
      .await
      .unwrap();
    assert!(
      exec(&store, &settings, &["settings", "set", "hijriOffset", "5"])
        .await
        .is_err()
    );

    let all = exec(&store, &settings, &["settings", "get"]).await.unwrap();
    assert!(all.contains("hijriOffset = -1"), "{all}");
    assert!(all.contains("dailyReminder = 21:30"), "{all}");
  }

  #[tokio::test]
  async fn reflections_and_gratitude() {
    let dir = tempfile::tempdir().unwrap();
    let (store, settings) = (SqliteStore::open_in_memory().await.unwrap(), settings(dir.path()));

    assert!(
      exec(&store, &settings, &["quran", "add", "--surah", "94", "--verse", "5"])
        .await
        .is_err()
    );
    exec(&store, &settings, &[
      "quran", "add", "--date", "2024-03-10", "--surah", "94", "--verse", "5", "--observation",
      "ease follows hardship",
    ])
    .await
    .unwrap();
    let edited = exec(&store, &settings, &["quran", "edit", "1", "--prayer", "make it easy"])
      .await
      .unwrap();
    assert!(edited.contains("observation: ease follows hardship"), "{edited}");
    assert!(edited.contains("prayer: make it easy"), "{edited}");

    let listed = exec(&store, &settings, &["quran", "list", "--date", "2024-03-10"])
      .await
      .unwrap();
    assert!(listed.starts_with("#1  2024-03-10  94:5"), "{listed}");

    exec(&store, &settings, &["gratitude", "add", "rain"]).await.unwrap();
    exec(&store, &settings, &["gratitude", "edit", "1", "--category", "nature"])
      .await
      .unwrap();
    let notes = exec(&store, &settings, &["gratitude", "list"]).await.unwrap();
    assert!(notes.contains("[nature] rain"), "{notes}");

    exec(&store, &settings, &["gratitude", "delete", "1"]).await.unwrap();
    assert!(exec(&store, &settings, &["gratitude", "delete", "1"]).await.is_err());
    exec(&store, &settings, &["quran", "delete", "1"]).await.unwrap();
    assert!(store.reflections().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn schema_lists_every_collection() {
    let dir = tempfile::tempdir().unwrap();
    let (store, settings) = (SqliteStore::open_in_memory().await.unwrap(), settings(dir.path()));
    let text = exec(&store, &settings, &["schema"]).await.unwrap();
    assert_eq!(
      text.trim(),
      "schema version 3: entries, ibadah_log, user_settings, quran_logs, gratitude_logs"
    );
  }
}
