//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{NaiveDate, Utc};
use deen_core::{
  Collection, Error as CoreError,
  gratitude::{GratitudePatch, NewGratitudeEntry},
  ibadah::{FastingType, IbadahPatch, Prayer, PrayerStatus},
  journal::{JournalEntry, JournalPatch, Mood},
  quran::{NewQuranReflection, QuranReflectionPatch, Reflection},
  setting::{Setting, SettingKey, Theme},
  snapshot::{Collections, Document, ExportScope, Strategy},
  store::DeenStore,
  views::completion_score,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn d(day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, day).unwrap() }

const NINE_WORDS: &str = "one two three four five six seven eight nine";
const TEN_WORDS: &str = "one two three four five six seven eight nine ten";

fn reflection_on(date: NaiveDate, note: &str) -> NewQuranReflection {
  NewQuranReflection {
    date,
    surah: 94,
    verse: 5,
    verse_text: "Indeed, with hardship comes ease.".into(),
    reflection: Reflection { observation: note.into(), ..Reflection::default() },
    tags: vec!["ease".into()],
  }
}

fn gratitude_on(date: NaiveDate, content: &str) -> NewGratitudeEntry {
  NewGratitudeEntry { date, content: content.into(), category: None }
}

fn assert_core<T: std::fmt::Debug>(
  result: crate::Result<T>,
  check: impl FnOnce(&CoreError) -> bool,
) {
  match result {
    Err(Error::Core(err)) if check(&err) => {}
    other => panic!("unexpected result: {other:?}"),
  }
}

/// A store holding one of everything.
async fn populated() -> SqliteStore {
  let s = store().await;
  s.write_entry(d(10), JournalPatch::content(TEN_WORDS).with_tags(["sabr"]))
    .await
    .unwrap();
  s.seal_entry(d(10)).await.unwrap();
  s.write_entry(d(11), JournalPatch::content("a short day")).await.unwrap();
  s.log_ibadah(
    d(10),
    IbadahPatch::default()
      .prayer(Prayer::Fajr, Some(PrayerStatus::OnTime))
      .pages(3),
  )
  .await
  .unwrap();
  s.put_setting(Setting::Theme(Theme::Dark)).await.unwrap();
  s.add_reflection(reflection_on(d(10), "patience"))
    .await
    .unwrap();
  s.add_gratitude(gratitude_on(d(11), "family")).await.unwrap();
  s
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_store_is_at_latest_version() {
  let s = store().await;
  assert_eq!(s.schema_version().await.unwrap(), 3);
  assert_eq!(s.collections().await.unwrap().len(), 5);
}

#[tokio::test]
async fn upgrade_from_v1_is_additive_and_idempotent() {
  let s = SqliteStore::open_in_memory_at(1).await.unwrap();
  assert_eq!(s.collections().await.unwrap(), vec![
    Collection::Entries,
    Collection::IbadahLog,
    Collection::UserSettings
  ]);
  s.write_entry(d(1), JournalPatch::content("kept across upgrades"))
    .await
    .unwrap();

  assert_eq!(s.upgrade_to(3).await.unwrap(), vec![2, 3]);
  assert_eq!(s.upgrade_to(3).await.unwrap(), Vec::<u32>::new());
  assert_eq!(s.schema_version().await.unwrap(), 3);

  let entry = s.entry(d(1)).await.unwrap().unwrap();
  assert_eq!(entry.content_raw, "kept across upgrades");
  assert_eq!(s.add_gratitude(gratitude_on(d(1), "rain")).await.unwrap().id, 1);
}

#[tokio::test]
async fn upgrade_past_latest_is_rejected() {
  let s = store().await;
  assert!(matches!(
    s.upgrade_to(4).await,
    Err(Error::UnsupportedSchemaVersion { found: 4, supported: 3 })
  ));
}

#[tokio::test]
async fn reopening_a_file_upgrades_and_keeps_data() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("journal.db");

  let s = SqliteStore::open_at(&path, 1).await.unwrap();
  s.log_ibadah(d(5), IbadahPatch::default().qiyam(true))
    .await
    .unwrap();
  s.close().await.unwrap();

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.schema_version().await.unwrap(), 3);
  assert!(s.ibadah_log(d(5)).await.unwrap().unwrap().qiyam);
  s.close().await.unwrap();
}

// ─── Journal ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn write_entry_creates_then_merges() {
  let s = store().await;
  let first = s
    .write_entry(d(11), JournalPatch::content("bismillah first words"))
    .await
    .unwrap();
  assert_eq!(first.word_count, 3);
  assert_eq!(first.mood, Mood::Neutral);
  assert!(first.pending_backup);

  let second = s
    .write_entry(d(11), JournalPatch::default().with_mood(Mood::Peace))
    .await
    .unwrap();
  assert_eq!(second.content_raw, "bismillah first words");
  assert_eq!(second.mood, Mood::Peace);
  assert!(second.last_modified >= first.last_modified);

  assert_eq!(s.entry(d(11)).await.unwrap(), Some(second));
}

#[tokio::test]
async fn update_entry_requires_an_existing_entry() {
  let s = store().await;
  let err = s
    .update_entry(d(11), JournalPatch::content("nothing here"))
    .await
    .unwrap_err();
  assert!(err.is_not_found());
  assert!(s.entry(d(11)).await.unwrap().is_none());
}

#[tokio::test]
async fn seal_needs_ten_words() {
  let s = store().await;
  s.write_entry(d(11), JournalPatch::content(NINE_WORDS))
    .await
    .unwrap();
  assert_core(s.seal_entry(d(11)).await, |e| {
    matches!(e, CoreError::TooShortToSeal { words: 9, .. })
  });
  assert!(!s.entry(d(11)).await.unwrap().unwrap().sealed);

  s.write_entry(d(11), JournalPatch::content(TEN_WORDS))
    .await
    .unwrap();
  let sealed = s.seal_entry(d(11)).await.unwrap();
  assert!(sealed.sealed);
  assert_eq!(sealed.word_count, 10);
}

#[tokio::test]
async fn sealed_entries_reject_edits() {
  let s = store().await;
  s.write_entry(d(11), JournalPatch::content(TEN_WORDS))
    .await
    .unwrap();
  let sealed = s.seal_entry(d(11)).await.unwrap();

  assert_core(
    s.write_entry(d(11), JournalPatch::content("rewritten")).await,
    |e| matches!(e, CoreError::Sealed(date) if *date == d(11)),
  );

  let mut replaced = sealed.clone();
  replaced.mood = Mood::Struggle;
  assert_core(s.put(replaced).await, |e| matches!(e, CoreError::Sealed(_)));
  assert_eq!(s.entry(d(11)).await.unwrap(), Some(sealed.clone()));

  // Re-sealing only refreshes the seal timestamp.
  let resealed = s.seal_entry(d(11)).await.unwrap();
  assert_eq!(resealed.content_raw, sealed.content_raw);
  assert!(resealed.last_modified >= sealed.last_modified);
}

#[tokio::test]
async fn entries_are_listed_newest_first_and_ranged_inclusively() {
  let s = store().await;
  for day in [12, 10, 14, 11] {
    s.write_entry(d(day), JournalPatch::content(format!("day {day}")))
      .await
      .unwrap();
  }

  let dates: Vec<_> = s.entries().await.unwrap().iter().map(|e| e.date).collect();
  assert_eq!(dates, vec![d(14), d(12), d(11), d(10)]);

  let between: Vec<_> = s
    .entries_between(d(11), d(12))
    .await
    .unwrap()
    .iter()
    .map(|e| e.date)
    .collect();
  assert_eq!(between, vec![d(11), d(12)]);
}

#[tokio::test]
async fn search_matches_content_and_tags_ignoring_case() {
  let s = store().await;
  s.write_entry(d(10), JournalPatch::content("Gratitude after Fajr"))
    .await
    .unwrap();
  s.write_entry(d(11), JournalPatch::content("quiet evening").with_tags(["Shukr"]))
    .await
    .unwrap();
  s.write_entry(d(12), JournalPatch::content("nothing special"))
    .await
    .unwrap();

  let hits: Vec<_> = s
    .search_entries("FAJR")
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.date)
    .collect();
  assert_eq!(hits, vec![d(10)]);

  let hits = s.search_entries("shukr").await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].date, d(11));

  assert_eq!(s.search_entries("  ").await.unwrap().len(), 3);
}

#[tokio::test]
async fn mark_backed_up_clears_only_older_markers() {
  let s = store().await;
  s.write_entry(d(10), JournalPatch::content("before the backup"))
    .await
    .unwrap();
  let as_of = Utc::now();
  tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  s.write_entry(d(11), JournalPatch::content("after the backup"))
    .await
    .unwrap();

  assert_eq!(s.mark_backed_up(as_of).await.unwrap(), 1);
  assert!(!s.entry(d(10)).await.unwrap().unwrap().pending_backup);
  assert!(s.entry(d(11)).await.unwrap().unwrap().pending_backup);
}

// ─── Tracker ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn tracker_log_is_created_lazily_and_patched_field_by_field() {
  let s = store().await;
  assert!(s.ibadah_log(d(11)).await.unwrap().is_none());

  s.log_ibadah(d(11), IbadahPatch::default().prayer(Prayer::Fajr, Some(PrayerStatus::Late)))
    .await
    .unwrap();
  let log = s
    .log_ibadah(d(11), IbadahPatch::default().pages(5).fasting(FastingType::Ramadan))
    .await
    .unwrap();

  assert_eq!(log.fajr, Some(PrayerStatus::Late));
  assert_eq!(log.dhuhr, None);
  assert_eq!(log.quran_pages_read, 5);
  assert_eq!(log.fasting_type, FastingType::Ramadan);
}

#[tokio::test]
async fn disjoint_patches_coalesced_into_one_call_keep_both() {
  let s = store().await;
  let a = IbadahPatch::default().prayer(Prayer::Asr, Some(PrayerStatus::OnTime));
  let b = IbadahPatch::default().duha(true).pages(2);

  let log = s.log_ibadah(d(11), a.merge(b)).await.unwrap();
  assert_eq!(log.asr, Some(PrayerStatus::OnTime));
  assert!(log.duha);
  assert_eq!(log.quran_pages_read, 2);
  assert_eq!(s.ibadah_log(d(11)).await.unwrap(), Some(log));
}

#[tokio::test]
async fn concurrent_disjoint_upserts_do_not_lose_updates() {
  let s = store().await;
  let (a, b, c) = tokio::join!(
    s.log_ibadah(d(11), IbadahPatch::default().prayer(Prayer::Fajr, Some(PrayerStatus::OnTime))),
    s.log_ibadah(d(11), IbadahPatch::default().prayer(Prayer::Isha, Some(PrayerStatus::Missed))),
    s.log_ibadah(d(11), IbadahPatch::default().qiyam(true)),
  );
  a.unwrap();
  b.unwrap();
  c.unwrap();

  let log = s.ibadah_log(d(11)).await.unwrap().unwrap();
  assert_eq!(log.fajr, Some(PrayerStatus::OnTime));
  assert_eq!(log.isha, Some(PrayerStatus::Missed));
  assert!(log.qiyam);
}

#[tokio::test]
async fn stored_logs_feed_the_completion_score() {
  let s = store().await;
  s.log_ibadah(
    d(11),
    IbadahPatch::default()
      .prayer(Prayer::Fajr, Some(PrayerStatus::OnTime))
      .prayer(Prayer::Dhuhr, Some(PrayerStatus::Late)),
  )
  .await
  .unwrap();
  let logs = s.ibadah_between(d(10), d(16)).await.unwrap();
  assert_eq!(completion_score(&logs), 75);
}

// ─── Atomicity ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_atomic_body_leaves_no_trace() {
  let s = store().await;
  let result = s
    .run_atomic(|txn| {
      txn.upsert::<JournalEntry>(d(11), JournalPatch::content("half done"))?;
      txn.update::<JournalEntry>(&d(12), JournalPatch::content("missing"))
    })
    .await;

  assert!(result.unwrap_err().is_not_found());
  assert!(s.entry(d(11)).await.unwrap().is_none());
}

// ─── Quran reflections and gratitude ─────────────────────────────────────────

#[tokio::test]
async fn ids_are_never_reused() {
  let s = store().await;
  let first = s.add_gratitude(gratitude_on(d(1), "health")).await.unwrap();
  let second = s.add_gratitude(gratitude_on(d(1), "home")).await.unwrap();
  assert_eq!((first.id, second.id), (1, 2));

  assert!(s.delete_gratitude(second.id).await.unwrap());
  assert!(!s.delete_gratitude(second.id).await.unwrap());
  let third = s.add_gratitude(gratitude_on(d(2), "friends")).await.unwrap();
  assert_eq!(third.id, 3);

  s.clear_all().await.unwrap();
  let fourth = s.add_gratitude(gratitude_on(d(3), "rain")).await.unwrap();
  assert_eq!(fourth.id, 4);
}

#[tokio::test]
async fn reflection_keeps_its_verse_snapshot() {
  let s = store().await;
  let mut input = reflection_on(d(11), "ease follows hardship");
  input.verse_text = "v".repeat(300);
  let created = s.add_reflection(input).await.unwrap();
  assert_eq!(created.verse_text.chars().count(), 200);

  let updated = s
    .update_reflection(created.id, QuranReflectionPatch {
      reflection: Some(Reflection {
        application: "be patient at work".into(),
        ..created.reflection.clone()
      }),
      tags: Some(vec!["sabr".into(), "sabr".into()]),
    })
    .await
    .unwrap();
  assert_eq!(updated.verse_text, created.verse_text);
  assert_eq!(updated.tags, vec!["sabr"]);
  assert_eq!(s.reflection(created.id).await.unwrap(), Some(updated));
}

#[tokio::test]
async fn invalid_reflections_are_rejected() {
  let s = store().await;
  let mut input = reflection_on(d(11), "note");
  input.surah = 115;
  assert_core(s.add_reflection(input).await, |e| {
    matches!(e, CoreError::Validation(v) if v.field.as_deref() == Some("surah"))
  });
  assert!(s.reflections().await.unwrap().is_empty());

  let blank = reflection_on(d(11), "   ");
  assert!(s.add_reflection(blank).await.is_err());
}

#[tokio::test]
async fn reflections_by_date_and_newest_first() {
  let s = store().await;
  let a = s.add_reflection(reflection_on(d(10), "first")).await.unwrap();
  let b = s.add_reflection(reflection_on(d(11), "second")).await.unwrap();
  let c = s.add_reflection(reflection_on(d(11), "third")).await.unwrap();

  let ids: Vec<_> = s.reflections().await.unwrap().iter().map(|r| r.id).collect();
  assert_eq!(ids, vec![c.id, b.id, a.id]);

  let on_11: Vec<_> = s.reflections_on(d(11)).await.unwrap().iter().map(|r| r.id).collect();
  assert_eq!(on_11, vec![b.id, c.id]);

  assert!(s.delete_reflection(b.id).await.unwrap());
  assert!(s.reflection(b.id).await.unwrap().is_none());
}

#[tokio::test]
async fn recent_gratitude_is_limited_and_newest_first() {
  let s = store().await;
  for note in ["one", "two", "three"] {
    s.add_gratitude(gratitude_on(d(11), note)).await.unwrap();
  }
  let recent: Vec<_> = s
    .recent_gratitude(2)
    .await
    .unwrap()
    .into_iter()
    .map(|g| g.content)
    .collect();
  assert_eq!(recent, vec!["three", "two"]);

  let edited = s
    .update_gratitude(1, GratitudePatch {
      content:  Some("  one, again ".into()),
      category: Some(Some("family".into())),
    })
    .await
    .unwrap();
  assert_eq!(edited.content, "one, again");
  assert_eq!(s.gratitude(1).await.unwrap(), Some(edited));

  assert!(s.update_gratitude(99, GratitudePatch::default()).await.unwrap_err().is_not_found());
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn settings_keep_their_types() {
  let s = store().await;
  s.put_setting(Setting::SoundEnabled(false)).await.unwrap();
  s.put_setting(Setting::DailyReminder(chrono::NaiveTime::from_hms_opt(21, 30, 0)))
    .await
    .unwrap();
  s.put_setting(Setting::HijriOffset(1)).await.unwrap();
  s.put_setting(Setting::HijriOffset(-1)).await.unwrap();

  assert_eq!(
    s.setting(SettingKey::HijriOffset).await.unwrap(),
    Some(Setting::HijriOffset(-1))
  );
  assert_eq!(
    s.setting(SettingKey::DailyReminder).await.unwrap(),
    Some(Setting::DailyReminder(chrono::NaiveTime::from_hms_opt(21, 30, 0)))
  );
  assert!(s.setting(SettingKey::Theme).await.unwrap().is_none());
  assert_eq!(s.settings().await.unwrap().len(), 3);

  assert!(s.put_setting(Setting::HijriOffset(3)).await.is_err());
  assert_eq!(
    s.setting(SettingKey::HijriOffset).await.unwrap(),
    Some(Setting::HijriOffset(-1))
  );
}

// ─── Export and reconciliation ───────────────────────────────────────────────

#[tokio::test]
async fn export_scopes_select_collections() {
  let s = populated().await;

  let full = s.export(ExportScope::Full).await.unwrap();
  assert_eq!(full.collections.present().len(), 5);
  assert_eq!(full.collections.record_count(), 6);

  let core = s.export(ExportScope::Core).await.unwrap();
  assert_eq!(core.collections.present(), vec![
    Collection::Entries,
    Collection::IbadahLog
  ]);
  let entries = core.collections.entries.unwrap();
  assert_eq!(entries.iter().map(|e| e.date).collect::<Vec<_>>(), vec![d(10), d(11)]);

  // Exporting never writes.
  assert!(s.entry(d(11)).await.unwrap().unwrap().pending_backup);
}

#[tokio::test]
async fn overwrite_round_trip_reproduces_the_source() {
  let source = populated().await;
  let exported = source.export(ExportScope::Full).await.unwrap();

  let target = store().await;
  target
    .write_entry(d(20), JournalPatch::content("will be replaced"))
    .await
    .unwrap();
  let report = target
    .reconcile(exported.clone(), Strategy::Overwrite)
    .await
    .unwrap();
  assert_eq!(report.inserted(), 6);
  assert_eq!(report.collections[0].cleared, 1);

  let copied = target.export(ExportScope::Full).await.unwrap();
  assert_eq!(copied.collections, exported.collections);

  // Surrogate ids continue after the imported ones.
  let next = target.add_gratitude(gratitude_on(d(21), "new")).await.unwrap();
  assert_eq!(next.id, 2);
}

#[tokio::test]
async fn overwrite_leaves_absent_collections_untouched() {
  let s = populated().await;
  let doc = Document::new(Utc::now(), Collections {
    gratitude_logs: Some(vec![]),
    ..Collections::default()
  });

  s.reconcile(doc, Strategy::Overwrite).await.unwrap();
  assert!(s.recent_gratitude(10).await.unwrap().is_empty());
  assert_eq!(s.entries().await.unwrap().len(), 2);
  assert_eq!(s.reflections().await.unwrap().len(), 1);
  assert!(s.setting(SettingKey::Theme).await.unwrap().is_some());
}

#[tokio::test]
async fn merge_keeps_local_records_and_is_idempotent() {
  let source = populated().await;
  let doc = source.export(ExportScope::Full).await.unwrap();

  let target = store().await;
  let local = target
    .write_entry(d(10), JournalPatch::content("my own words for this day"))
    .await
    .unwrap();
  target
    .write_entry(d(25), JournalPatch::content("only here"))
    .await
    .unwrap();

  let report = target.reconcile(doc.clone(), Strategy::Merge).await.unwrap();
  assert_eq!(report.kept_local(), 1);
  assert_eq!(report.inserted(), 5);

  assert_eq!(target.entry(d(10)).await.unwrap(), Some(local));
  assert!(target.entry(d(11)).await.unwrap().is_some());
  assert!(target.entry(d(25)).await.unwrap().is_some());

  let before = target.export(ExportScope::Full).await.unwrap();
  let again = target.reconcile(doc, Strategy::Merge).await.unwrap();
  assert_eq!(again.inserted(), 0);
  let after = target.export(ExportScope::Full).await.unwrap();
  assert_eq!(before.collections, after.collections);
}

#[tokio::test]
async fn failed_reconciliation_rolls_everything_back() {
  let s = populated().await;
  let before = s.export(ExportScope::Full).await.unwrap();

  let mut bad = before.collections.entries.clone().unwrap()[1].clone();
  bad.date = d(12);
  bad.sealed = true;
  let doc = Document::new(Utc::now(), Collections {
    gratitude_logs: Some(vec![]),
    entries: Some(vec![bad]),
    ..Collections::default()
  });

  assert_core(s.reconcile(doc, Strategy::Overwrite).await, |e| {
    matches!(e, CoreError::Validation(v) if v.collection == Collection::Entries)
  });
  let after = s.export(ExportScope::Full).await.unwrap();
  assert_eq!(before.collections, after.collections);
}

#[tokio::test]
async fn reconciliation_is_mutually_exclusive() {
  let s = populated().await;
  let doc = s.export(ExportScope::Core).await.unwrap();

  let guard = s.reconcile_lock.lock().await;
  let err = s.reconcile(doc.clone(), Strategy::Merge).await.unwrap_err();
  assert!(matches!(err, Error::ConcurrentReconciliationInProgress));
  drop(guard);

  assert!(s.reconcile(doc, Strategy::Merge).await.is_ok());
}

#[tokio::test]
async fn reconcile_into_an_old_schema_is_rejected() {
  let source = populated().await;
  let doc = source.export(ExportScope::Full).await.unwrap();

  let old = SqliteStore::open_in_memory_at(1).await.unwrap();
  assert!(matches!(
    old.reconcile(doc, Strategy::Merge).await,
    Err(Error::UnsupportedSchemaVersion { found: 2, supported: 1 })
  ));
  assert!(old.entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn clear_all_empties_every_collection() {
  let s = populated().await;
  s.clear_all().await.unwrap();
  let doc = s.export(ExportScope::Full).await.unwrap();
  assert_eq!(doc.collections.present().len(), 5);
  assert_eq!(doc.collections.record_count(), 0);
}
