//! Mapping between record kinds and their SQLite tables.
//!
//! Each collection is one table named after [`Collection::name`]. A
//! [`Table`] impl lists the table's columns and converts a record to and
//! from one row; the generic operations in [`crate::Txn`] are written once
//! against this trait.

use deen_core::{
  Collection,
  gratitude::GratitudeEntry,
  ibadah::IbadahLog,
  journal::JournalEntry,
  quran::{QuranReflection, Reflection},
  record::Record,
  setting::{Setting, SettingKey},
};
use rusqlite::{Row, types::Value};
use serde_json::json;

use crate::{
  Error, Result,
  encode::{
    decode_date, decode_dt, decode_name, decode_status, decode_tags, encode_date,
    encode_dt, encode_tags,
  },
};

pub trait Table: Record {
  /// Primary key column.
  const KEY_COLUMN: &'static str;

  /// Every column, in the order [`Table::to_row`] produces values.
  const COLUMNS: &'static [&'static str];

  fn table() -> &'static str { Self::COLLECTION.name() }

  fn key_value(key: &Self::Key) -> Value;

  fn to_row(&self) -> Result<Vec<Value>>;

  fn from_row(row: &Row<'_>) -> Result<Self>;
}

// ─── Journal ─────────────────────────────────────────────────────────────────

impl Table for JournalEntry {
  const COLUMNS: &'static [&'static str] = &[
    "date",
    "content_raw",
    "content_html",
    "prompt_id",
    "tags",
    "mood",
    "word_count",
    "sealed",
    "last_modified",
    "pending_backup",
  ];
  const KEY_COLUMN: &'static str = "date";

  fn key_value(key: &Self::Key) -> Value { Value::Text(encode_date(*key)) }

  fn to_row(&self) -> Result<Vec<Value>> {
    Ok(vec![
      Value::Text(encode_date(self.date)),
      self.content_raw.clone().into(),
      self.content_html.clone().into(),
      self.prompt_id.clone().into(),
      encode_tags(&self.tags)?.into(),
      Value::Text(self.mood.to_string()),
      self.word_count.into(),
      self.sealed.into(),
      encode_dt(self.last_modified).into(),
      self.pending_backup.into(),
    ])
  }

  fn from_row(row: &Row<'_>) -> Result<Self> {
    let mood: String = row.get("mood")?;
    Ok(Self {
      date:           decode_date(&row.get::<_, String>("date")?)?,
      content_raw:    row.get("content_raw")?,
      content_html:   row.get("content_html")?,
      prompt_id:      row.get("prompt_id")?,
      tags:           decode_tags(&row.get::<_, String>("tags")?)?,
      mood:           decode_name(Self::COLLECTION, "mood", &mood)?,
      word_count:     row.get("word_count")?,
      sealed:         row.get("sealed")?,
      last_modified:  decode_dt(&row.get::<_, String>("last_modified")?)?,
      pending_backup: row.get("pending_backup")?,
    })
  }
}

// ─── Tracker ─────────────────────────────────────────────────────────────────

impl Table for IbadahLog {
  const COLUMNS: &'static [&'static str] = &[
    "date",
    "fajr",
    "dhuhr",
    "asr",
    "maghrib",
    "isha",
    "qiyam",
    "duha",
    "quran_pages_read",
    "fasting_type",
  ];
  const KEY_COLUMN: &'static str = "date";

  fn key_value(key: &Self::Key) -> Value { Value::Text(encode_date(*key)) }

  fn to_row(&self) -> Result<Vec<Value>> {
    let slot = |s: Option<deen_core::ibadah::PrayerStatus>| -> Value {
      s.map(u8::from).into()
    };
    Ok(vec![
      Value::Text(encode_date(self.date)),
      slot(self.fajr),
      slot(self.dhuhr),
      slot(self.asr),
      slot(self.maghrib),
      slot(self.isha),
      self.qiyam.into(),
      self.duha.into(),
      self.quran_pages_read.into(),
      Value::Text(self.fasting_type.to_string()),
    ])
  }

  fn from_row(row: &Row<'_>) -> Result<Self> {
    let fasting: String = row.get("fasting_type")?;
    Ok(Self {
      date:             decode_date(&row.get::<_, String>("date")?)?,
      fajr:             decode_status("fajr", row.get("fajr")?)?,
      dhuhr:            decode_status("dhuhr", row.get("dhuhr")?)?,
      asr:              decode_status("asr", row.get("asr")?)?,
      maghrib:          decode_status("maghrib", row.get("maghrib")?)?,
      isha:             decode_status("isha", row.get("isha")?)?,
      qiyam:            row.get("qiyam")?,
      duha:             row.get("duha")?,
      quran_pages_read: row.get("quran_pages_read")?,
      fasting_type:     decode_name(Self::COLLECTION, "fasting_type", &fasting)?,
    })
  }
}

// ─── Settings ────────────────────────────────────────────────────────────────

/// Settings are stored as the setting name plus its JSON-encoded value, so a
/// row decodes back through the same tagged representation used in exports.
impl Table for Setting {
  const COLUMNS: &'static [&'static str] = &["key", "value"];
  const KEY_COLUMN: &'static str = "key";

  fn key_value(key: &SettingKey) -> Value { Value::Text(key.name().to_owned()) }

  fn to_row(&self) -> Result<Vec<Value>> {
    let mut tagged = serde_json::to_value(self)?;
    let value = tagged
      .get_mut("value")
      .map(serde_json::Value::take)
      .unwrap_or(serde_json::Value::Null);
    Ok(vec![
      Value::Text(self.key().name().to_owned()),
      Value::Text(value.to_string()),
    ])
  }

  fn from_row(row: &Row<'_>) -> Result<Self> {
    let key: String = row.get("key")?;
    let raw: String = row.get("value")?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    serde_json::from_value(json!({ "key": key, "value": value })).map_err(|e| {
      Error::Decode {
        collection: Collection::UserSettings,
        column:     "value",
        message:    format!("setting {key:?}: {e}"),
      }
    })
  }
}

// ─── Quran reflections ───────────────────────────────────────────────────────

impl Table for QuranReflection {
  const COLUMNS: &'static [&'static str] = &[
    "id",
    "date",
    "surah",
    "verse",
    "verse_text",
    "observation",
    "application",
    "prayer",
    "tags",
    "created_at",
  ];
  const KEY_COLUMN: &'static str = "id";

  fn key_value(key: &i64) -> Value { Value::Integer(*key) }

  fn to_row(&self) -> Result<Vec<Value>> {
    Ok(vec![
      Value::Integer(self.id),
      Value::Text(encode_date(self.date)),
      self.surah.into(),
      self.verse.into(),
      self.verse_text.clone().into(),
      self.reflection.observation.clone().into(),
      self.reflection.application.clone().into(),
      self.reflection.prayer.clone().into(),
      encode_tags(&self.tags)?.into(),
      encode_dt(self.created_at).into(),
    ])
  }

  fn from_row(row: &Row<'_>) -> Result<Self> {
    Ok(Self {
      id:         row.get("id")?,
      date:       decode_date(&row.get::<_, String>("date")?)?,
      surah:      row.get("surah")?,
      verse:      row.get("verse")?,
      verse_text: row.get("verse_text")?,
      reflection: Reflection {
        observation: row.get("observation")?,
        application: row.get("application")?,
        prayer:      row.get("prayer")?,
      },
      tags:       decode_tags(&row.get::<_, String>("tags")?)?,
      created_at: decode_dt(&row.get::<_, String>("created_at")?)?,
    })
  }
}

// ─── Gratitude ───────────────────────────────────────────────────────────────

impl Table for GratitudeEntry {
  const COLUMNS: &'static [&'static str] =
    &["id", "date", "content", "category", "created_at"];
  const KEY_COLUMN: &'static str = "id";

  fn key_value(key: &i64) -> Value { Value::Integer(*key) }

  fn to_row(&self) -> Result<Vec<Value>> {
    Ok(vec![
      Value::Integer(self.id),
      Value::Text(encode_date(self.date)),
      self.content.clone().into(),
      self.category.clone().into(),
      encode_dt(self.created_at).into(),
    ])
  }

  fn from_row(row: &Row<'_>) -> Result<Self> {
    Ok(Self {
      id:         row.get("id")?,
      date:       decode_date(&row.get::<_, String>("date")?)?,
      content:    row.get("content")?,
      category:   row.get("category")?,
      created_at: decode_dt(&row.get::<_, String>("created_at")?)?,
    })
  }
}
