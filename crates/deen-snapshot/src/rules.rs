//! Field-level checks run on each raw record before it is decoded.
//!
//! Serde alone would reject a bad record too, but its messages rarely say
//! which field was wrong. Checking the raw JSON first lets every error name
//! the field, the record index and (when readable) the record key.

use chrono::{DateTime, NaiveDate};
use deen_core::{
  gratitude::GratitudeEntry,
  ibadah::{FastingType, IbadahLog},
  journal::{JournalEntry, Mood},
  quran::{QuranReflection, SURAH_COUNT},
  record::Record,
  setting::{Setting, SettingKey},
};
use serde_json::{Map, Value};
use strum::IntoEnumIterator;

/// What a single field must look like.
#[derive(Clone, Copy)]
pub enum Rule {
  /// Required `YYYY-MM-DD` string.
  Date,
  /// Required RFC 3339 string.
  Timestamp,
  /// Required string.
  Text,
  /// String, `null` or absent.
  OptText,
  /// Required boolean.
  Flag,
  /// Required integer in `0..=u32::MAX`.
  Count,
  /// Required integer >= 1.
  Id,
  /// Required integer in the inclusive range.
  Between(u64, u64),
  /// `0`, `1`, `2`, `null` or absent.
  PrayerSlot,
  /// Required string naming one of the listed variants.
  OneOf(fn() -> Vec<&'static str>),
  /// Required array of strings.
  Tags,
  /// Required object with `observation`, `application` and `prayer` strings.
  Sections,
  /// Required; its shape is left to the typed decode.
  Present,
}

/// A record kind as it appears in a snapshot document.
pub trait Rules: Record {
  /// Field holding the record key, used to name records in errors.
  const KEY_FIELD: &'static str;
  const FIELDS: &'static [(&'static str, Rule)];
}

fn names<T>() -> Vec<&'static str>
where
  T: IntoEnumIterator + Into<&'static str>,
{
  T::iter().map(Into::into).collect()
}

impl Rules for JournalEntry {
  const FIELDS: &'static [(&'static str, Rule)] = &[
    ("date", Rule::Date),
    ("contentRaw", Rule::Text),
    ("contentHtml", Rule::OptText),
    ("promptId", Rule::OptText),
    ("tags", Rule::Tags),
    ("mood", Rule::OneOf(names::<Mood>)),
    ("wordCount", Rule::Count),
    ("sealed", Rule::Flag),
    ("lastModified", Rule::Timestamp),
    ("pendingBackup", Rule::Flag),
  ];
  const KEY_FIELD: &'static str = "date";
}

impl Rules for IbadahLog {
  const FIELDS: &'static [(&'static str, Rule)] = &[
    ("date", Rule::Date),
    ("fajr", Rule::PrayerSlot),
    ("dhuhr", Rule::PrayerSlot),
    ("asr", Rule::PrayerSlot),
    ("maghrib", Rule::PrayerSlot),
    ("isha", Rule::PrayerSlot),
    ("qiyam", Rule::Flag),
    ("duha", Rule::Flag),
    ("quranPagesRead", Rule::Count),
    ("fastingType", Rule::OneOf(names::<FastingType>)),
  ];
  const KEY_FIELD: &'static str = "date";
}

impl Rules for Setting {
  const FIELDS: &'static [(&'static str, Rule)] = &[
    ("key", Rule::OneOf(names::<SettingKey>)),
    ("value", Rule::Present),
  ];
  const KEY_FIELD: &'static str = "key";
}

impl Rules for QuranReflection {
  const FIELDS: &'static [(&'static str, Rule)] = &[
    ("id", Rule::Id),
    ("date", Rule::Date),
    ("surah", Rule::Between(1, SURAH_COUNT as u64)),
    ("verse", Rule::Between(1, u16::MAX as u64)),
    ("verseText", Rule::Text),
    ("reflection", Rule::Sections),
    ("tags", Rule::Tags),
    ("createdAt", Rule::Timestamp),
  ];
  const KEY_FIELD: &'static str = "id";
}

impl Rules for GratitudeEntry {
  const FIELDS: &'static [(&'static str, Rule)] = &[
    ("id", Rule::Id),
    ("date", Rule::Date),
    ("content", Rule::Text),
    ("category", Rule::OptText),
    ("createdAt", Rule::Timestamp),
  ];
  const KEY_FIELD: &'static str = "id";
}

// ─── Checking ────────────────────────────────────────────────────────────────

/// The record's key rendered for error messages, if it is readable.
pub fn key_of(record: &Map<String, Value>, field: &str) -> Option<String> {
  match record.get(field)? {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

/// Check every field of `record` against `fields`. Returns the first failing
/// field and its message.
pub fn check(
  record: &Map<String, Value>,
  fields: &[(&'static str, Rule)],
) -> Result<(), (&'static str, String)> {
  for (name, rule) in fields {
    check_field(record.get(*name), *rule).map_err(|msg| (*name, msg))?;
  }
  Ok(())
}

fn check_field(value: Option<&Value>, rule: Rule) -> Result<(), String> {
  let value = match (value, rule) {
    (None | Some(Value::Null), Rule::OptText | Rule::PrayerSlot) => return Ok(()),
    (None, _) => return Err("missing".into()),
    (Some(v), _) => v,
  };

  match rule {
    Rule::Date => {
      let s = expect_str(value, "a YYYY-MM-DD date")?;
      NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(drop)
        .map_err(|_| format!("expected a YYYY-MM-DD date, got {value}"))
    }
    Rule::Timestamp => {
      let s = expect_str(value, "an RFC 3339 timestamp")?;
      DateTime::parse_from_rfc3339(s)
        .map(drop)
        .map_err(|_| format!("expected an RFC 3339 timestamp, got {value}"))
    }
    Rule::Text | Rule::OptText => expect_str(value, "a string").map(drop),
    Rule::Flag => match value {
      Value::Bool(_) => Ok(()),
      other => Err(format!("expected true or false, got {other}")),
    },
    Rule::Count => integer_in(value, 0, u64::from(u32::MAX)),
    Rule::Id => integer_in(value, 1, i64::MAX as u64),
    Rule::Between(low, high) => integer_in(value, low, high),
    Rule::PrayerSlot => match value.as_u64() {
      Some(0..=2) => Ok(()),
      _ => Err(format!(
        "prayer status must be 0 (missed), 1 (late), 2 (on time) or null, got {value}"
      )),
    },
    Rule::OneOf(variants) => {
      let allowed = variants();
      let s = expect_str(value, "a string")?;
      if allowed.contains(&s) {
        Ok(())
      } else {
        Err(format!("expected one of {}, got {value}", allowed.join(", ")))
      }
    }
    Rule::Tags => match value {
      Value::Array(items) if items.iter().all(Value::is_string) => Ok(()),
      other => Err(format!("expected an array of strings, got {other}")),
    },
    Rule::Sections => {
      let Value::Object(sections) = value else {
        return Err(format!("expected an object, got {value}"));
      };
      for section in ["observation", "application", "prayer"] {
        check_field(sections.get(section), Rule::Text)
          .map_err(|msg| format!("`{section}`: {msg}"))?;
      }
      Ok(())
    }
    Rule::Present => Ok(()),
  }
}

fn expect_str<'v>(value: &'v Value, expected: &str) -> Result<&'v str, String> {
  value
    .as_str()
    .ok_or_else(|| format!("expected {expected}, got {value}"))
}

fn integer_in(value: &Value, low: u64, high: u64) -> Result<(), String> {
  match value.as_u64() {
    Some(n) if (low..=high).contains(&n) => Ok(()),
    _ => Err(format!("expected an integer from {low} to {high}, got {value}")),
  }
}
