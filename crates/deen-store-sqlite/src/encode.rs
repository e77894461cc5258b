//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (nanosecond precision,
//! `Z` suffix) so that string comparison in SQL matches time order. Dates are
//! stored as `YYYY-MM-DD`. Tags are stored as compact JSON arrays.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use deen_core::{Collection, ibadah::PrayerStatus};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

// ─── Enums ───────────────────────────────────────────────────────────────────

/// Parse a text column holding a strum-named enum variant.
pub fn decode_name<T: FromStr>(
  collection: Collection,
  column: &'static str,
  s: &str,
) -> Result<T> {
  s.parse().map_err(|_| Error::Decode {
    collection,
    column,
    message: format!("unknown value {s:?}"),
  })
}

pub fn decode_status(column: &'static str, raw: Option<u8>) -> Result<Option<PrayerStatus>> {
  raw
    .map(PrayerStatus::try_from)
    .transpose()
    .map_err(|e| Error::Decode {
      collection: Collection::IbadahLog,
      column,
      message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_lossless() {
    let a = Utc.timestamp_opt(1_710_000_000, 5).unwrap();
    let b = Utc.timestamp_opt(1_710_000_000, 500_000_000).unwrap();
    let (ea, eb) = (encode_dt(a), encode_dt(b));
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb);
    assert_eq!(decode_dt(&ea).unwrap(), a);
  }

  #[test]
  fn dates_use_iso_form() {
    let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    assert_eq!(encode_date(d), "2024-03-01");
    assert_eq!(decode_date("2024-03-01").unwrap(), d);
    assert!(decode_date("01/03/2024").is_err());
  }
}
