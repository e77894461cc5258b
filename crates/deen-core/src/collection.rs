//! The closed set of collections and the schema version that introduced each.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// The newest schema version this build knows how to create.
pub const LATEST_SCHEMA_VERSION: u32 = 3;

/// One keyed collection (table) of records.
///
/// The string form is the collection name used both as the SQLite table name
/// and as the key under `collections` in an export document.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
  /// Journal entries, one per calendar date.
  Entries,
  /// Prayer and habit tracker logs, one per calendar date.
  IbadahLog,
  /// Typed user settings, one per setting name.
  UserSettings,
  /// Quran-study reflections, keyed by surrogate id.
  QuranLogs,
  /// Gratitude notes, keyed by surrogate id.
  GratitudeLogs,
}

impl Collection {
  pub fn name(self) -> &'static str { self.into() }

  /// The schema version in which this collection first exists.
  pub fn introduced_in(self) -> u32 {
    match self {
      Self::Entries | Self::IbadahLog | Self::UserSettings => 1,
      Self::QuranLogs | Self::GratitudeLogs => 2,
    }
  }

  /// Every collection defined by a store at `version`, in declaration order.
  pub fn available_at(version: u32) -> Vec<Collection> {
    Self::iter().filter(|c| c.introduced_in() <= version).collect()
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn names_round_trip_through_from_str() {
    for c in Collection::iter() {
      assert_eq!(Collection::from_str(c.name()).unwrap(), c);
    }
    assert_eq!(Collection::IbadahLog.name(), "ibadah_log");
    assert_eq!(Collection::GratitudeLogs.to_string(), "gratitude_logs");
  }

  #[test]
  fn versions_only_add_collections() {
    let v1 = Collection::available_at(1);
    let v2 = Collection::available_at(2);
    assert_eq!(v1, vec![
      Collection::Entries,
      Collection::IbadahLog,
      Collection::UserSettings
    ]);
    assert!(v1.iter().all(|c| v2.contains(c)));
    assert_eq!(Collection::available_at(LATEST_SCHEMA_VERSION).len(), 5);
  }
}
