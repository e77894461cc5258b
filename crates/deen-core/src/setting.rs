//! User settings as a closed, typed variant.
//!
//! Each known setting name carries its own value type, so a settings record
//! survives an export/import round trip without losing type information.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Result, collection::Collection, error::FieldError, record::Record};

/// Allowed day adjustment applied when displaying Hijri dates.
pub const HIJRI_OFFSET_RANGE: std::ops::RangeInclusive<i8> = -2..=2;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
  Light,
  Dark,
  #[default]
  System,
}

/// The names of every known setting.
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
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SettingKey {
  Theme,
  SoundEnabled,
  DailyReminder,
  HijriOffset,
}

impl SettingKey {
  pub fn name(self) -> &'static str { self.into() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum Setting {
  Theme(Theme),
  SoundEnabled(bool),
  /// Local time of the daily journaling reminder; `None` disables it.
  DailyReminder(Option<NaiveTime>),
  HijriOffset(i8),
}

impl Setting {
  /// Parse a setting from its name and a textual value.
  pub fn parse(key: SettingKey, raw: &str) -> Result<Self, FieldError> {
    let raw = raw.trim();
    let invalid = |expected: &str| {
      FieldError::new("value", format!("{key} expects {expected}, got {raw:?}"))
    };
    let setting = match key {
      SettingKey::Theme => Self::Theme(
        raw
          .parse()
          .map_err(|_| invalid("one of light, dark, system"))?,
      ),
      SettingKey::SoundEnabled => {
        Self::SoundEnabled(raw.parse().map_err(|_| invalid("true or false"))?)
      }
      SettingKey::DailyReminder => match raw {
        "" | "off" | "none" => Self::DailyReminder(None),
        time => Self::DailyReminder(Some(
          NaiveTime::parse_from_str(time, "%H:%M")
            .map_err(|_| invalid("a time as HH:MM, or off"))?,
        )),
      },
      SettingKey::HijriOffset => {
        Self::HijriOffset(raw.parse().map_err(|_| invalid("an integer"))?)
      }
    };
    setting.validate()?;
    Ok(setting)
  }
}

impl Record for Setting {
  type Key = SettingKey;

  const COLLECTION: Collection = Collection::UserSettings;

  fn key(&self) -> SettingKey {
    match self {
      Self::Theme(_) => SettingKey::Theme,
      Self::SoundEnabled(_) => SettingKey::SoundEnabled,
      Self::DailyReminder(_) => SettingKey::DailyReminder,
      Self::HijriOffset(_) => SettingKey::HijriOffset,
    }
  }

  fn validate(&self) -> Result<(), FieldError> {
    if let Self::HijriOffset(days) = self
      && !HIJRI_OFFSET_RANGE.contains(days)
    {
      return Err(FieldError::new(
        "value",
        format!("hijriOffset must be between -2 and 2, got {days}"),
      ));
    }
    Ok(())
  }
}
