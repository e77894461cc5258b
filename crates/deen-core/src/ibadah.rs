//! The daily prayer and habit tracker.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

use crate::{
  Result,
  collection::Collection,
  record::{DateKeyed, Patchable, Record},
};

// ─── Prayers ─────────────────────────────────────────────────────────────────

/// The five daily prayers, in order.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Prayer {
  Fajr,
  Dhuhr,
  Asr,
  Maghrib,
  Isha,
}

/// How a prayer was performed. Stored and exported as `0`, `1` or `2`; an
/// unset slot is represented by `Option::None`.
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
  EnumString,
)]
#[serde(try_from = "u8", into = "u8")]
#[strum(serialize_all = "kebab-case")]
pub enum PrayerStatus {
  Missed = 0,
  Late   = 1,
  OnTime = 2,
}

impl PrayerStatus {
  /// Points earned out of a possible 2.
  pub fn points(self) -> u32 { u8::from(self).into() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("prayer status must be 0 (missed), 1 (late) or 2 (on time), got {0}")]
pub struct InvalidPrayerStatus(pub u8);

impl TryFrom<u8> for PrayerStatus {
  type Error = InvalidPrayerStatus;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Self::Missed),
      1 => Ok(Self::Late),
      2 => Ok(Self::OnTime),
      other => Err(InvalidPrayerStatus(other)),
    }
  }
}

impl From<PrayerStatus> for u8 {
  fn from(status: PrayerStatus) -> Self { status as u8 }
}

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
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FastingType {
  #[default]
  None,
  Ramadan,
  Voluntary,
  Makeup,
}

// ─── Log ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IbadahLog {
  pub date:             NaiveDate,
  #[serde(default)]
  pub fajr:             Option<PrayerStatus>,
  #[serde(default)]
  pub dhuhr:            Option<PrayerStatus>,
  #[serde(default)]
  pub asr:              Option<PrayerStatus>,
  #[serde(default)]
  pub maghrib:          Option<PrayerStatus>,
  #[serde(default)]
  pub isha:             Option<PrayerStatus>,
  /// Night prayer.
  pub qiyam:            bool,
  /// Forenoon prayer.
  pub duha:             bool,
  pub quran_pages_read: u32,
  pub fasting_type:     FastingType,
}

impl IbadahLog {
  pub fn slot(&self, prayer: Prayer) -> Option<PrayerStatus> {
    match prayer {
      Prayer::Fajr => self.fajr,
      Prayer::Dhuhr => self.dhuhr,
      Prayer::Asr => self.asr,
      Prayer::Maghrib => self.maghrib,
      Prayer::Isha => self.isha,
    }
  }

  pub fn set_slot(&mut self, prayer: Prayer, status: Option<PrayerStatus>) {
    let slot = match prayer {
      Prayer::Fajr => &mut self.fajr,
      Prayer::Dhuhr => &mut self.dhuhr,
      Prayer::Asr => &mut self.asr,
      Prayer::Maghrib => &mut self.maghrib,
      Prayer::Isha => &mut self.isha,
    };
    *slot = status;
  }
}

impl Record for IbadahLog {
  type Key = NaiveDate;

  const COLLECTION: Collection = Collection::IbadahLog;

  fn key(&self) -> NaiveDate { self.date }
}

impl DateKeyed for IbadahLog {
  fn blank(date: NaiveDate, _now: DateTime<Utc>) -> Self {
    Self {
      date,
      fajr: None,
      dhuhr: None,
      asr: None,
      maghrib: None,
      isha: None,
      qiyam: false,
      duha: false,
      quran_pages_read: 0,
      fasting_type: FastingType::None,
    }
  }
}

// ─── Patch ───────────────────────────────────────────────────────────────────

/// Partial update of an [`IbadahLog`].
///
/// Several UI toggles for one date should be coalesced into a single patch
/// with [`IbadahPatch::merge`] and applied in one atomic upsert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IbadahPatch {
  /// `Some(None)` clears a slot back to unset.
  pub prayers:          BTreeMap<Prayer, Option<PrayerStatus>>,
  pub qiyam:            Option<bool>,
  pub duha:             Option<bool>,
  pub quran_pages_read: Option<u32>,
  pub fasting_type:     Option<FastingType>,
}

impl IbadahPatch {
  pub fn prayer(mut self, prayer: Prayer, status: Option<PrayerStatus>) -> Self {
    self.prayers.insert(prayer, status);
    self
  }

  pub fn qiyam(mut self, done: bool) -> Self {
    self.qiyam = Some(done);
    self
  }

  pub fn duha(mut self, done: bool) -> Self {
    self.duha = Some(done);
    self
  }

  pub fn pages(mut self, pages: u32) -> Self {
    self.quran_pages_read = Some(pages);
    self
  }

  pub fn fasting(mut self, fasting: FastingType) -> Self {
    self.fasting_type = Some(fasting);
    self
  }

  pub fn is_empty(&self) -> bool { *self == Self::default() }

  /// Combine two patches; fields set in `later` win.
  pub fn merge(mut self, later: Self) -> Self {
    self.prayers.extend(later.prayers);
    Self {
      prayers:          self.prayers,
      qiyam:            later.qiyam.or(self.qiyam),
      duha:             later.duha.or(self.duha),
      quran_pages_read: later.quran_pages_read.or(self.quran_pages_read),
      fasting_type:     later.fasting_type.or(self.fasting_type),
    }
  }
}

impl Patchable for IbadahLog {
  type Patch = IbadahPatch;

  fn apply(&mut self, patch: IbadahPatch, _now: DateTime<Utc>) -> Result<()> {
    for (prayer, status) in patch.prayers {
      self.set_slot(prayer, status);
    }
    if let Some(qiyam) = patch.qiyam {
      self.qiyam = qiyam;
    }
    if let Some(duha) = patch.duha {
      self.duha = duha;
    }
    if let Some(pages) = patch.quran_pages_read {
      self.quran_pages_read = pages;
    }
    if let Some(fasting) = patch.fasting_type {
      self.fasting_type = fasting;
    }
    Ok(())
  }
}
