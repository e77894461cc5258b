//! Read-only summaries derived from tracker logs. Nothing here is persisted.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::ibadah::{FastingType, IbadahLog, Prayer, PrayerStatus};

/// Prayer completion as a percentage.
///
/// On-time earns 2 of 2 points, late 1 of 2, missed 0 of 2. Unset slots count
/// towards neither side. Rounds half up; 0 when nothing was logged.
pub fn completion_score<'a, I>(logs: I) -> u8
where
  I: IntoIterator<Item = &'a IbadahLog>,
{
  let (points, possible) = logs
    .into_iter()
    .flat_map(|log| Prayer::iter().filter_map(|p| log.slot(p)))
    .fold((0u64, 0u64), |(points, possible), status| {
      (points + u64::from(status.points()), possible + 2)
    });

  if possible == 0 {
    return 0;
  }
  // round(100 * points / possible) without floating point.
  let score = (200 * points + possible) / (2 * possible);
  u8::try_from(score).unwrap_or(100)
}

/// The Sunday-to-Saturday week containing `date`, inclusive.
pub fn week_containing(date: NaiveDate) -> (NaiveDate, NaiveDate) {
  let back = u64::from(date.weekday().num_days_from_sunday());
  let start = date - Days::new(back);
  (start, start + Days::new(6))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
  pub date:   NaiveDate,
  /// Slot per prayer in [`Prayer`] order; `None` where nothing was logged.
  pub slots:  [Option<PrayerStatus>; 5],
  pub logged: bool,
  pub score:  u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekSummary {
  pub start:        NaiveDate,
  pub end:          NaiveDate,
  pub days:         Vec<DaySummary>,
  pub score:        u8,
  pub pages_read:   u32,
  pub fasting_days: u32,
  pub qiyam_nights: u32,
  pub duha_days:    u32,
}

impl WeekSummary {
  /// Summarise the seven days starting at `start`. Logs outside that range
  /// are ignored.
  pub fn build(start: NaiveDate, logs: &[IbadahLog]) -> Self {
    let end = start + Days::new(6);
    let by_date: BTreeMap<NaiveDate, &IbadahLog> = logs
      .iter()
      .filter(|l| l.date >= start && l.date <= end)
      .map(|l| (l.date, l))
      .collect();

    let days = start
      .iter_days()
      .take(7)
      .map(|date| match by_date.get(&date) {
        Some(log) => DaySummary {
          date,
          slots: [
            log.fajr, log.dhuhr, log.asr, log.maghrib, log.isha,
          ],
          logged: true,
          score: completion_score([*log]),
        },
        None => DaySummary { date, slots: [None; 5], logged: false, score: 0 },
      })
      .collect();

    let in_week: Vec<&IbadahLog> = by_date.values().copied().collect();
    let count = |pred: fn(&IbadahLog) -> bool| -> u32 {
      u32::try_from(in_week.iter().filter(|l| pred(l)).count()).unwrap_or(u32::MAX)
    };

    Self {
      start,
      end,
      days,
      score: completion_score(in_week.iter().copied()),
      pages_read: in_week.iter().map(|l| l.quran_pages_read).sum(),
      fasting_days: count(|l| l.fasting_type != FastingType::None),
      qiyam_nights: count(|l| l.qiyam),
      duha_days: count(|l| l.duha),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::record::DateKeyed;

  fn d(day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, day).unwrap() }

  fn log(day: u32) -> IbadahLog { IbadahLog::blank(d(day), Utc::now()) }

  #[test]
  fn on_time_and_late_with_three_unset_scores_75() {
    let mut l = log(11);
    l.fajr = Some(PrayerStatus::OnTime);
    l.dhuhr = Some(PrayerStatus::Late);
    assert_eq!(completion_score([&l]), 75);
  }

  #[test]
  fn nothing_logged_scores_zero() {
    assert_eq!(completion_score(std::iter::empty()), 0);
    assert_eq!(completion_score([&log(11)]), 0);
  }

  #[test]
  fn missed_counts_towards_possible_points() {
    let mut l = log(11);
    l.fajr = Some(PrayerStatus::OnTime);
    l.isha = Some(PrayerStatus::Missed);
    assert_eq!(completion_score([&l]), 50);
  }

  #[test]
  fn rounds_half_up() {
    // 1 point of 6 possible = 16.67 -> 17; 5 of 6 = 83.3 -> 83.
    let mut l = log(11);
    l.fajr = Some(PrayerStatus::Late);
    l.dhuhr = Some(PrayerStatus::Missed);
    l.asr = Some(PrayerStatus::Missed);
    assert_eq!(completion_score([&l]), 17);

    // 1 point of 8 possible = 12.5 -> 13.
    l.maghrib = Some(PrayerStatus::Missed);
    assert_eq!(completion_score([&l]), 13);
  }

  #[test]
  fn score_spans_several_logs() {
    let mut a = log(10);
    a.fajr = Some(PrayerStatus::OnTime);
    let mut b = log(11);
    b.fajr = Some(PrayerStatus::Missed);
    assert_eq!(completion_score([&a, &b]), 50);
  }

  #[test]
  fn weeks_start_on_sunday() {
    // 2024-03-13 is a Wednesday.
    assert_eq!(week_containing(d(13)), (d(10), d(16)));
    assert_eq!(week_containing(d(10)), (d(10), d(16)));
    assert_eq!(week_containing(d(16)), (d(10), d(16)));
  }

  #[test]
  fn week_summary_fills_missing_days() {
    let mut mon = log(11);
    mon.fajr = Some(PrayerStatus::OnTime);
    mon.quran_pages_read = 4;
    mon.qiyam = true;
    let mut thu = log(14);
    thu.fasting_type = FastingType::Voluntary;
    thu.quran_pages_read = 2;
    let outside = {
      let mut l = log(20);
      l.quran_pages_read = 100;
      l
    };

    let week = WeekSummary::build(d(10), &[thu, mon, outside]);
    assert_eq!(week.days.len(), 7);
    assert!(!week.days[0].logged);
    assert!(week.days[1].logged);
    assert_eq!(week.days[1].slots[0], Some(PrayerStatus::OnTime));
    assert_eq!(week.days[1].score, 100);
    assert_eq!(week.pages_read, 6);
    assert_eq!(week.fasting_days, 1);
    assert_eq!(week.qiyam_nights, 1);
    assert_eq!(week.duha_days, 0);
    assert_eq!(week.score, 100);
  }
}
