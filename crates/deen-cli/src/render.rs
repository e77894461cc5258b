//! Text and JSON output for records.

use std::{fmt, io::Write};

use anyhow::Result;
use deen_core::{
  gratitude::GratitudeEntry,
  ibadah::{IbadahLog, Prayer, PrayerStatus},
  journal::JournalEntry,
  quran::QuranReflection,
  record::Record,
  setting::Setting,
  snapshot::ReconcileReport,
  views::WeekSummary,
};
use serde::Serialize;
use strum::IntoEnumIterator;

/// Where command output goes. With `json` set, records are written as
/// pretty-printed JSON instead of their text form.
pub struct Output<W> {
  out:  W,
  json: bool,
}

impl<W: Write> Output<W> {
  pub fn new(out: W, json: bool) -> Self { Self { out, json } }

  pub fn line(&mut self, text: impl fmt::Display) -> Result<()> {
    writeln!(self.out, "{text}")?;
    Ok(())
  }

  pub fn record<T: Serialize>(&mut self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
    if self.json { self.write_json(value) } else { self.line(text(value)) }
  }

  pub fn list<T: Serialize>(&mut self, values: &[T], text: impl Fn(&T) -> String) -> Result<()> {
    if self.json {
      return self.write_json(values);
    }
    if values.is_empty() {
      return self.line("nothing found");
    }
    for value in values {
      self.line(text(value))?;
    }
    Ok(())
  }

  fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut self.out, value)?;
    writeln!(self.out)?;
    Ok(())
  }

  #[cfg(test)]
  pub fn into_inner(self) -> W { self.out }
}

// ─── Journal ──────────────────────────────────────────────────────────────────

pub fn entry(e: &JournalEntry) -> String {
  let mut head = vec![e.date.to_string(), e.mood.to_string(), format!("{} words", e.word_count)];
  if e.sealed {
    head.push("sealed".into());
  }
  if !e.tags.is_empty() {
    head.push(hashtags(&e.tags));
  }
  if e.pending_backup {
    head.push("(not backed up)".into());
  }
  let head = head.join("  ");
  if e.content_raw.is_empty() { head } else { format!("{head}\n\n{}", e.content_raw) }
}

pub fn entry_line(e: &JournalEntry) -> String {
  let seal = if e.sealed { "sealed" } else { "      " };
  format!("{}  {seal}  {:>4} words  {}", e.date, e.word_count, preview(&e.content_raw, 60))
}

fn preview(text: &str, max: usize) -> String {
  let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
  if flat.chars().count() <= max {
    flat
  } else {
    format!("{}…", flat.chars().take(max).collect::<String>())
  }
}

fn hashtags(tags: &[String]) -> String {
  tags.iter().map(|t| format!("#{t}")).collect::<Vec<_>>().join(" ")
}

// ─── Tracker ──────────────────────────────────────────────────────────────────

fn slot(status: Option<PrayerStatus>) -> String {
  status.map_or_else(|| "-".to_owned(), |s| s.to_string())
}

fn yes_no(done: bool) -> &'static str { if done { "yes" } else { "no" } }

pub fn ibadah(log: &IbadahLog) -> String {
  let prayers = Prayer::iter()
    .map(|p| format!("{p} {}", slot(log.slot(p))))
    .collect::<Vec<_>>()
    .join("  ");
  format!(
    "{}  {prayers}\nqiyam {}  duha {}  pages {}  fasting {}",
    log.date,
    yes_no(log.qiyam),
    yes_no(log.duha),
    log.quran_pages_read,
    log.fasting_type,
  )
}

pub fn week(w: &WeekSummary) -> String {
  let header: String = Prayer::iter().map(|p| format!("{:<9}", p.to_string())).collect();
  let mut lines = vec![
    format!("{} to {}: {}% of prayers", w.start, w.end, w.score),
    format!("{:<16}{header}", ""),
  ];
  for day in &w.days {
    let cells: String = day.slots.iter().map(|s| format!("{:<9}", slot(*s))).collect();
    let score = if day.logged { format!("{:>3}%", day.score) } else { String::new() };
    lines.push(format!("{} {}  {cells}{score}", day.date.format("%a"), day.date));
  }
  lines.push(format!(
    "pages read {}  fasting days {}  qiyam {}  duha {}",
    w.pages_read, w.fasting_days, w.qiyam_nights, w.duha_days
  ));
  lines.join("\n")
}

// ─── Study ────────────────────────────────────────────────────────────────────

pub fn reflection(r: &QuranReflection) -> String {
  let mut lines = vec![format!("#{}  {}  {}:{}", r.id, r.date, r.surah, r.verse)];
  if !r.verse_text.is_empty() {
    lines.push(format!("  \"{}\"", r.verse_text));
  }
  let sections = [
    ("observation", &r.reflection.observation),
    ("application", &r.reflection.application),
    ("prayer", &r.reflection.prayer),
  ];
  for (label, text) in sections {
    if !text.trim().is_empty() {
      lines.push(format!("  {label}: {text}"));
    }
  }
  if !r.tags.is_empty() {
    lines.push(format!("  {}", hashtags(&r.tags)));
  }
  lines.join("\n")
}

pub fn gratitude(g: &GratitudeEntry) -> String {
  match &g.category {
    Some(category) => format!("#{}  {}  [{category}] {}", g.id, g.date, g.content),
    None => format!("#{}  {}  {}", g.id, g.date, g.content),
  }
}

// ─── Settings and backups ─────────────────────────────────────────────────────

pub fn setting(s: &Setting) -> String {
  let value = match s {
    Setting::Theme(theme) => theme.to_string(),
    Setting::SoundEnabled(on) => on.to_string(),
    Setting::DailyReminder(Some(time)) => time.format("%H:%M").to_string(),
    Setting::DailyReminder(None) => "off".into(),
    Setting::HijriOffset(days) => days.to_string(),
  };
  format!("{} = {value}", s.key())
}

pub fn report(r: &ReconcileReport) -> String {
  let mut lines: Vec<String> = r
    .collections
    .iter()
    .map(|c| {
      format!(
        "{:<15} cleared {:>4}  inserted {:>4}  kept local {:>4}",
        c.collection.name(),
        c.cleared,
        c.inserted,
        c.kept_local
      )
    })
    .collect();
  lines.push(format!(
    "{}: {} records restored, {} kept local",
    r.strategy,
    r.inserted(),
    r.kept_local()
  ));
  lines.join("\n")
}
