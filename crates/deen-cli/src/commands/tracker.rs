use std::io::Write;

use anyhow::{Context as _, Result, bail};
use deen_core::{
  ibadah::{IbadahPatch, Prayer},
  store::DeenStore,
  views::{WeekSummary, week_containing},
};
use tracing::info;

use super::today;
use crate::{
  args::{LogArgs, Slot, TrackerCommand},
  render::{self, Output},
};

pub async fn run<S: DeenStore>(
  store: &S,
  command: TrackerCommand,
  out: &mut Output<impl Write>,
) -> Result<()> {
  match command {
    TrackerCommand::Show { date } => {
      let date = date.unwrap_or_else(today);
      match store.ibadah_log(date).await.context("failed to read tracker log")? {
        Some(log) => out.record(&log, render::ibadah),
        None => out.line(format!("nothing logged for {date}")),
      }
    }

    TrackerCommand::Log(args) => {
      let date = args.date.unwrap_or_else(today);
      let patch = coalesce(args);
      if patch.is_empty() {
        bail!("nothing to log; give at least one prayer or habit");
      }
      let log = store
        .log_ibadah(date, patch)
        .await
        .with_context(|| format!("failed to update tracker log for {date}"))?;
      info!(%date, "tracker log saved");
      out.record(&log, render::ibadah)
    }

    TrackerCommand::Week { date } => {
      let (start, end) = week_containing(date.unwrap_or_else(today));
      let logs = store
        .ibadah_between(start, end)
        .await
        .context("failed to read tracker logs")?;
      out.record(&WeekSummary::build(start, &logs), render::week)
    }
  }
}

/// Fold every flag into one patch so the whole edit is applied in a single
/// atomic write.
fn coalesce(args: LogArgs) -> IbadahPatch {
  let slots = [
    (Prayer::Fajr, args.fajr),
    (Prayer::Dhuhr, args.dhuhr),
    (Prayer::Asr, args.asr),
    (Prayer::Maghrib, args.maghrib),
    (Prayer::Isha, args.isha),
  ];
  slots
    .into_iter()
    .filter_map(|(prayer, slot)| {
      slot.map(|Slot(status)| IbadahPatch::default().prayer(prayer, status))
    })
    .chain(args.qiyam.map(|done| IbadahPatch::default().qiyam(done)))
    .chain(args.duha.map(|done| IbadahPatch::default().duha(done)))
    .chain(args.pages.map(|pages| IbadahPatch::default().pages(pages)))
    .chain(args.fasting.map(|kind| IbadahPatch::default().fasting(kind)))
    .fold(IbadahPatch::default(), IbadahPatch::merge)
}
