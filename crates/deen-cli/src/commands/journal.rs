use std::io::{self, Write};

use anyhow::{Context as _, Result, bail};
use deen_core::{journal::JournalPatch, store::DeenStore};
use tracing::info;

use super::today;
use crate::{
  args::{JournalCommand, WriteArgs},
  render::{self, Output},
};

pub async fn run<S: DeenStore>(
  store: &S,
  command: JournalCommand,
  out: &mut Output<impl Write>,
) -> Result<()> {
  match command {
    JournalCommand::Show { date } => {
      let date = date.unwrap_or_else(today);
      match store.entry(date).await.context("failed to read entry")? {
        Some(entry) => out.record(&entry, render::entry),
        None => out.line(format!("no entry for {date}")),
      }
    }

    JournalCommand::Write(args) => {
      let date = args.date.unwrap_or_else(today);
      let patch = patch(args)?;
      if patch.is_empty() {
        bail!("nothing to write; give the entry text, --stdin, --tags, --mood or --prompt");
      }
      let entry = store
        .write_entry(date, patch)
        .await
        .with_context(|| format!("failed to save entry for {date}"))?;
      info!(%date, words = entry.word_count, "entry saved");
      out.record(&entry, render::entry)
    }

    JournalCommand::Seal { date } => {
      let date = date.unwrap_or_else(today);
      let entry = store
        .seal_entry(date)
        .await
        .with_context(|| format!("failed to seal entry for {date}"))?;
      out.record(&entry, render::entry)
    }

    JournalCommand::List { from, to } => {
      let entries = match (from, to) {
        (Some(from), Some(to)) => store.entries_between(from, to).await,
        _ => store.entries().await,
      }
      .context("failed to list entries")?;
      out.list(&entries, render::entry_line)
    }

    JournalCommand::Search { query } => {
      let entries = store
        .search_entries(&query)
        .await
        .context("failed to search entries")?;
      out.list(&entries, render::entry_line)
    }
  }
}

fn patch(args: WriteArgs) -> Result<JournalPatch> {
  let text = if args.stdin {
    Some(io::read_to_string(io::stdin()).context("failed to read entry text from stdin")?)
  } else {
    args.text
  };

  let mut patch = JournalPatch { content_raw: text, mood: args.mood, ..JournalPatch::default() };
  if let Some(tags) = args.tags {
    patch = patch.with_tags(tags);
  }
  if let Some(prompt) = args.prompt {
    patch = patch.with_prompt(Some(prompt));
  }
  Ok(patch)
}
