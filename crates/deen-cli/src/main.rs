//! `deen`: command-line front end for the Deen Journal store.
//!
//! # Usage
//!
//! ```text
//! deen journal write --mood peace "Prayed fajr on time and felt it."
//! deen tracker log --fajr on-time --dhuhr late --pages 4
//! deen tracker week
//! deen export --scope core
//! deen import deen-journal-backup-2024-03-11.json --strategy merge
//! deen --config ~/.config/deen/config.toml schema
//! ```

mod args;
mod commands;
mod render;
mod settings;

use std::io;

use anyhow::{Context as _, Result};
use args::Cli;
use clap::Parser;
use deen_store_sqlite::SqliteStore;
use render::Output;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
  // Logs go to stderr so stdout stays clean for `--json` output.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(cli.config.as_deref(), cli.store.clone())?;

  if let Some(parent) = settings.store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {}", settings.store_path.display()))?;

  let mut out = Output::new(io::stdout().lock(), cli.json);
  let result = commands::run(&store, &settings, cli.command, &mut out).await;

  // Close even when the command failed; report the command's error first.
  let closed = store.close().await.context("failed to close store");
  result.and(closed)
}
