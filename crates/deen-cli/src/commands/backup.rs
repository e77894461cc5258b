//! Export, import, validation and reset.

use std::{
  io::Write,
  path::{Path, PathBuf},
};

use anyhow::{Context as _, Result, bail};
use chrono::{DateTime, Utc};
use deen_core::{
  Collection,
  snapshot::{Document, ExportScope, Strategy},
  store::DeenStore,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
  render::{self, Output},
  settings::Settings,
};

/// Word that must be passed to `--confirm` before the store is erased.
const RESET_CONFIRMATION: &str = "DELETE";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Exported {
  path:    PathBuf,
  scope:   String,
  records: usize,
  sha256:  String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
  format_version: u32,
  exported_at:    DateTime<Utc>,
  collections:    Vec<Count>,
}

#[derive(Serialize)]
struct Count {
  collection: Collection,
  records:    usize,
}

impl Summary {
  fn of(document: &Document) -> Self {
    Self {
      format_version: document.format_version,
      exported_at:    document.exported_at,
      collections:    document
        .collections
        .present()
        .into_iter()
        .map(|collection| Count {
          collection,
          records: document.collections.len_of(collection).unwrap_or(0),
        })
        .collect(),
    }
  }
}

pub async fn export<S: DeenStore>(
  store: &S,
  settings: &Settings,
  scope: ExportScope,
  path: Option<PathBuf>,
  out: &mut Output<impl Write>,
) -> Result<()> {
  let document = store.export(scope).await.context("failed to read the store")?;
  let encoded = deen_snapshot::encode(&document).context("failed to encode backup")?;

  let path = path.unwrap_or_else(|| {
    settings
      .backup_dir
      .join(deen_snapshot::backup_file_name(document.exported_at))
  });
  tokio::fs::write(&path, &encoded)
    .await
    .with_context(|| format!("failed to write {}", path.display()))?;

  // Only once the file is on disk do entries count as backed up.
  let marked = store
    .mark_backed_up(document.exported_at)
    .await
    .context("failed to update backup markers")?;

  let exported = Exported {
    path,
    scope: scope.to_string(),
    records: document.collections.record_count(),
    sha256: deen_snapshot::digest(&encoded),
  };
  info!(path = %exported.path.display(), records = exported.records, marked, "backup written");
  out.record(&exported, |e| {
    format!("wrote {} records to {}\nsha256 {}", e.records, e.path.display(), e.sha256)
  })
}

pub async fn import<S: DeenStore>(
  store: &S,
  file: PathBuf,
  strategy: Strategy,
  out: &mut Output<impl Write>,
) -> Result<()> {
  let document = read(&file).await?;
  let report = store
    .reconcile(document, strategy)
    .await
    .with_context(|| format!("failed to restore {}; the store is unchanged", file.display()))?;
  out.record(&report, render::report)
}

pub async fn validate(file: PathBuf, out: &mut Output<impl Write>) -> Result<()> {
  let document = read(&file).await?;
  out.record(&Summary::of(&document), |s| {
    let mut lines = vec![format!(
      "format version {}, exported {}",
      s.format_version,
      s.exported_at.to_rfc3339()
    )];
    lines.extend(
      s.collections
        .iter()
        .map(|c| format!("{:<15} {:>5} records", c.collection.name(), c.records)),
    );
    lines.join("\n")
  })
}

pub async fn reset<S: DeenStore>(
  store: &S,
  yes: bool,
  confirm: Option<String>,
  out: &mut Output<impl Write>,
) -> Result<()> {
  if !yes || confirm.as_deref() != Some(RESET_CONFIRMATION) {
    bail!("refusing to erase the store; pass --yes --confirm {RESET_CONFIRMATION}");
  }
  store.clear_all().await.context("failed to clear the store")?;
  warn!("every collection was cleared");
  out.line("store cleared")
}

async fn read(file: &Path) -> Result<Document> {
  let bytes = tokio::fs::read(file)
    .await
    .with_context(|| format!("failed to read {}", file.display()))?;
  deen_snapshot::decode(&bytes)
    .with_context(|| format!("{} is not a valid backup", file.display()))
}
