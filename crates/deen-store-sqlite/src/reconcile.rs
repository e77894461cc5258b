//! Applying an imported [`Document`] to the live store.
//!
//! Both strategies run the whole document inside one transaction: either
//! every collection in the document is applied or the store is left exactly
//! as it was.

use deen_core::{
  Collection,
  snapshot::{CollectionReport, Document, ReconcileReport, Strategy},
  store::DeenStore as _,
};
use tracing::{info, warn};

use crate::{Error, Result, SqliteStore, table::Table, txn::Txn};

impl SqliteStore {
  /// Apply `document` under `strategy`.
  ///
  /// Fails with [`Error::ConcurrentReconciliationInProgress`] without
  /// touching the store if another reconciliation holds the lock.
  pub async fn reconcile_document(
    &self,
    document: Document,
    strategy: Strategy,
  ) -> Result<ReconcileReport> {
    let _guard = self.reconcile_lock.try_lock().map_err(|_| {
      warn!("rejected reconciliation: another one is still running");
      Error::ConcurrentReconciliationInProgress
    })?;

    // A store opened at an older version cannot hold every collection.
    let version = self.schema_version().await?;
    if let Some(needed) = document
      .collections
      .present()
      .into_iter()
      .map(Collection::introduced_in)
      .find(|v| *v > version)
    {
      return Err(Error::UnsupportedSchemaVersion { found: needed, supported: version });
    }

    let report = self
      .run_atomic(move |txn| {
        let c = document.collections;
        let mut reports = Vec::new();
        apply(txn, strategy, c.entries, &mut reports)?;
        apply(txn, strategy, c.ibadah_log, &mut reports)?;
        apply(txn, strategy, c.user_settings, &mut reports)?;
        apply(txn, strategy, c.quran_logs, &mut reports)?;
        apply(txn, strategy, c.gratitude_logs, &mut reports)?;
        Ok(ReconcileReport { strategy, collections: reports })
      })
      .await?;

    for c in &report.collections {
      info!(
        %strategy,
        collection = %c.collection,
        cleared = c.cleared,
        inserted = c.inserted,
        kept_local = c.kept_local,
        "reconciled collection"
      );
    }
    Ok(report)
  }
}

/// Apply one collection's records. `None` means the document does not cover
/// the collection, which is then left untouched.
fn apply<R: Table>(
  txn: &Txn<'_>,
  strategy: Strategy,
  records: Option<Vec<R>>,
  reports: &mut Vec<CollectionReport>,
) -> Result<()> {
  let Some(records) = records else {
    return Ok(());
  };
  let mut report = CollectionReport::new(R::COLLECTION);

  match strategy {
    Strategy::Overwrite => {
      report.cleared = txn.clear::<R>()?;
      for record in &records {
        txn.insert(record)?;
        report.inserted += 1;
      }
    }
    Strategy::Merge => {
      for record in &records {
        if txn.contains::<R>(&record.key())? {
          report.kept_local += 1;
        } else {
          txn.insert(record)?;
          report.inserted += 1;
        }
      }
    }
  }

  reports.push(report);
  Ok(())
}
