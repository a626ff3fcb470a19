//! Bulk upsert reconciliation — insert vs patch vs skip vs collapse.
//!
//! The batch is reconciled against a snapshot of the records already stored
//! in the call's scope. Pre-existing duplicate `lead_id` groups are
//! collapsed onto their earliest-created member before any incoming write,
//! so every patch lands on exactly one target. Individual record failures
//! are captured and never abort the batch.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::{
  error::{Error, Result},
  group,
  record::{CustomerRecord, IncomingRecord, Scope},
  store::CustomerStore,
};

/// Per-record failures reported back to the caller are capped; the flag on
/// the summary records that the list was truncated.
pub const MAX_REPORTED_ERRORS: usize = 25;

/// Batches beyond this size are still served, but flagged in the logs.
pub const LARGE_BATCH_WARNING: usize = 1500;

// ─── Summaries ───────────────────────────────────────────────────────────────

/// One failed record in a batch. The batch itself keeps going.
#[derive(Debug, Clone, Serialize)]
pub struct RecordError {
  pub lead_id: String,
  pub error:   String,
}

/// Aggregate result of one bulk-upsert call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkUpsertSummary {
  /// Records inserted or patched.
  pub count:                usize,
  /// Records dropped by the meaningful-record predicate.
  pub skipped:              usize,
  /// Pre-existing duplicate rows deleted during the collapse step.
  pub collapsed_duplicates: usize,
  pub errors:               Vec<RecordError>,
  pub errors_truncated:     bool,
}

impl BulkUpsertSummary {
  fn record_failure(&mut self, lead_id: &str, error: impl std::fmt::Display) {
    if self.errors.len() < MAX_REPORTED_ERRORS {
      self.errors.push(RecordError {
        lead_id: lead_id.to_owned(),
        error:   error.to_string(),
      });
    } else {
      self.errors_truncated = true;
    }
  }
}

/// Result of [`remove`].
#[derive(Debug, Clone, Serialize)]
pub struct RemoveSummary {
  pub removed: bool,
}

// ─── Bulk upsert ─────────────────────────────────────────────────────────────

/// Reconcile `batch` against the records already stored in `scope`.
///
/// Two incoming rows sharing a `lead_id` within one batch produce one insert
/// and one patch: inserted records are registered in the working index as
/// the batch progresses.
pub async fn bulk_upsert<S: CustomerStore>(
  store: &S,
  scope: &Scope,
  batch: Vec<IncomingRecord>,
) -> Result<BulkUpsertSummary> {
  if batch.len() > LARGE_BATCH_WARNING {
    tracing::warn!(
      size = batch.len(),
      threshold = LARGE_BATCH_WARNING,
      %scope,
      "oversized bulk-upsert batch"
    );
  }

  let existing = store.list_by_scope(scope).await.map_err(Error::prefetch)?;

  let mut summary = BulkUpsertSummary::default();

  // Collapse duplicate lead ids left behind by earlier unscoped writes.
  // The earliest-created member survives as the scope's canonical entry.
  let mut by_lead: BTreeMap<String, CustomerRecord> = BTreeMap::new();
  let mut losers: Vec<(String, Uuid)> = Vec::new();
  for (lead_id, members) in group::by_lead_id(&existing) {
    let Some(keeper) = members.iter().copied().min_by_key(|r| r.created_at) else {
      continue;
    };
    for member in &members {
      if member.record_id != keeper.record_id {
        losers.push((lead_id.clone(), member.record_id));
      }
    }
    by_lead.insert(lead_id, keeper.clone());
  }
  for (lead_id, record_id) in losers {
    match store.delete(record_id).await {
      Ok(()) => summary.collapsed_duplicates += 1,
      Err(e) => summary.record_failure(&lead_id, e),
    }
  }

  for incoming in batch {
    if !incoming.is_meaningful() {
      summary.skipped += 1;
      continue;
    }

    let lead_id = incoming
      .lead_id
      .clone()
      .filter(|id| !id.trim().is_empty())
      .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Some(current) = by_lead.get_mut(&lead_id) {
      let patch = incoming.to_patch(scope);
      match store.patch(current.record_id, &patch).await {
        Ok(()) => {
          current.apply(&patch);
          summary.count += 1;
        }
        Err(e) => summary.record_failure(&lead_id, e),
      }
    } else {
      let input = incoming.into_new_record(lead_id.clone(), scope);
      match store.insert(input).await {
        Ok(record) => {
          by_lead.insert(lead_id, record);
          summary.count += 1;
        }
        Err(e) => summary.record_failure(&lead_id, e),
      }
    }
  }

  tracing::debug!(
    count = summary.count,
    skipped = summary.skipped,
    collapsed = summary.collapsed_duplicates,
    errors = summary.errors.len(),
    %scope,
    "bulk upsert finished"
  );

  Ok(summary)
}

// ─── Remove ──────────────────────────────────────────────────────────────────

/// Delete every record in `scope` carrying `lead_id`. Deleting all matches
/// keeps the operation correct even against pre-collapse duplicate rows.
pub async fn remove<S: CustomerStore>(
  store: &S,
  scope: &Scope,
  lead_id: &str,
) -> Result<RemoveSummary> {
  let existing = store.list_by_scope(scope).await.map_err(Error::prefetch)?;

  let mut removed = false;
  for record in existing.iter().filter(|r| r.lead_id == lead_id) {
    store.delete(record.record_id).await.map_err(Error::store)?;
    removed = true;
  }

  Ok(RemoveSummary { removed })
}
