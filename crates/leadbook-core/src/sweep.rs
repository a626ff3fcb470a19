//! Maintenance passes: the phone dedup sweep, the unknown-record purge, and
//! the one-time legacy-scope migration.
//!
//! Each pass is a single-pass batch transformation over a snapshot of one
//! scope. All three are idempotent: re-running a completed pass finds
//! nothing left to do.

use serde::Serialize;

use crate::{
  error::{Error, Result},
  group,
  record::{RecordPatch, Scope},
  reconcile::reconcile,
  score::completeness,
  store::CustomerStore,
};

// ─── Phone dedup sweep ───────────────────────────────────────────────────────

/// One collapsed phone group in a [`DedupeSummary`].
#[derive(Debug, Clone, Serialize)]
pub struct MergeDetail {
  /// The normalized phone key the group shared.
  pub phone:           String,
  pub kept_lead_id:    String,
  pub merged_lead_ids: Vec<String>,
}

/// Aggregate result of one dedup sweep.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DedupeSummary {
  /// Non-canonical records deleted.
  pub removed:          usize,
  /// Groups whose canonical received a non-empty merge patch.
  pub merged:           usize,
  /// Groups of two or more members acted on.
  pub groups_processed: usize,
  pub details:          Vec<MergeDetail>,
}

/// Collapse records sharing a normalized phone onto the most complete
/// member.
///
/// Members rank meaningful-first, then by completeness, descending; the
/// stable sort preserves original relative order between equals, and a junk
/// record is never the survivor. Donors fold through the reconciler against
/// a working copy so earlier donors' fills are visible to later ones; the
/// accumulated patch is applied once, then the donors are deleted.
pub async fn dedupe_phones<S: CustomerStore>(
  store: &S,
  scope: &Scope,
) -> Result<DedupeSummary> {
  let records = store.list_by_scope(scope).await.map_err(Error::prefetch)?;

  let mut summary = DedupeSummary::default();

  for (phone, mut members) in group::duplicates_only(group::by_normalized_phone(&records))
  {
    members.sort_by_key(|r| std::cmp::Reverse((r.is_meaningful(), completeness(r))));
    let Some((&canonical, donors)) = members.split_first() else {
      continue;
    };
    if !canonical.is_meaningful() {
      // The whole group is junk; the unknown purge owns those rows.
      continue;
    }

    summary.groups_processed += 1;

    let mut working = canonical.clone();
    let mut patch = RecordPatch::default();
    let mut merged_lead_ids = Vec::with_capacity(donors.len());
    for donor in donors {
      let step = reconcile(&working, donor);
      working.apply(&step);
      patch.merge(step);
      merged_lead_ids.push(donor.lead_id.clone());
    }

    if !patch.is_empty() {
      store
        .patch(canonical.record_id, &patch)
        .await
        .map_err(Error::store)?;
      summary.merged += 1;
    }
    for donor in donors {
      store.delete(donor.record_id).await.map_err(Error::store)?;
      summary.removed += 1;
    }

    tracing::info!(
      phone = %phone,
      kept = %canonical.lead_id,
      merged = merged_lead_ids.len(),
      %scope,
      "collapsed duplicate phone group"
    );

    summary.details.push(MergeDetail {
      phone,
      kept_lead_id: canonical.lead_id.clone(),
      merged_lead_ids,
    });
  }

  Ok(summary)
}

// ─── Unknown purge ───────────────────────────────────────────────────────────

/// Result of [`purge_unknown`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct PurgeSummary {
  pub scanned: usize,
  pub removed: usize,
}

/// Delete every record in `scope` with no identifying signal at all.
pub async fn purge_unknown<S: CustomerStore>(
  store: &S,
  scope: &Scope,
) -> Result<PurgeSummary> {
  let records = store.list_by_scope(scope).await.map_err(Error::prefetch)?;

  let mut summary = PurgeSummary {
    scanned: records.len(),
    removed: 0,
  };
  for record in records.iter().filter(|r| !r.is_meaningful()) {
    store.delete(record.record_id).await.map_err(Error::store)?;
    summary.removed += 1;
  }

  if summary.removed > 0 {
    tracing::info!(removed = summary.removed, %scope, "purged unknown records");
  }

  Ok(summary)
}

// ─── Legacy migration ────────────────────────────────────────────────────────

/// Result of [`migrate_legacy`].
#[derive(Debug, Clone, Serialize)]
pub struct MigrateSummary {
  /// Unscoped rows found by this run.
  pub legacy:  usize,
  pub updated: usize,
  pub dry_run: bool,
}

/// Adopt legacy unscoped rows into `tenant`.
///
/// One-time and idempotent: once every row is adopted, the next run reports
/// `legacy: 0`.
pub async fn migrate_legacy<S: CustomerStore>(
  store: &S,
  tenant: &str,
  dry_run: bool,
) -> Result<MigrateSummary> {
  let legacy_rows = store
    .list_by_scope(&Scope::Global)
    .await
    .map_err(Error::prefetch)?;

  let mut summary = MigrateSummary {
    legacy: legacy_rows.len(),
    updated: 0,
    dry_run,
  };
  if dry_run {
    return Ok(summary);
  }

  for record in &legacy_rows {
    let patch = RecordPatch {
      tenant: Some(tenant.to_owned()),
      ..RecordPatch::default()
    };
    store
      .patch(record.record_id, &patch)
      .await
      .map_err(Error::store)?;
    summary.updated += 1;
  }

  Ok(summary)
}
