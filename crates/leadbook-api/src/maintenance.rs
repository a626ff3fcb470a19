//! Handlers for `/maintenance` endpoints — the dedup sweep, the unknown
//! purge, and the one-time legacy migration.

use std::sync::Arc;

use axum::{Json, extract::State};
use leadbook_core::{
  record::Scope,
  store::CustomerStore,
  sweep::{self, DedupeSummary, MigrateSummary, PurgeSummary},
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ScopeBody {
  #[serde(default)]
  pub scope: Option<String>,
}

// ─── Dedupe ───────────────────────────────────────────────────────────────────

/// `POST /maintenance/dedupe-phones` — body: `{"scope": "..."}` (optional).
pub async fn dedupe_phones<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ScopeBody>,
) -> Result<Json<DedupeSummary>, ApiError>
where
  S: CustomerStore,
{
  let scope = Scope::from(body.scope);
  let summary = sweep::dedupe_phones(store.as_ref(), &scope).await?;
  Ok(Json(summary))
}

// ─── Purge ────────────────────────────────────────────────────────────────────

/// `POST /maintenance/purge-unknown` — body: `{"scope": "..."}` (optional).
pub async fn purge_unknown<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ScopeBody>,
) -> Result<Json<PurgeSummary>, ApiError>
where
  S: CustomerStore,
{
  let scope = Scope::from(body.scope);
  let summary = sweep::purge_unknown(store.as_ref(), &scope).await?;
  Ok(Json(summary))
}

// ─── Migrate ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MigrateBody {
  pub tenant:  String,
  #[serde(default)]
  pub dry_run: bool,
}

/// `POST /maintenance/migrate-legacy` — body: `{"tenant": "...", "dry_run": false}`.
pub async fn migrate_legacy<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<MigrateBody>,
) -> Result<Json<MigrateSummary>, ApiError>
where
  S: CustomerStore,
{
  if body.tenant.trim().is_empty() {
    return Err(ApiError::BadRequest("tenant must be non-empty".to_owned()));
  }
  let summary =
    sweep::migrate_legacy(store.as_ref(), &body.tenant, body.dry_run).await?;
  Ok(Json(summary))
}
