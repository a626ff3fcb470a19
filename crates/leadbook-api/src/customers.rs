//! Handlers for `/customers` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/customers` | Optional `?scope=<tenant>`; absent = legacy rows |
//! | `POST`   | `/customers/bulk` | Body: `{"scope": "...", "records": [...]}` |
//! | `DELETE` | `/customers/:lead_id` | Optional `?scope=<tenant>` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use leadbook_core::{
  record::{CustomerRecord, IncomingRecord, Scope},
  store::CustomerStore,
  upsert::{self, BulkUpsertSummary, RemoveSummary},
};
use serde::Deserialize;

use crate::error::ApiError;

/// Query parameters shared by the scoped endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeParams {
  pub scope: Option<String>,
}

impl ScopeParams {
  pub fn into_scope(self) -> Scope {
    Scope::from(self.scope)
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /customers[?scope=<tenant>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ScopeParams>,
) -> Result<Json<Vec<CustomerRecord>>, ApiError>
where
  S: CustomerStore,
{
  let records = store
    .list_by_scope(&params.into_scope())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(records))
}

// ─── Bulk upsert ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BulkBody {
  #[serde(default)]
  pub scope:   Option<String>,
  pub records: Vec<IncomingRecord>,
}

/// `POST /customers/bulk`
pub async fn bulk<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<BulkBody>,
) -> Result<Json<BulkUpsertSummary>, ApiError>
where
  S: CustomerStore,
{
  let scope = Scope::from(body.scope);
  let summary = upsert::bulk_upsert(store.as_ref(), &scope, body.records).await?;
  Ok(Json(summary))
}

// ─── Remove ───────────────────────────────────────────────────────────────────

/// `DELETE /customers/:lead_id[?scope=<tenant>]`
///
/// `removed: false` rather than 404 when the lead id is absent — removal is
/// idempotent.
pub async fn remove<S>(
  State(store): State<Arc<S>>,
  Path(lead_id): Path<String>,
  Query(params): Query<ScopeParams>,
) -> Result<Json<RemoveSummary>, ApiError>
where
  S: CustomerStore,
{
  let summary =
    upsert::remove(store.as_ref(), &params.into_scope(), &lead_id).await?;
  Ok(Json(summary))
}
