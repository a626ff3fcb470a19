//! Handlers for `/brand` — per-tenant branding with global fallback.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use leadbook_core::{
  record::Scope,
  settings::{self, BrandSettings},
  store::SettingsStore,
};
use serde::Deserialize;

use crate::{customers::ScopeParams, error::ApiError};

/// `GET /brand[?scope=<tenant>]` — the tenant's settings, falling back to
/// the global row; `null` when neither exists.
pub async fn get<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ScopeParams>,
) -> Result<Json<Option<BrandSettings>>, ApiError>
where
  S: SettingsStore,
{
  let loaded = settings::load_brand(store.as_ref(), &params.into_scope()).await?;
  Ok(Json(loaded))
}

#[derive(Debug, Deserialize)]
pub struct PutBody {
  #[serde(default)]
  pub scope:    Option<String>,
  pub settings: BrandSettings,
}

/// `PUT /brand` — body: `{"scope": "...", "settings": {...}}`.
/// Oversized payloads are rejected with 413 before any write.
pub async fn put<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<PutBody>,
) -> Result<Json<BrandSettings>, ApiError>
where
  S: SettingsStore,
{
  let scope = Scope::from(body.scope);
  settings::save_brand(store.as_ref(), &scope, &body.settings).await?;
  Ok(Json(body.settings))
}
