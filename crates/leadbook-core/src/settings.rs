//! Per-scope brand settings — the one read path with Global fallback.
//!
//! Settings live one row per scope, upserted in place by key. A tenant with
//! no row of its own inherits the global row; the customer/dedup core never
//! has such a fallback.

use serde::{Deserialize, Serialize};

use crate::{
  error::{Error, Result},
  record::Scope,
  store::SettingsStore,
};

/// Serialized settings payloads beyond this size are rejected before write.
/// Logos arrive inline as data URLs, hence the generous cap.
pub const MAX_BRAND_PAYLOAD_BYTES: usize = 256 * 1024;

/// Tenant-facing branding: display name, logo, theme variables, and the
/// per-status pipeline colors. Free-form maps stay as JSON values — the UI
/// owns their vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandSettings {
  pub brand_name:    Option<String>,
  pub logo_data_url: Option<String>,
  pub theme:         Option<serde_json::Value>,
  pub status_colors: Option<serde_json::Value>,
}

/// The settings for `scope`: the tenant's own row, else the global row,
/// else nothing.
pub async fn load_brand<S: SettingsStore>(
  store: &S,
  scope: &Scope,
) -> Result<Option<BrandSettings>> {
  if let Some(settings) = store.get_brand(scope).await.map_err(Error::store)? {
    return Ok(Some(settings));
  }
  match scope {
    Scope::Tenant(_) => store.get_brand(&Scope::Global).await.map_err(Error::store),
    Scope::Global => Ok(None),
  }
}

/// Validate and upsert the settings row for `scope`.
pub async fn save_brand<S: SettingsStore>(
  store: &S,
  scope: &Scope,
  settings: &BrandSettings,
) -> Result<()> {
  let size = serde_json::to_string(settings)?.len();
  if size > MAX_BRAND_PAYLOAD_BYTES {
    return Err(Error::PayloadTooLarge {
      size,
      limit: MAX_BRAND_PAYLOAD_BYTES,
    });
  }
  store.put_brand(scope, settings).await.map_err(Error::store)
}
