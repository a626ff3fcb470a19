//! JSON REST API for Leadbook.
//!
//! Exposes an axum [`Router`] backed by any store implementing
//! [`leadbook_core::store::CustomerStore`] and
//! [`leadbook_core::store::SettingsStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", leadbook_api::api_router(store.clone()))
//! ```

pub mod brand;
pub mod customers;
pub mod error;
pub mod maintenance;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use leadbook_core::store::{CustomerStore, SettingsStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CustomerStore + SettingsStore + 'static,
{
  Router::new()
    // Customers
    .route("/customers", get(customers::list::<S>))
    .route("/customers/bulk", post(customers::bulk::<S>))
    .route("/customers/{lead_id}", delete(customers::remove::<S>))
    // Maintenance
    .route(
      "/maintenance/dedupe-phones",
      post(maintenance::dedupe_phones::<S>),
    )
    .route(
      "/maintenance/purge-unknown",
      post(maintenance::purge_unknown::<S>),
    )
    .route(
      "/maintenance/migrate-legacy",
      post(maintenance::migrate_legacy::<S>),
    )
    // Branding
    .route("/brand", get(brand::get::<S>).put(brand::put::<S>))
    .with_state(store)
}
