//! The `CustomerStore` and `SettingsStore` traits.
//!
//! Implemented by storage backends (e.g. `leadbook-store-sqlite`). The
//! reconciliation operations and the HTTP layer depend on these
//! abstractions, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  record::{CustomerRecord, NewCustomerRecord, RecordPatch, Scope},
  settings::BrandSettings,
};

/// Abstraction over the customer record collection.
///
/// Only single-document operations exist: each insert, patch, and delete is
/// atomic on its own and no cross-document transaction is assumed. A crash
/// mid-batch can leave partial writes; the reconciliation operations are
/// written to be re-runnable on top of them.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CustomerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// List records in `scope`. `Scope::Global` selects only unscoped legacy
  /// rows; the two populations are never merged here.
  fn list_by_scope<'a>(
    &'a self,
    scope: &'a Scope,
  ) -> impl Future<Output = Result<Vec<CustomerRecord>, Self::Error>> + Send + 'a;

  /// Full scan across every scope.
  fn list_all(
    &self,
  ) -> impl Future<Output = Result<Vec<CustomerRecord>, Self::Error>> + Send + '_;

  /// Persist a new record; the store assigns `record_id` and `created_at`.
  fn insert(
    &self,
    input: NewCustomerRecord,
  ) -> impl Future<Output = Result<CustomerRecord, Self::Error>> + Send + '_;

  /// Apply a partial update to a single record.
  fn patch<'a>(
    &'a self,
    record_id: Uuid,
    patch: &'a RecordPatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete a single record.
  fn delete(
    &self,
    record_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Keyed brand-settings rows — exactly one row per scope, upserted in place.
pub trait SettingsStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The settings row for exactly `scope`, with no fallback.
  fn get_brand<'a>(
    &'a self,
    scope: &'a Scope,
  ) -> impl Future<Output = Result<Option<BrandSettings>, Self::Error>> + Send + 'a;

  /// Insert or replace the settings row for `scope`.
  fn put_brand<'a>(
    &'a self,
    scope: &'a Scope,
    settings: &'a BrandSettings,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
