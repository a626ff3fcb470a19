//! Error types for `leadbook-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The initial existing-record fetch failed. Fatal for the whole call:
  /// there is nothing to reconcile against.
  #[error("prefetch failed: {0}")]
  Prefetch(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// Brand settings payload rejected before write.
  #[error("brand payload of {size} bytes exceeds the {limit}-byte limit")]
  PayloadTooLarge { size: usize, limit: usize },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn prefetch(source: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Prefetch(Box::new(source))
  }

  pub fn store(source: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(source))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
