//! Core types, traits, and the deduplication/reconciliation logic of the
//! Leadbook customer store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod group;
pub mod normalize;
pub mod record;
pub mod reconcile;
pub mod score;
pub mod settings;
pub mod store;
pub mod sweep;
pub mod upsert;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{Error, Result};
