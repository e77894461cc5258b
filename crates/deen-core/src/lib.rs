//! Core types and trait definitions for the Deen Journal record store.
//!
//! This crate is deliberately free of database and file-format dependencies.
//! The SQLite backend, the snapshot codec and the CLI all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod collection;
pub mod error;
pub mod gratitude;
pub mod ibadah;
pub mod journal;
pub mod quran;
pub mod record;
pub mod setting;
pub mod snapshot;
pub mod store;
pub mod views;

pub use collection::Collection;
pub use error::{Error, Result, ValidationError};
