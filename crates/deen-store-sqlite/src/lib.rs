//! SQLite backend for the Deen Journal record store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every operation, including the generic
//! table operations exposed through [`Txn`], runs inside a single SQLite
//! transaction on that thread.

mod encode;
mod reconcile;
mod schema;
mod store;

pub mod error;
pub mod table;
pub mod txn;

pub use error::{Error, Result};
pub use store::SqliteStore;
pub use table::Table;
pub use txn::Txn;

#[cfg(test)]
mod tests;
