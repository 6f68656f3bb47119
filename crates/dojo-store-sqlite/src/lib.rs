//! SQLite backend for the Dojo academy store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each operation that maintains an
//! invariant across rows runs inside one `BEGIN IMMEDIATE` transaction.

mod belts;
mod billing;
mod encode;
mod enrollment;
mod people;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
