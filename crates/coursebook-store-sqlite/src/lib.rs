//! SQLite backend for the course-booking store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each store call is a single closure on
//! that thread, which is what lets a client transfer run as one
//! `rusqlite::Transaction`.

mod encode;
mod port;
mod schema;
mod store;
mod table;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
