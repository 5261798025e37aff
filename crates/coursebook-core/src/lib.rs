//! Core types and trait definitions for the course-booking backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it. The scheduling algorithms (client transfer,
//! availability) are written against the ports defined here so they can run
//! inside whatever transaction a backend provides.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod availability;
pub mod error;
pub mod resource;
pub mod schedule;
pub mod store;
pub mod transfer;

pub use error::{Error, Result};
