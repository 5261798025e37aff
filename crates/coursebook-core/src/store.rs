//! The `BookingStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `coursebook-store-sqlite`). The HTTP layer depends on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  Error,
  availability::{DateAvailability, DateRange},
  resource::{Attributes, ListQuery, Page, Resource},
  schedule::CourseSubgroup,
  transfer::TransferRequest,
};

/// Lets callers tell domain failures (not found, shape mismatch, bad input)
/// apart from storage failures without knowing the backend's error type.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn core_error(&self) -> Option<&Error>;
}

/// Abstraction over a course-booking store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait BookingStore: Send + Sync {
  type Error: StoreError;

  // ── Generic CRUD ──────────────────────────────────────────────────────

  /// List records of `R` matching `query`.
  fn list<'a, R: Resource>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<R>, Self::Error>> + Send + 'a;

  /// Retrieve a record by id. Returns `None` if not found.
  fn find<R: Resource>(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<R>, Self::Error>> + Send + '_;

  /// Insert a record and return it with its assigned id.
  fn create<R: Resource>(
    &self,
    draft: R::Draft,
  ) -> impl Future<Output = Result<R, Self::Error>> + Send + '_;

  /// Overwrite the given columns. Returns `None` if the record does not
  /// exist.
  fn update<R: Resource>(
    &self,
    id: i64,
    attrs: Attributes,
  ) -> impl Future<Output = Result<Option<R>, Self::Error>> + Send + '_;

  /// Delete a record. Returns `false` if it did not exist.
  fn delete<R: Resource>(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Scheduling ────────────────────────────────────────────────────────

  /// Move clients between subgroups atomically; see [`crate::transfer`].
  ///
  /// `today` is the inclusive lower bound for dates touched in all-days
  /// mode. Returns the subgroups clients were moved into (empty in
  /// single-date mode).
  fn transfer_clients(
    &self,
    request: TransferRequest,
    today: NaiveDate,
  ) -> impl Future<Output = Result<Vec<CourseSubgroup>, Self::Error>> + Send + '_;

  /// Availability of every subgroup of `course_id` on dates in `range`.
  /// Returns `None` if the course does not exist.
  fn availability(
    &self,
    course_id: i64,
    range: DateRange,
  ) -> impl Future<Output = Result<Option<Vec<DateAvailability>>, Self::Error>> + Send + '_;
}
