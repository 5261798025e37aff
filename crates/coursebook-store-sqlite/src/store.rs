//! [`SqliteStore`], the SQLite implementation of [`BookingStore`].

use std::{collections::HashMap, path::Path};

use chrono::NaiveDate;
use coursebook_core::{
  availability::{self, DateAvailability, DateRange},
  resource::{Attributes, ListQuery, Page, Resource},
  schedule::{Course, CourseDate, CourseGroup, CourseSubgroup},
  store::{BookingStore, StoreError as _},
  transfer::{TransferPlan, TransferRequest},
};

use crate::{
  Result,
  encode::encode_date,
  port::SqliteSchedule,
  schema::SCHEMA,
  table,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A course-booking store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── BookingStore impl ───────────────────────────────────────────────────────

impl BookingStore for SqliteStore {
  type Error = crate::Error;

  // ── Generic CRUD ──────────────────────────────────────────────────────────

  async fn list<'a, R: Resource>(&'a self, query: &'a ListQuery) -> Result<Page<R>> {
    let query = query.clone();
    self
      .conn
      .call(move |conn| Ok(table::list::<R>(conn, &query)))
      .await?
  }

  async fn find<R: Resource>(&self, id: i64) -> Result<Option<R>> {
    self
      .conn
      .call(move |conn| Ok(table::find::<R>(conn, id)))
      .await?
  }

  async fn create<R: Resource>(&self, draft: R::Draft) -> Result<R> {
    let created = self
      .conn
      .call(move |conn| Ok(table::insert::<R>(conn, &draft)))
      .await??;
    tracing::debug!(table = R::TABLE, id = created.id(), "created record");
    Ok(created)
  }

  async fn update<R: Resource>(&self, id: i64, attrs: Attributes) -> Result<Option<R>> {
    self
      .conn
      .call(move |conn| Ok(table::update::<R>(conn, id, &attrs)))
      .await?
  }

  async fn delete<R: Resource>(&self, id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| Ok(table::delete::<R>(conn, id)))
      .await??;
    if deleted {
      tracing::debug!(table = R::TABLE, id, "deleted record");
    }
    Ok(deleted)
  }

  // ── Scheduling ────────────────────────────────────────────────────────────

  async fn transfer_clients(
    &self,
    request: TransferRequest,
    today: NaiveDate,
  ) -> Result<Vec<CourseSubgroup>> {
    let outcome = self
      .conn
      .call(move |conn| {
        // Lookups fail before any transaction is opened.
        let plan = match TransferPlan::resolve(&SqliteSchedule::new(conn), request) {
          Ok(plan) => plan,
          Err(e) => return Ok(Err(e)),
        };

        let tx = conn.transaction()?;
        let result = plan.apply(&SqliteSchedule::new(&tx), today);
        if result.is_ok() {
          tx.commit()?;
        } else {
          tx.rollback()?;
        }
        Ok(result)
      })
      .await?;

    match &outcome {
      Ok(changed) => tracing::info!(subgroups = changed.len(), "clients transferred"),
      Err(e) if e.core_error().is_some() => {
        tracing::info!(error = %e, "client transfer rejected")
      }
      Err(e) => tracing::error!(error = %e, "client transfer failed"),
    }
    outcome
  }

  async fn availability(
    &self,
    course_id: i64,
    range: DateRange,
  ) -> Result<Option<Vec<DateAvailability>>> {
    range.validate()?;
    let start = range.start_date.map(encode_date);
    let end = range.end_date.map(encode_date);

    let raw = self
      .conn
      .call(move |conn| Ok(load_availability(conn, course_id, start, end)))
      .await??;

    Ok(raw.map(|(dates, groups, subgroups, booked)| {
      availability::summarize(&range, dates, groups, subgroups, &booked)
    }))
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

type AvailabilityRows = (
  Vec<CourseDate>,
  Vec<CourseGroup>,
  Vec<CourseSubgroup>,
  HashMap<i64, i64>,
);

/// Load the rows behind an availability summary. `None` if the course does
/// not exist.
fn load_availability(
  conn:      &rusqlite::Connection,
  course_id: i64,
  start:     Option<String>,
  end:       Option<String>,
) -> Result<Option<AvailabilityRows>> {
  if table::find::<Course>(conn, course_id)?.is_none() {
    return Ok(None);
  }

  let dates = table::select_where(
    conn,
    "course_id = ?1 AND (?2 IS NULL OR date >= ?2) AND (?3 IS NULL OR date <= ?3)",
    rusqlite::params![course_id, start, end],
  )?;
  let groups = table::select_where(conn, "course_id = ?1", [course_id])?;
  let subgroups = table::select_where(conn, "course_id = ?1", [course_id])?;

  let mut stmt = conn.prepare(
    "SELECT b.course_subgroup_id, COUNT(*)
       FROM booking_users b
       JOIN course_subgroups s ON s.id = b.course_subgroup_id
      WHERE s.course_id = ?1
      GROUP BY b.course_subgroup_id",
  )?;
  let booked = stmt
    .query_map([course_id], |r| Ok((r.get(0)?, r.get(1)?)))?
    .collect::<rusqlite::Result<HashMap<i64, i64>>>()?;

  Ok(Some((dates, groups, subgroups, booked)))
}
