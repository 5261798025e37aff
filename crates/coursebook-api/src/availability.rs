//! Handler for `GET /courses/:id/availability[?startDate=...][&endDate=...]`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State, rejection::QueryRejection},
};
use coursebook_core::{
  availability::{DateAvailability, DateRange},
  store::BookingStore,
};

use crate::{
  envelope::{Envelope, success},
  error::ApiError,
};

pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Path(course_id): Path<i64>,
  range: Result<Query<DateRange>, QueryRejection>,
) -> Result<Json<Envelope<Vec<DateAvailability>>>, ApiError>
where
  S: BookingStore,
{
  let Query(range) = range.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  range.validate()?;

  let availability = store
    .availability(course_id, range)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("Course not found".into()))?;

  Ok(success(availability, "Availability retrieved successfully"))
}
