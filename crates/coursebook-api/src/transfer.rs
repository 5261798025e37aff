//! Handler for `POST /clients/transfer`.
//!
//! Body: `{"initialSubgroupId": 10, "targetSubgroupId": 20,
//! "clientIds": [1, 2], "moveAllDays": false}`.
//!
//! Responds with the subgroups clients were moved into (empty unless
//! `moveAllDays` is set). A missing subgroup is a 404, a group-shape mismatch
//! a 409; in both cases no booking is changed.

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use coursebook_core::{
  schedule::CourseSubgroup, store::BookingStore, transfer::TransferRequest,
};

use crate::{
  envelope::{Envelope, success},
  error::ApiError,
};

pub async fn handler<S>(
  State(store): State<Arc<S>>,
  payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<Envelope<Vec<CourseSubgroup>>>, ApiError>
where
  S: BookingStore,
{
  let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  request.validate()?;

  let today = chrono::Local::now().date_naive();
  let changed = store
    .transfer_clients(request, today)
    .await
    .map_err(ApiError::store)?;

  Ok(success(changed, "Clients transfer successfully"))
}
