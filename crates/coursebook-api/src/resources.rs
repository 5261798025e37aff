//! Generic CRUD handlers, instantiated once per [`Resource`].
//!
//! | Method   | Path              | Notes |
//! |----------|-------------------|-------|
//! | `GET`    | `/<resource>`     | Filters, `search`, `skip`/`limit` or `page`/`perPage`, `orderColumn`, `orderDirection` |
//! | `POST`   | `/<resource>`     | Body: the resource's draft; returns 201 |
//! | `GET`    | `/<resource>/:id` | 404 if not found |
//! | `PUT`    | `/<resource>/:id` | Body: partial attributes |
//! | `DELETE` | `/<resource>/:id` | 404 if not found |

use std::{collections::HashMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use coursebook_core::{
  resource::{Attributes, ListQuery, Page, Resource, SortDirection},
  store::BookingStore,
};

use crate::{
  envelope::{Envelope, success},
  error::ApiError,
};

// ─── Query parsing ───────────────────────────────────────────────────────────

fn parse_number(key: &str, value: &str) -> Result<usize, ApiError> {
  value
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("{key} must be a non-negative integer")))
}

/// Split raw query params into the reserved list options and column filters.
pub fn list_query(params: HashMap<String, String>) -> Result<ListQuery, ApiError> {
  let mut query = ListQuery::default();
  for (key, value) in params {
    match key.as_str() {
      "search" => query.search = Some(value),
      "skip" => query.skip = Some(parse_number(&key, &value)?),
      "limit" => query.limit = Some(parse_number(&key, &value)?),
      "page" => query.page = Some(parse_number(&key, &value)?),
      "perPage" => query.per_page = Some(parse_number(&key, &value)?),
      "orderColumn" => query.order_column = Some(value),
      "orderDirection" => {
        query.order_direction = match value.to_ascii_lowercase().as_str() {
          "asc" => SortDirection::Asc,
          "desc" => SortDirection::Desc,
          _ => {
            return Err(ApiError::BadRequest(
              "orderDirection must be asc or desc".into(),
            ));
          }
        }
      }
      _ => query.filters.push((key, value)),
    }
  }
  // Deterministic SQL for identical requests.
  query.filters.sort();
  Ok(query)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
  payload
    .map(|Json(t)| t)
    .map_err(|e| ApiError::BadRequest(e.body_text()))
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /<resource>`
pub async fn list<S, R>(
  State(store): State<Arc<S>>,
  Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<Page<R>>>, ApiError>
where
  S: BookingStore,
  R: Resource,
{
  let query = list_query(params)?;
  let page = store.list::<R>(&query).await.map_err(ApiError::store)?;
  Ok(success(page, format!("{}s retrieved successfully", R::LABEL)))
}

/// `POST /<resource>`: returns 201 and the stored record.
pub async fn create<S, R>(
  State(store): State<Arc<S>>,
  payload: Result<Json<R::Draft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BookingStore,
  R: Resource,
{
  let draft = body(payload)?;
  let record = store.create::<R>(draft).await.map_err(ApiError::store)?;
  Ok((
    StatusCode::CREATED,
    success(record, format!("{} saved successfully", R::LABEL)),
  ))
}

/// `GET /<resource>/:id`
pub async fn get_one<S, R>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Envelope<R>>, ApiError>
where
  S: BookingStore,
  R: Resource,
{
  let record = store
    .find::<R>(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("{} not found", R::LABEL)))?;
  Ok(success(record, format!("{} retrieved successfully", R::LABEL)))
}

/// `PUT /<resource>/:id` with partial attributes.
pub async fn update<S, R>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  payload: Result<Json<Attributes>, JsonRejection>,
) -> Result<Json<Envelope<R>>, ApiError>
where
  S: BookingStore,
  R: Resource,
{
  let attrs = body(payload)?;
  let record = store
    .update::<R>(id, attrs)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("{} not found", R::LABEL)))?;
  Ok(success(record, format!("{} updated successfully", R::LABEL)))
}

/// `DELETE /<resource>/:id`
pub async fn delete<S, R>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Envelope<()>>, ApiError>
where
  S: BookingStore,
  R: Resource,
{
  if !store.delete::<R>(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("{} not found", R::LABEL)));
  }
  Ok(success((), format!("{} deleted successfully", R::LABEL)))
}
