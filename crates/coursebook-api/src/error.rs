//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure is rendered as `{"success": false, "message": ..., "code": ...}`
//! where `code` repeats the HTTP status.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use coursebook_core::{Error as CoreError, store::StoreError};
use serde_json::json;
use thiserror::Error;

/// Message returned when a transfer references a missing subgroup.
pub const SUBGROUP_NOT_FOUND: &str = "No existe el subgrupo";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error by the domain error it carries, if any.
  pub fn store<E: StoreError>(e: E) -> Self {
    let classified = e.core_error().map(Self::from_core);
    match classified {
      Some(classified) => classified,
      None => Self::Store(Box::new(e)),
    }
  }

  fn from_core(core: &CoreError) -> Self {
    match core {
      CoreError::SubgroupNotFound(_) => Self::NotFound(SUBGROUP_NOT_FOUND.to_owned()),
      e if e.is_not_found() => Self::NotFound(e.to_string()),
      CoreError::ShapeMismatch { .. } | CoreError::Conflict(_) => {
        Self::Conflict(core.to_string())
      }
      _ => Self::BadRequest(core.to_string()),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self { Self::from_core(&e) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if let ApiError::Store(e) = &self {
      tracing::error!(error = %e, "store failure");
    }
    let body = json!({
      "success": false,
      "message": self.to_string(),
      "code":    status.as_u16(),
    });
    (status, Json(body)).into_response()
  }
}
