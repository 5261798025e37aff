//! The `{success, data, message}` wrapper around every successful response.

use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
  pub success: bool,
  pub data:    T,
  pub message: String,
}

/// Wrap `data` in a successful envelope.
pub fn success<T: Serialize>(data: T, message: impl Into<String>) -> Json<Envelope<T>> {
  Json(Envelope { success: true, data, message: message.into() })
}
