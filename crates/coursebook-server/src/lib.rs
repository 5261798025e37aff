//! HTTP server assembly for the course-booking backend.
//!
//! Mounts the JSON API from [`coursebook_api`] under `/api`, adds a liveness
//! probe at `/health`, and wraps everything in request tracing.

use std::{path::Path, sync::Arc};

use axum::{Router, routing::get};
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use coursebook_core::store::BookingStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `COURSEBOOK_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub database_path: String,
}

impl ServerConfig {
  /// Load from `file` (optional) layered under the environment.
  pub fn load(file: &Path) -> Result<Self, ConfigError> {
    Self::from_builder(
      Config::builder()
        .add_source(File::from(file).required(false))
        .add_source(Environment::with_prefix("COURSEBOOK")),
    )
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    builder
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080_i64)?
      .set_default("database_path", "coursebook.db")?
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

async fn health() -> &'static str { "ok" }

/// Build the complete application router for `store`.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: BookingStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", coursebook_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use config::FileFormat;
  use coursebook_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  async fn make_app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    app(Arc::new(store))
  }

  async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
  }

  #[tokio::test]
  async fn health_returns_ok() {
    let (status, body) = get_body(make_app().await, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
  }

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let (status, body) = get_body(make_app().await, "/api/courses").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":true"), "body: {body}");

    let (status, _) = get_body(make_app().await, "/courses").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[test]
  fn config_defaults_fill_missing_keys() {
    let cfg = ServerConfig::from_builder(Config::builder()).unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.database_path, "coursebook.db");
  }

  #[test]
  fn config_file_overrides_defaults() {
    let toml = "port = 9000\ndatabase_path = \"/var/lib/coursebook.db\"\n";
    let cfg = ServerConfig::from_builder(
      Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
    )
    .unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.database_path, "/var/lib/coursebook.db");
  }
}
