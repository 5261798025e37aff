//! JSON REST API for the course-booking backend.
//!
//! Exposes an axum [`Router`] backed by any
//! [`coursebook_core::store::BookingStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", coursebook_api::api_router(store.clone()))
//! ```

pub mod availability;
pub mod envelope;
pub mod error;
pub mod resources;
pub mod transfer;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use coursebook_core::{
  resource::Resource,
  schedule::{BookingUser, Client, Course, CourseDate, CourseGroup, CourseSubgroup, Degree},
  store::BookingStore,
};

pub use envelope::Envelope;
pub use error::ApiError;

/// Register the five CRUD routes of `R` under `path`.
fn crud<S, R>(router: Router<Arc<S>>, path: &str) -> Router<Arc<S>>
where
  S: BookingStore + 'static,
  R: Resource,
{
  router
    .route(
      path,
      get(resources::list::<S, R>).post(resources::create::<S, R>),
    )
    .route(
      &format!("{path}/{{id}}"),
      get(resources::get_one::<S, R>)
        .put(resources::update::<S, R>)
        .delete(resources::delete::<S, R>),
    )
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: BookingStore + 'static,
{
  let router = Router::new()
    .route("/clients/transfer", post(transfer::handler::<S>))
    .route("/courses/{id}/availability", get(availability::handler::<S>));

  let router = crud::<S, Course>(router, "/courses");
  let router = crud::<S, CourseDate>(router, "/course-dates");
  let router = crud::<S, Degree>(router, "/degrees");
  let router = crud::<S, CourseGroup>(router, "/course-groups");
  let router = crud::<S, CourseSubgroup>(router, "/course-subgroups");
  let router = crud::<S, Client>(router, "/clients");
  let router = crud::<S, BookingUser>(router, "/booking-users");

  router.with_state(store)
}

#[cfg(test)]
mod tests;
