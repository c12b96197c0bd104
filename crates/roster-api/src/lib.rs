//! JSON REST API for Roster.
//!
//! Exposes an axum [`Router`] backed by a [`ContactService`]. Auth, CORS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(roster_api::api_router(service.clone()))
//! ```

pub mod contacts;
pub mod error;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use roster_core::{
  service::ContactService,
  store::{ContactStore, ObjectStore},
};

pub use error::ApiError;

/// Build the contacts API router for `service`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S, O>(service: Arc<ContactService<S, O>>) -> Router<()>
where
  S: ContactStore + 'static,
  O: ObjectStore + 'static,
{
  Router::new()
    .route(
      "/contacts",
      get(contacts::list::<S, O>).post(contacts::create::<S, O>),
    )
    .route(
      "/contacts/{id}",
      get(contacts::get_one::<S, O>)
        .put(contacts::update::<S, O>)
        .delete(contacts::destroy::<S, O>),
    )
    .route("/contacts/{id}/archive", post(contacts::archive::<S, O>))
    .route("/contacts/{id}/restore", post(contacts::restore::<S, O>))
    .with_state(service)
}

#[cfg(test)]
mod tests;
