//! Error types for `roster-core`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A single field-level problem found while validating a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
  /// Name of the offending field, e.g. `profilePicture`.
  pub path:    String,
  pub message: String,
}

impl ValidationIssue {
  pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
    Self { path: path.into(), message: message.into() }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// Missing id, or a contact whose `deleted_at` is set.
  #[error("contact not found: {0}")]
  ContactNotFound(Uuid),

  #[error("validation failed ({} issue(s))", .0.len())]
  Validation(Vec<ValidationIssue>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("object store error: {0}")]
  ObjectStore(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub(crate) fn object_store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::ObjectStore(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
