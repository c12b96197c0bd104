//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::error::ValidationIssue;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("validation failed")]
  Validation(Vec<ValidationIssue>),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<roster_core::Error> for ApiError {
  fn from(e: roster_core::Error) -> Self {
    match e {
      roster_core::Error::ContactNotFound(id) => Self::NotFound(format!("contact {id} not found")),
      roster_core::Error::Validation(issues) => Self::Validation(issues),
      other => Self::Internal(Box::new(other)),
    }
  }
}

/// A body that is not valid JSON for the expected shape is reported like any
/// other validation failure.
impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::Validation(vec![ValidationIssue::new("body", rejection.body_text())])
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => {
        tracing::debug!(%m, "not found");
        (StatusCode::NOT_FOUND, Json(json!({ "error": "Record not found" }))).into_response()
      }
      ApiError::Validation(issues) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": "Validation failed", "details": issues })),
      )
        .into_response(),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "Internal Server Error", "message": e.to_string() })),
        )
          .into_response()
      }
    }
  }
}
