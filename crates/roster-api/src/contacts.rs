//! Handlers for `/contacts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/contacts` | `?page&limit&archived&s&sortBy&sortOrder&includeStats` |
//! | `POST`   | `/contacts` | 201 with the created contact |
//! | `GET`    | `/contacts/{id}` | 404 if missing or deleted |
//! | `PUT`    | `/contacts/{id}` | partial update, `archived: bool` toggles archival |
//! | `DELETE` | `/contacts/{id}` | soft delete |
//! | `POST`   | `/contacts/{id}/archive` | |
//! | `POST`   | `/contacts/{id}/restore` | |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  contact::Contact,
  pagination::{Envelope, PageRequest, Paginated},
  query::{QueryDescriptor, Sort, SortDirection, SortField},
  service::ContactService,
  store::{ContactStore, ObjectStore},
  validate::{CreateContactBody, UpdateContactBody, validate_create, validate_update},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

type Service<S, O> = State<Arc<ContactService<S, O>>>;

/// Ids that do not parse cannot name a contact.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("contact {raw} not found")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// Raw listing parameters. Everything arrives as text and is parsed leniently.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub page:          Option<String>,
  pub limit:         Option<String>,
  /// Absent or `"false"` selects the active tab; any other value the
  /// archived tab.
  pub archived:      Option<String>,
  /// Search term.
  pub s:             Option<String>,
  pub sort_by:       Option<String>,
  pub sort_order:    Option<String>,
  pub include_stats: Option<String>,
}

fn flag(value: Option<&str>) -> bool { value.is_some_and(|v| v != "false") }

fn number(value: Option<&str>) -> Option<i64> { value.and_then(|v| v.trim().parse().ok()) }

impl ListParams {
  pub fn include_stats(&self) -> bool { flag(self.include_stats.as_deref()) }

  pub fn descriptor(&self) -> QueryDescriptor {
    QueryDescriptor {
      page:     PageRequest::new(number(self.page.as_deref()), number(self.limit.as_deref())),
      archived: flag(self.archived.as_deref()),
      search:   self.s.clone(),
      sort:     Sort::new(
        self.sort_by.as_deref().map(SortField::parse_lossy).unwrap_or_default(),
        self.sort_order.as_deref().map(SortDirection::parse_lossy).unwrap_or_default(),
      ),
    }
  }
}

/// `GET /contacts`
pub async fn list<S, O>(
  State(service): Service<S, O>,
  Query(params): Query<ListParams>,
) -> Result<Json<Paginated<Contact>>, ApiError>
where
  S: ContactStore,
  O: ObjectStore,
{
  let page = service.list(&params.descriptor(), params.include_stats()).await?;
  Ok(Json(page))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contacts/{id}`
pub async fn get_one<S, O>(
  State(service): Service<S, O>,
  Path(id): Path<String>,
) -> Result<Json<Envelope<Contact>>, ApiError>
where
  S: ContactStore,
  O: ObjectStore,
{
  let contact = service.get_by_id(parse_id(&id)?).await?;
  Ok(Json(Envelope { data: contact }))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /contacts`
pub async fn create<S, O>(
  State(service): Service<S, O>,
  body: Result<Json<CreateContactBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContactStore,
  O: ObjectStore,
{
  let Json(body) = body?;
  let contact = service.create(validate_create(body)?).await?;
  Ok((StatusCode::CREATED, Json(Envelope { data: contact })))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /contacts/{id}`
pub async fn update<S, O>(
  State(service): Service<S, O>,
  Path(id): Path<String>,
  body: Result<Json<UpdateContactBody>, JsonRejection>,
) -> Result<Json<Envelope<Contact>>, ApiError>
where
  S: ContactStore,
  O: ObjectStore,
{
  let id = parse_id(&id)?;
  let Json(body) = body?;
  let contact = service.update(id, validate_update(body)?).await?;
  Ok(Json(Envelope { data: contact }))
}

/// `POST /contacts/{id}/archive`
pub async fn archive<S, O>(
  State(service): Service<S, O>,
  Path(id): Path<String>,
) -> Result<Json<Envelope<Contact>>, ApiError>
where
  S: ContactStore,
  O: ObjectStore,
{
  let contact = service.archive(parse_id(&id)?).await?;
  Ok(Json(Envelope { data: contact }))
}

/// `POST /contacts/{id}/restore`
pub async fn restore<S, O>(
  State(service): Service<S, O>,
  Path(id): Path<String>,
) -> Result<Json<Envelope<Contact>>, ApiError>
where
  S: ContactStore,
  O: ObjectStore,
{
  let contact = service.restore(parse_id(&id)?).await?;
  Ok(Json(Envelope { data: contact }))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /contacts/{id}` — soft delete; returns the row with `deletedAt` set.
pub async fn destroy<S, O>(
  State(service): Service<S, O>,
  Path(id): Path<String>,
) -> Result<Json<Envelope<Contact>>, ApiError>
where
  S: ContactStore,
  O: ObjectStore,
{
  let contact = service.delete(parse_id(&id)?).await?;
  Ok(Json(Envelope { data: contact }))
}
