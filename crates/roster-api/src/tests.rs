//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::{convert::Infallible, sync::Arc};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode},
};
use bytes::Bytes;
use chrono::{Duration, Utc};
use roster_core::{
  contact::ContactChanges,
  service::ContactService,
  store::{ContactStore, ObjectStore},
};
use roster_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::api_router;

struct StaticObjects;

impl ObjectStore for StaticObjects {
  type Error = Infallible;

  async fn put(&self, _bytes: Bytes, _content_type: &str) -> Result<String, Infallible> {
    Ok(format!("mem://{}.png", Uuid::new_v4()))
  }

  async fn delete(&self, _uri: &str) -> Result<(), Infallible> { Ok(()) }
}

type Service = Arc<ContactService<SqliteStore, StaticObjects>>;

async fn app() -> (Router, Service) {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let service = Arc::new(ContactService::new(store, StaticObjects));
  (api_router(service.clone()), service)
}

async fn request(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header("Content-Type", "application/json");
      Body::from(serde_json::to_vec(&v).unwrap())
    }
    None => Body::empty(),
  };

  let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = response.status();
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
  };
  (status, json)
}

const PIXEL: &str = "data:image/png;base64,iVBORw0KGgo=";

fn create_body(name: &str) -> Value {
  json!({
    "name": name,
    "profilePicture": PIXEL,
    "lastContactAt": "2024-03-01T12:00:00Z",
  })
}

async fn create(router: &Router, name: &str) -> Value {
  let (status, body) = request(router, "POST", "/contacts", Some(create_body(name))).await;
  assert_eq!(status, StatusCode::CREATED);
  body["data"].clone()
}

#[tokio::test]
async fn create_returns_201_with_envelope() {
  let (router, _) = app().await;
  let contact = create(&router, "Ada").await;

  assert_eq!(contact["name"], "Ada");
  assert!(contact["profilePicture"].as_str().unwrap().starts_with("mem://"));
  assert!(contact["archivedAt"].is_null());
  assert!(contact["deletedAt"].is_null());
}

#[tokio::test]
async fn create_with_invalid_body_is_422_with_details() {
  let (router, _) = app().await;
  let (status, body) = request(
    &router,
    "POST",
    "/contacts",
    Some(json!({ "name": "", "profilePicture": "nope", "lastContactAt": "soon" })),
  )
  .await;

  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["error"], "Validation failed");
  let paths: Vec<_> = body["details"]
    .as_array()
    .unwrap()
    .iter()
    .map(|i| i["path"].as_str().unwrap().to_owned())
    .collect();
  assert_eq!(paths, ["name", "profilePicture", "lastContactAt"]);
}

#[tokio::test]
async fn malformed_json_is_422() {
  let (router, _) = app().await;
  let (status, body) =
    request(&router, "POST", "/contacts", Some(json!({ "name": 42 }))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["details"][0]["path"], "body");
}

#[tokio::test]
async fn get_one_and_not_found() {
  let (router, _) = app().await;
  let contact = create(&router, "Ada").await;
  let id = contact["id"].as_str().unwrap();

  let (status, body) = request(&router, "GET", &format!("/contacts/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"], contact);

  let (status, body) =
    request(&router, "GET", &format!("/contacts/{}", Uuid::new_v4()), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "Record not found");

  let (status, _) = request(&router, "GET", "/contacts/not-a-uuid", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_paginates_with_meta() {
  let (router, _) = app().await;
  for i in 0..3 {
    create(&router, &format!("Contact {i}")).await;
  }

  let (status, body) = request(&router, "GET", "/contacts?page=2&limit=2", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"].as_array().unwrap().len(), 1);
  assert_eq!(body["meta"]["total"], 3);
  assert_eq!(body["meta"]["page"], 2);
  assert_eq!(body["meta"]["limit"], 2);
  assert_eq!(body["meta"]["totalPages"], 2);
  assert!(body["meta"].get("hasContacts").is_none());
}

#[tokio::test]
async fn list_search_and_sort() {
  let (router, _) = app().await;
  for name in ["Charlie", "alice", "Bob"] {
    create(&router, name).await;
  }

  let (_, body) = request(&router, "GET", "/contacts?sortBy=name&sortOrder=asc", None).await;
  let names: Vec<_> = body["data"]
    .as_array()
    .unwrap()
    .iter()
    .map(|c| c["name"].as_str().unwrap().to_owned())
    .collect();
  assert_eq!(names, ["alice", "Bob", "Charlie"]);

  let (_, body) = request(&router, "GET", "/contacts?s=LIC", None).await;
  assert_eq!(body["meta"]["total"], 1);
  assert_eq!(body["data"][0]["name"], "alice");
}

#[tokio::test]
async fn archive_via_put_moves_between_tabs() {
  let (router, _) = app().await;
  let contact = create(&router, "Ada").await;
  let id = contact["id"].as_str().unwrap();

  let (status, body) = request(
    &router,
    "PUT",
    &format!("/contacts/{id}"),
    Some(json!({ "archived": true })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["data"]["archivedAt"].is_string());

  let (_, active) = request(&router, "GET", "/contacts", None).await;
  assert_eq!(active["meta"]["total"], 0);
  let (_, archived) = request(&router, "GET", "/contacts?archived=true&includeStats=true", None).await;
  assert_eq!(archived["meta"]["total"], 1);
  assert_eq!(archived["meta"]["totalExistingContacts"], 1);
  assert_eq!(archived["meta"]["hasContacts"], true);

  let (status, body) = request(&router, "POST", &format!("/contacts/{id}/restore"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["data"]["archivedAt"].is_null());
  let (_, active) = request(&router, "GET", "/contacts", None).await;
  assert_eq!(active["data"][0]["id"], id);
}

#[tokio::test]
async fn expired_archive_is_listed_nowhere() {
  let (router, service) = app().await;
  let contact = create(&router, "Old").await;
  let id: Uuid = contact["id"].as_str().unwrap().parse().unwrap();
  let changes = ContactChanges {
    archived_at: Some(Some(Utc::now() - Duration::days(40))),
    ..Default::default()
  };
  service.store().update_by_id(id, changes).await.unwrap();

  let (_, active) = request(&router, "GET", "/contacts", None).await;
  let (_, archived) = request(&router, "GET", "/contacts?archived=true", None).await;
  assert_eq!(active["meta"]["total"], 0);
  assert_eq!(archived["meta"]["total"], 0);
}

#[tokio::test]
async fn delete_is_soft_and_repeatable() {
  let (router, _) = app().await;
  let contact = create(&router, "Ada").await;
  let uri = format!("/contacts/{}", contact["id"].as_str().unwrap());

  let (status, body) = request(&router, "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["data"]["deletedAt"].is_string());

  let (status, _) = request(&router, "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = request(&router, "GET", &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_missing_is_404() {
  let (router, _) = app().await;
  let (status, _) = request(
    &router,
    "PUT",
    &format!("/contacts/{}", Uuid::new_v4()),
    Some(json!({ "name": "x" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}
