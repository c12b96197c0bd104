//! Async HTTP client wrapping the Roster JSON API.

use std::{future::Future, time::Duration};

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, RequestBuilder, Response};
use roster_core::{
  contact::Contact,
  error::ValidationIssue,
  pagination::{Envelope, Paginated},
  query::QueryDescriptor,
  validate::{CreateContactBody, UpdateContactBody},
};
use serde::{Deserialize, de::DeserializeOwned};
use uuid::Uuid;

/// The calls the synchronizer needs from a server.
///
/// [`ApiClient`] is the real implementation; tests substitute an in-memory
/// one.
pub trait ContactsBackend: Send + Sync {
  fn list<'a>(
    &'a self,
    query: &'a QueryDescriptor,
    include_stats: bool,
  ) -> impl Future<Output = Result<Paginated<Contact>>> + Send + 'a;

  fn get(&self, id: Uuid) -> impl Future<Output = Result<Contact>> + Send + '_;

  fn create<'a>(
    &'a self,
    body: &'a CreateContactBody,
  ) -> impl Future<Output = Result<Contact>> + Send + 'a;

  fn update<'a>(
    &'a self,
    id: Uuid,
    body: &'a UpdateContactBody,
  ) -> impl Future<Output = Result<Contact>> + Send + 'a;

  fn archive(&self, id: Uuid) -> impl Future<Output = Result<Contact>> + Send + '_;

  fn restore(&self, id: Uuid) -> impl Future<Output = Result<Contact>> + Send + '_;

  fn delete(&self, id: Uuid) -> impl Future<Output = Result<Contact>> + Send + '_;
}

/// Connection settings for the Roster API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub token:    String,
}

/// Async HTTP client for the Roster JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

/// Error body returned by the server for 4xx/5xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
  error:   String,
  #[serde(default)]
  message: Option<String>,
  #[serde(default)]
  details: Vec<ValidationIssue>,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.config.token.is_empty() { req } else { req.bearer_auth(&self.config.token) }
  }

  /// Send `req` and decode a successful JSON body, turning error bodies into
  /// readable messages.
  async fn send<T: DeserializeOwned>(&self, label: &str, req: RequestBuilder) -> Result<T> {
    let resp = self
      .auth(req)
      .send()
      .await
      .with_context(|| format!("{label} failed"))?;

    if !resp.status().is_success() {
      return Err(error_from(label, resp).await);
    }
    resp.json().await.with_context(|| format!("deserialising {label}"))
  }

  async fn send_one(&self, label: &str, req: RequestBuilder) -> Result<Contact> {
    let envelope: Envelope<Contact> = self.send(label, req).await?;
    Ok(envelope.data)
  }
}

async fn error_from(label: &str, resp: Response) -> anyhow::Error {
  let status = resp.status();
  match resp.json::<ErrorBody>().await {
    Ok(body) => {
      let mut msg = format!("{label} → {status}: {}", body.error);
      if let Some(m) = body.message {
        msg.push_str(&format!(" ({m})"));
      }
      for issue in body.details {
        msg.push_str(&format!("\n  {}: {}", issue.path, issue.message));
      }
      anyhow!(msg)
    }
    Err(_) => anyhow!("{label} → {status}"),
  }
}

/// Query-string pairs for a listing request.
pub fn query_pairs(query: &QueryDescriptor, include_stats: bool) -> Vec<(&'static str, String)> {
  let mut pairs = vec![
    ("page", query.page.page().to_string()),
    ("limit", query.page.limit().to_string()),
    ("archived", query.archived.to_string()),
    ("sortBy", query.sort.field.as_str().to_owned()),
    ("sortOrder", query.sort.direction.as_str().to_owned()),
  ];
  if let Some(s) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
    pairs.push(("s", s.to_owned()));
  }
  if include_stats {
    pairs.push(("includeStats", "true".to_owned()));
  }
  pairs
}

impl ContactsBackend for ApiClient {
  /// `GET /contacts`
  async fn list(&self, query: &QueryDescriptor, include_stats: bool) -> Result<Paginated<Contact>> {
    let req = self
      .client
      .get(self.url("/contacts"))
      .query(&query_pairs(query, include_stats));
    self.send("GET /contacts", req).await
  }

  /// `GET /contacts/{id}`
  async fn get(&self, id: Uuid) -> Result<Contact> {
    let req = self.client.get(self.url(&format!("/contacts/{id}")));
    self.send_one("GET /contacts/{id}", req).await
  }

  /// `POST /contacts`
  async fn create(&self, body: &CreateContactBody) -> Result<Contact> {
    let req = self.client.post(self.url("/contacts")).json(body);
    self.send_one("POST /contacts", req).await
  }

  /// `PUT /contacts/{id}`
  async fn update(&self, id: Uuid, body: &UpdateContactBody) -> Result<Contact> {
    let req = self.client.put(self.url(&format!("/contacts/{id}"))).json(body);
    self.send_one("PUT /contacts/{id}", req).await
  }

  /// `POST /contacts/{id}/archive`
  async fn archive(&self, id: Uuid) -> Result<Contact> {
    let req = self.client.post(self.url(&format!("/contacts/{id}/archive")));
    self.send_one("POST /contacts/{id}/archive", req).await
  }

  /// `POST /contacts/{id}/restore`
  async fn restore(&self, id: Uuid) -> Result<Contact> {
    let req = self.client.post(self.url(&format!("/contacts/{id}/restore")));
    self.send_one("POST /contacts/{id}/restore", req).await
  }

  /// `DELETE /contacts/{id}`
  async fn delete(&self, id: Uuid) -> Result<Contact> {
    let req = self.client.delete(self.url(&format!("/contacts/{id}")));
    self.send_one("DELETE /contacts/{id}", req).await
  }
}

#[cfg(test)]
mod tests {
  use roster_core::{
    pagination::PageRequest,
    query::{Sort, SortDirection, SortField},
  };

  use super::*;

  fn lookup<'a>(pairs: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
  }

  #[test]
  fn default_query_pairs() {
    let pairs = query_pairs(&QueryDescriptor::default(), false);
    assert_eq!(lookup(&pairs, "page"), Some("1"));
    assert_eq!(lookup(&pairs, "limit"), Some("10"));
    assert_eq!(lookup(&pairs, "archived"), Some("false"));
    assert_eq!(lookup(&pairs, "sortBy"), Some("createdAt"));
    assert_eq!(lookup(&pairs, "sortOrder"), Some("desc"));
    assert_eq!(lookup(&pairs, "s"), None);
    assert_eq!(lookup(&pairs, "includeStats"), None);
  }

  #[test]
  fn search_stats_and_sort_are_forwarded() {
    let query = QueryDescriptor {
      page:     PageRequest::new(Some(3), Some(25)),
      archived: true,
      search:   Some("ada".into()),
      sort:     Sort::new(SortField::Name, SortDirection::Asc),
    };
    let pairs = query_pairs(&query, true);
    assert_eq!(lookup(&pairs, "page"), Some("3"));
    assert_eq!(lookup(&pairs, "archived"), Some("true"));
    assert_eq!(lookup(&pairs, "s"), Some("ada"));
    assert_eq!(lookup(&pairs, "sortBy"), Some("name"));
    assert_eq!(lookup(&pairs, "sortOrder"), Some("asc"));
    assert_eq!(lookup(&pairs, "includeStats"), Some("true"));
  }

  #[test]
  fn error_body_parses_details() {
    let body: ErrorBody = serde_json::from_str(
      r#"{"error":"Validation failed","details":[{"path":"name","message":"Name is required"}]}"#,
    )
    .unwrap();
    assert_eq!(body.error, "Validation failed");
    assert_eq!(body.details[0].path, "name");
    assert!(body.message.is_none());
  }
}
