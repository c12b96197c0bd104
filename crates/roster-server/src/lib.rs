//! HTTP server assembly for Roster.
//!
//! Wraps the contacts API from `roster-api` in bearer-token auth, serves the
//! profile-picture directory, and adds CORS and request tracing.

pub mod auth;
pub mod error;
pub mod photos;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  http::{HeaderValue, Method, header},
  middleware,
  routing::get,
};
use roster_core::{service::ContactService, store::ContactStore};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::{
  cors::{Any, CorsLayer},
  services::ServeDir,
  trace::TraceLayer,
};

use auth::AuthConfig;
use photos::FsObjectStore;

/// Where stored pictures are served, relative to the server root.
pub const PHOTO_ROUTE: &str = "/photos";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROSTER_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  #[serde(default = "default_photo_dir")]
  pub photo_dir:       PathBuf,
  /// Public URL prefix under which `photo_dir` is reachable.
  #[serde(default = "default_photo_base_url")]
  pub photo_base_url:  String,
  /// argon2 PHC hash of the API token.
  pub auth_token_hash: String,
  /// Allowed browser origin. Absent or `*` allows any origin.
  #[serde(default)]
  pub cors_origin:     Option<String>,
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 3000 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/roster/roster.db") }

fn default_photo_dir() -> PathBuf { PathBuf::from("~/.local/share/roster/photos") }

fn default_photo_base_url() -> String { format!("http://localhost:3000{PHOTO_ROUTE}") }

// ─── Router ───────────────────────────────────────────────────────────────────

/// Type of the service the server runs: any row store, pictures on disk.
pub type Service<S> = Arc<ContactService<S, FsObjectStore>>;

/// Build the full application router.
pub fn router<S>(service: Service<S>, config: &ServerConfig) -> Result<Router, Error>
where
  S: ContactStore + 'static,
{
  let auth_config = Arc::new(AuthConfig { token_hash: config.auth_token_hash.clone() });

  let api = roster_api::api_router(service.clone())
    .layer(middleware::from_fn_with_state(auth_config, auth::require_bearer));

  Ok(
    Router::new()
      .route("/", get(health))
      .merge(api)
      .nest_service(PHOTO_ROUTE, ServeDir::new(service.objects().dir()))
      .layer(cors_layer(config.cors_origin.as_deref())?)
      .layer(TraceLayer::new_for_http()),
  )
}

/// `GET /`, unauthenticated liveness check.
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, Error> {
  let layer = CorsLayer::new()
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
    .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

  match origin {
    None | Some("*") => Ok(layer.allow_origin(Any)),
    Some(origin) => {
      let value =
        HeaderValue::from_str(origin).map_err(|_| Error::InvalidOrigin(origin.to_owned()))?;
      Ok(layer.allow_origin(value))
    }
  }
}
