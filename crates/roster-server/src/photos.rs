//! [`FsObjectStore`]: profile pictures kept as plain files in a directory.
//!
//! Objects are named `<uuid>.<ext>` and addressed by `<base_url>/<name>`; the
//! router serves the directory under that base URL.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use roster_core::{contact::image_extension, store::ObjectStore};
use tokio::io::AsyncWriteExt as _;
use tracing::debug;
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone)]
pub struct FsObjectStore {
  dir:      PathBuf,
  base_url: String,
}

impl FsObjectStore {
  /// Create the store, making `dir` if needed.
  pub async fn open(dir: impl Into<PathBuf>, base_url: &str) -> Result<Self, Error> {
    let dir = dir.into();
    tokio::fs::create_dir_all(&dir).await?;
    Ok(Self { dir, base_url: base_url.trim_end_matches('/').to_owned() })
  }

  pub fn dir(&self) -> &Path { &self.dir }

  /// Map a URI produced by [`put`](ObjectStore::put) back to its file.
  fn path_for(&self, uri: &str) -> Result<PathBuf, Error> {
    let name = uri
      .strip_prefix(&self.base_url)
      .and_then(|rest| rest.strip_prefix('/'))
      .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && !name.starts_with('.'))
      .ok_or_else(|| Error::ForeignObject(uri.to_owned()))?;
    Ok(self.dir.join(name))
  }
}

impl ObjectStore for FsObjectStore {
  type Error = Error;

  async fn put(&self, bytes: Bytes, content_type: &str) -> Result<String, Error> {
    let name = format!("{}.{}", Uuid::new_v4(), image_extension(content_type));
    // Durable before the URI is returned.
    let mut file = tokio::fs::File::create(self.dir.join(&name)).await?;
    file.write_all(&bytes).await?;
    file.sync_all().await?;
    debug!(%name, size = bytes.len(), "stored picture");
    Ok(format!("{}/{name}", self.base_url))
  }

  async fn delete(&self, uri: &str) -> Result<(), Error> {
    let path = self.path_for(uri)?;
    match tokio::fs::remove_file(&path).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}
