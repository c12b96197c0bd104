//! The contact record and the write-side types that produce and change it.
//!
//! Contacts are never physically removed. Archival and deletion are both
//! expressed as nullable timestamps; which of the two views (active or
//! archived) a contact shows up in is decided at query time.

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long an archived contact stays visible in the archived view.
///
/// Older archived contacts are kept in storage but hidden from every listing
/// until a cleanup job removes them.
pub const ARCHIVE_RETENTION_DAYS: i64 = 30;

/// The oldest `archived_at` that is still visible as of `now`.
pub fn archive_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
  now - Duration::days(ARCHIVE_RETENTION_DAYS)
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A persisted contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id:              Uuid,
  pub name:            String,
  /// URI returned by the object store; empty when no picture was supplied.
  pub profile_picture: String,
  pub last_contact_at: DateTime<Utc>,
  pub archived_at:     Option<DateTime<Utc>>,
  pub deleted_at:      Option<DateTime<Utc>>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

/// Which of the mutually exclusive lifecycle states a contact is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactState {
  Active,
  /// Archived within the retention window; listed under the archived view.
  Archived,
  /// Archived before the retention window; listed nowhere.
  ArchiveExpired,
  Deleted,
}

impl Contact {
  /// Resolve the lifecycle state of this contact as of `now`.
  pub fn state(&self, now: DateTime<Utc>) -> ContactState {
    match (self.deleted_at, self.archived_at) {
      (Some(_), _) => ContactState::Deleted,
      (None, None) => ContactState::Active,
      (None, Some(at)) if at >= archive_cutoff(now) => ContactState::Archived,
      (None, Some(_)) => ContactState::ArchiveExpired,
    }
  }

  pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }
}

// ─── Write-side inputs ───────────────────────────────────────────────────────

/// Raw image bytes waiting to be handed to the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
  pub bytes:        Bytes,
  /// MIME type, e.g. `image/png`.
  pub content_type: String,
}

/// File extension for an image MIME type. Unknown types get `bin`.
pub fn image_extension(content_type: &str) -> &'static str {
  match content_type {
    "image/png" => "png",
    "image/jpeg" | "image/jpg" => "jpg",
    _ => "bin",
  }
}

/// A validated request to create a contact.
#[derive(Debug, Clone)]
pub struct NewContact {
  pub name:            String,
  pub picture:         Option<ImageUpload>,
  pub last_contact_at: DateTime<Utc>,
}

/// The archived tri-state of a partial update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArchiveChange {
  #[default]
  NoChange,
  /// Set `archived_at` to now.
  Archive,
  /// Clear `archived_at`.
  Unarchive,
}

impl From<Option<bool>> for ArchiveChange {
  fn from(archived: Option<bool>) -> Self {
    match archived {
      None => Self::NoChange,
      Some(true) => Self::Archive,
      Some(false) => Self::Unarchive,
    }
  }
}

/// A validated partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
  pub name:            Option<String>,
  pub picture:         Option<ImageUpload>,
  pub last_contact_at: Option<DateTime<Utc>>,
  pub archive:         ArchiveChange,
}

impl ContactPatch {
  pub fn archive() -> Self {
    Self { archive: ArchiveChange::Archive, ..Self::default() }
  }

  pub fn unarchive() -> Self {
    Self { archive: ArchiveChange::Unarchive, ..Self::default() }
  }
}

// ─── Storage-level inputs ────────────────────────────────────────────────────

/// The row handed to [`ContactStore::insert`](crate::store::ContactStore::insert)
/// once any picture has been stored.
#[derive(Debug, Clone)]
pub struct ContactRecord {
  pub name:            String,
  pub profile_picture: String,
  pub last_contact_at: DateTime<Utc>,
}

/// Concrete column changes for a single-row update.
///
/// Unlike [`ContactPatch`] every timestamp is already resolved, so the store
/// does not need a clock of its own beyond `updated_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactChanges {
  pub name:            Option<String>,
  pub profile_picture: Option<String>,
  pub last_contact_at: Option<DateTime<Utc>>,
  /// `Some(None)` clears the column.
  pub archived_at:     Option<Option<DateTime<Utc>>>,
  pub deleted_at:      Option<DateTime<Utc>>,
}

impl ContactChanges {
  pub fn is_empty(&self) -> bool { *self == Self::default() }
}
