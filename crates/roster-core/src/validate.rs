//! Validation of raw create/update payloads.
//!
//! The wire bodies carry the profile picture as a base64 `data:` URI. A
//! successful validation decodes it into an [`ImageUpload`] ready for the
//! object store. All problems are collected before failing so a client can
//! highlight every bad field at once.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  contact::{ArchiveChange, ContactPatch, ImageUpload, NewContact},
  error::ValidationIssue,
};

/// Largest accepted decoded picture.
pub const MAX_PICTURE_BYTES: usize = 200 * 1024;

const ACCEPTED_IMAGE_TYPES: &[&str] = &["png", "jpeg", "jpg"];

const NAME_REQUIRED: &str = "Name is required";
const IMAGE_INVALID: &str = "Image is required and must be a valid base64 string";
const IMAGE_TOO_LARGE: &str = "Image must be <= 200KB";
const DATE_INVALID: &str = "Invalid date format";

// ─── Wire bodies ─────────────────────────────────────────────────────────────

/// `POST /contacts` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactBody {
  pub name:            Option<String>,
  /// `data:image/<png|jpeg|jpg>;base64,<payload>`
  pub profile_picture: Option<String>,
  /// RFC 3339 timestamp.
  pub last_contact_at: Option<String>,
}

/// `PUT /contacts/{id}` body. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactBody {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:            Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub profile_picture: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_contact_at: Option<String>,
  /// `true` archives, `false` restores.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub archived:        Option<bool>,
}

// ─── Entry points ────────────────────────────────────────────────────────────

pub fn validate_create(body: CreateContactBody) -> Result<NewContact> {
  let mut issues = Vec::new();

  let name = body.name.as_deref().and_then(|n| check_name(n, &mut issues));
  if body.name.is_none() {
    issues.push(ValidationIssue::new("name", NAME_REQUIRED));
  }

  let picture = match body.profile_picture.as_deref() {
    Some(uri) => check_picture(uri, &mut issues),
    None => {
      issues.push(ValidationIssue::new("profilePicture", IMAGE_INVALID));
      None
    }
  };

  let last_contact_at = match body.last_contact_at.as_deref() {
    Some(s) => check_datetime(s, &mut issues),
    None => {
      issues.push(ValidationIssue::new("lastContactAt", DATE_INVALID));
      None
    }
  };

  match (name, picture, last_contact_at) {
    (Some(name), Some(picture), Some(last_contact_at)) if issues.is_empty() => {
      Ok(NewContact { name, picture: Some(picture), last_contact_at })
    }
    _ => Err(Error::Validation(issues)),
  }
}

pub fn validate_update(body: UpdateContactBody) -> Result<ContactPatch> {
  let mut issues = Vec::new();

  let name = body.name.as_deref().and_then(|n| check_name(n, &mut issues));
  let picture = body
    .profile_picture
    .as_deref()
    .and_then(|uri| check_picture(uri, &mut issues));
  let last_contact_at = body
    .last_contact_at
    .as_deref()
    .and_then(|s| check_datetime(s, &mut issues));

  if !issues.is_empty() {
    return Err(Error::Validation(issues));
  }

  Ok(ContactPatch {
    name,
    picture,
    last_contact_at,
    archive: ArchiveChange::from(body.archived),
  })
}

// ─── Field checks ────────────────────────────────────────────────────────────

fn check_name(name: &str, issues: &mut Vec<ValidationIssue>) -> Option<String> {
  let trimmed = name.trim();
  if trimmed.is_empty() {
    issues.push(ValidationIssue::new("name", NAME_REQUIRED));
    return None;
  }
  Some(trimmed.to_owned())
}

fn check_datetime(s: &str, issues: &mut Vec<ValidationIssue>) -> Option<DateTime<Utc>> {
  match DateTime::parse_from_rfc3339(s) {
    Ok(dt) => Some(dt.with_timezone(&Utc)),
    Err(_) => {
      issues.push(ValidationIssue::new("lastContactAt", DATE_INVALID));
      None
    }
  }
}

fn check_picture(uri: &str, issues: &mut Vec<ValidationIssue>) -> Option<ImageUpload> {
  match parse_data_uri(uri) {
    Some(image) if image.bytes.len() > MAX_PICTURE_BYTES => {
      issues.push(ValidationIssue::new("profilePicture", IMAGE_TOO_LARGE));
      None
    }
    Some(image) => Some(image),
    None => {
      issues.push(ValidationIssue::new("profilePicture", IMAGE_INVALID));
      None
    }
  }
}

/// Decode `data:image/<kind>;base64,<payload>`. Returns `None` for any other
/// shape, unsupported image kinds, or invalid base64.
pub fn parse_data_uri(uri: &str) -> Option<ImageUpload> {
  let rest = uri.strip_prefix("data:image/")?;
  let (kind, payload) = rest.split_once(";base64,")?;
  if !ACCEPTED_IMAGE_TYPES.contains(&kind) {
    return None;
  }
  let bytes = B64.decode(payload).ok()?;
  Some(ImageUpload {
    bytes:        Bytes::from(bytes),
    content_type: format!("image/{kind}"),
  })
}

/// Inverse of [`parse_data_uri`].
pub fn encode_data_uri(image: &ImageUpload) -> String {
  format!("data:{};base64,{}", image.content_type, B64.encode(&image.bytes))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn png(len: usize) -> String {
    encode_data_uri(&ImageUpload {
      bytes:        Bytes::from(vec![7u8; len]),
      content_type: "image/png".into(),
    })
  }

  fn valid_create() -> CreateContactBody {
    CreateContactBody {
      name:            Some("Ada Lovelace".into()),
      profile_picture: Some(png(16)),
      last_contact_at: Some("2024-05-01T10:00:00Z".into()),
    }
  }

  fn issue_paths(err: Error) -> Vec<String> {
    match err {
      Error::Validation(issues) => issues.into_iter().map(|i| i.path).collect(),
      other => panic!("expected validation error, got {other:?}"),
    }
  }

  #[test]
  fn create_accepts_valid_payload() {
    let new = validate_create(valid_create()).unwrap();
    assert_eq!(new.name, "Ada Lovelace");
    let picture = new.picture.unwrap();
    assert_eq!(picture.content_type, "image/png");
    assert_eq!(picture.bytes.len(), 16);
  }

  #[test]
  fn create_collects_every_issue() {
    let paths = issue_paths(validate_create(CreateContactBody::default()).unwrap_err());
    assert_eq!(paths, ["name", "profilePicture", "lastContactAt"]);
  }

  #[test]
  fn create_rejects_blank_name() {
    let body = CreateContactBody { name: Some("   ".into()), ..valid_create() };
    assert_eq!(issue_paths(validate_create(body).unwrap_err()), ["name"]);
  }

  #[test]
  fn picture_must_be_supported_data_uri() {
    for bad in [
      "https://example.com/a.png",
      "data:image/gif;base64,R0lGOD",
      "data:image/png;base64,***",
    ] {
      let body = CreateContactBody { profile_picture: Some(bad.into()), ..valid_create() };
      assert_eq!(issue_paths(validate_create(body).unwrap_err()), ["profilePicture"], "{bad}");
    }
  }

  #[test]
  fn picture_size_limit() {
    let body = CreateContactBody {
      profile_picture: Some(png(MAX_PICTURE_BYTES)),
      ..valid_create()
    };
    assert!(validate_create(body).is_ok());

    let body = CreateContactBody {
      profile_picture: Some(png(MAX_PICTURE_BYTES + 1)),
      ..valid_create()
    };
    assert_eq!(issue_paths(validate_create(body).unwrap_err()), ["profilePicture"]);
  }

  #[test]
  fn update_is_partial() {
    let patch = validate_update(UpdateContactBody::default()).unwrap();
    assert!(patch.name.is_none() && patch.picture.is_none());
    assert_eq!(patch.archive, ArchiveChange::NoChange);

    let patch = validate_update(UpdateContactBody {
      archived: Some(false),
      ..Default::default()
    })
    .unwrap();
    assert_eq!(patch.archive, ArchiveChange::Unarchive);
  }

  #[test]
  fn update_rejects_bad_date() {
    let body = UpdateContactBody {
      last_contact_at: Some("yesterday".into()),
      ..Default::default()
    };
    assert_eq!(issue_paths(validate_update(body).unwrap_err()), ["lastContactAt"]);
  }
}
