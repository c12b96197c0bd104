//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that string comparison in SQL agrees with
//! chronological order. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use roster_core::contact::Contact;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Drop sub-microsecond precision so a value survives a round trip through
/// [`encode_dt`] unchanged.
pub fn truncate_dt(dt: DateTime<Utc>) -> DateTime<Utc> {
  decode_dt(&encode_dt(dt)).unwrap_or(dt)
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Column list matching [`RawContact::from_row`].
pub const CONTACT_COLUMNS: &str = "id, name, profile_picture, last_contact_at, \
                                   archived_at, deleted_at, created_at, updated_at";

/// Raw strings read directly from a `contacts` row.
pub struct RawContact {
  pub id:              String,
  pub name:            String,
  pub profile_picture: String,
  pub last_contact_at: String,
  pub archived_at:     Option<String>,
  pub deleted_at:      Option<String>,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawContact {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      name:            row.get(1)?,
      profile_picture: row.get(2)?,
      last_contact_at: row.get(3)?,
      archived_at:     row.get(4)?,
      deleted_at:      row.get(5)?,
      created_at:      row.get(6)?,
      updated_at:      row.get(7)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      id:              decode_uuid(&self.id)?,
      name:            self.name,
      profile_picture: self.profile_picture,
      last_contact_at: decode_dt(&self.last_contact_at)?,
      archived_at:     self.archived_at.as_deref().map(decode_dt).transpose()?,
      deleted_at:      self.deleted_at.as_deref().map(decode_dt).transpose()?,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}
