//! [`SqliteStore`] — the SQLite implementation of [`ContactStore`].

use std::path::Path;

use chrono::Utc;
use roster_core::{
  contact::{Contact, ContactChanges, ContactRecord},
  query::{ContactFilter, Sort},
  store::ContactStore,
};
use rusqlite::{OptionalExtension as _, params_from_iter, types::Value};
use tracing::debug;
use uuid::Uuid;

use crate::{
  Result,
  encode::{CONTACT_COLUMNS, RawContact, encode_dt, encode_uuid, truncate_dt},
  schema::SCHEMA,
  sql::{order_by, register_functions, where_clause},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A contact store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn select_by_id(&self, id: Uuid) -> Result<Option<Contact>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
              rusqlite::params![id_str],
              RawContact::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }
}

/// Build the `SET` list and parameters for an update.
fn set_clause(changes: ContactChanges) -> (Vec<&'static str>, Vec<Value>) {
  let mut sets = Vec::new();
  let mut params = Vec::new();

  if let Some(name) = changes.name {
    sets.push("name = ?");
    params.push(Value::Text(name));
  }
  if let Some(picture) = changes.profile_picture {
    sets.push("profile_picture = ?");
    params.push(Value::Text(picture));
  }
  if let Some(at) = changes.last_contact_at {
    sets.push("last_contact_at = ?");
    params.push(Value::Text(encode_dt(at)));
  }
  if let Some(archived_at) = changes.archived_at {
    sets.push("archived_at = ?");
    params.push(archived_at.map_or(Value::Null, |at| Value::Text(encode_dt(at))));
  }
  if let Some(at) = changes.deleted_at {
    sets.push("deleted_at = ?");
    params.push(Value::Text(encode_dt(at)));
  }

  sets.push("updated_at = ?");
  params.push(Value::Text(encode_dt(Utc::now())));

  (sets, params)
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  type Error = crate::Error;

  async fn find_page(
    &self,
    filter: &ContactFilter,
    skip: u64,
    take: u64,
    sort: Sort,
  ) -> Result<Vec<Contact>> {
    let clause = where_clause(filter);
    let sql = format!(
      "SELECT {CONTACT_COLUMNS} FROM contacts {} {} LIMIT ? OFFSET ?",
      clause.sql,
      order_by(sort),
    );
    let mut params = clause.params;
    params.push(Value::Integer(i64::try_from(take).unwrap_or(i64::MAX)));
    params.push(Value::Integer(i64::try_from(skip).unwrap_or(i64::MAX)));

    debug!(%sql, "find_page");

    let raws: Vec<RawContact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(params), RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn count(&self, filter: &ContactFilter) -> Result<u64> {
    let clause = where_clause(filter);
    let sql = format!("SELECT COUNT(*) FROM contacts {}", clause.sql);
    let params = clause.params;

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, params_from_iter(params), |row| row.get(0))?)
      })
      .await?;

    Ok(count.max(0) as u64)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Contact>> {
    self.select_by_id(id).await
  }

  async fn insert(&self, record: ContactRecord) -> Result<Contact> {
    let now = truncate_dt(Utc::now());
    let contact = Contact {
      id:              Uuid::new_v4(),
      name:            record.name,
      profile_picture: record.profile_picture,
      last_contact_at: truncate_dt(record.last_contact_at),
      archived_at:     None,
      deleted_at:      None,
      created_at:      now,
      updated_at:      now,
    };

    let id_str       = encode_uuid(contact.id);
    let name         = contact.name.clone();
    let picture      = contact.profile_picture.clone();
    let last_contact = encode_dt(contact.last_contact_at);
    let now_str      = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contacts (
             id, name, profile_picture, last_contact_at, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![id_str, name, picture, last_contact, now_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(contact)
  }

  async fn update_by_id(&self, id: Uuid, changes: ContactChanges) -> Result<Option<Contact>> {
    let (sets, mut params) = set_clause(changes);
    let sql = format!("UPDATE contacts SET {} WHERE id = ?", sets.join(", "));
    params.push(Value::Text(encode_uuid(id)));

    let affected = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, params_from_iter(params))?))
      .await?;

    if affected == 0 {
      return Ok(None);
    }
    self.select_by_id(id).await
  }
}
