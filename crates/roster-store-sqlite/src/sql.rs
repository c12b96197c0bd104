//! Translation of [`ContactFilter`] and [`Sort`] into SQL fragments.

use roster_core::query::{ContactFilter, Sort, SortDirection, SortField, Visibility, name_contains};
use rusqlite::{Connection, functions::FunctionFlags, types::Value};

use crate::encode::encode_dt;

/// A `WHERE` clause with its positional parameters.
#[derive(Debug)]
pub struct WhereClause {
  pub sql:    String,
  pub params: Vec<Value>,
}

pub fn where_clause(filter: &ContactFilter) -> WhereClause {
  let mut conds: Vec<&'static str> = vec!["deleted_at IS NULL"];
  let mut params = Vec::new();

  match filter.visibility {
    Visibility::Active => conds.push("archived_at IS NULL"),
    Visibility::ArchivedSince(cutoff) => {
      conds.push("archived_at IS NOT NULL");
      conds.push("archived_at >= ?");
      params.push(Value::Text(encode_dt(cutoff)));
    }
    Visibility::Existing => {}
  }

  if let Some(term) = &filter.search {
    conds.push("name_contains(name, ?)");
    params.push(Value::Text(term.clone()));
  }

  WhereClause { sql: format!("WHERE {}", conds.join(" AND ")), params }
}

/// `ORDER BY` clause; ties are broken by id so pages never overlap.
pub fn order_by(sort: Sort) -> String {
  let column = match sort.field {
    SortField::Name => "name COLLATE NOCASE",
    SortField::LastContactAt => "last_contact_at",
    SortField::CreatedAt => "created_at",
    SortField::UpdatedAt => "updated_at",
  };
  let dir = match sort.direction {
    SortDirection::Asc => "ASC",
    SortDirection::Desc => "DESC",
  };
  format!("ORDER BY {column} {dir}, id {dir}")
}

/// Register `name_contains(name, term)` on `conn`, the SQL face of
/// [`roster_core::query::name_contains`].
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    "name_contains",
    2,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| {
      let name = ctx.get::<String>(0)?;
      let term = ctx.get::<String>(1)?;
      Ok(name_contains(&name, &term))
    },
  )
}
