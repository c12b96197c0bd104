//! Query filter builder.
//!
//! Turns the user-facing listing inputs (archived tab, search term, sort) into
//! a storage-agnostic [`ContactFilter`] plus [`Sort`]. Storage backends
//! translate the filter into their own query language; the client evaluates
//! the same filter in memory with [`ContactFilter::matches`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  contact::{Contact, archive_cutoff},
  pagination::PageRequest,
};

// ─── Sorting ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
  Name,
  LastContactAt,
  #[default]
  CreatedAt,
  UpdatedAt,
}

impl SortField {
  /// Parse a wire value; anything unrecognised falls back to `createdAt`.
  pub fn parse_lossy(s: &str) -> Self {
    match s {
      "name" => Self::Name,
      "lastContactAt" => Self::LastContactAt,
      "updatedAt" => Self::UpdatedAt,
      _ => Self::CreatedAt,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Name => "name",
      Self::LastContactAt => "lastContactAt",
      Self::CreatedAt => "createdAt",
      Self::UpdatedAt => "updatedAt",
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
  Asc,
  #[default]
  Desc,
}

impl SortDirection {
  pub fn parse_lossy(s: &str) -> Self {
    if s.eq_ignore_ascii_case("asc") { Self::Asc } else { Self::Desc }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Asc => "asc",
      Self::Desc => "desc",
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      Self::Asc => Self::Desc,
      Self::Desc => Self::Asc,
    }
  }
}

/// Ordering for a listing. Defaults to `createdAt desc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sort {
  pub field:     SortField,
  pub direction: SortDirection,
}

impl Sort {
  pub fn new(field: SortField, direction: SortDirection) -> Self {
    Self { field, direction }
  }
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Which lifecycle states a filter admits. Deleted contacts are never
/// admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
  /// `archived_at IS NULL AND deleted_at IS NULL`
  Active,
  /// `archived_at IS NOT NULL AND archived_at >= cutoff AND deleted_at IS NULL`
  ArchivedSince(DateTime<Utc>),
  /// `deleted_at IS NULL`, i.e. active and archived of any age.
  Existing,
}

/// A normalised, storage-agnostic predicate over contacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFilter {
  pub visibility: Visibility,
  /// Case-insensitive substring of `name`; already trimmed and non-empty.
  pub search:     Option<String>,
}

impl ContactFilter {
  /// Build the filter for one of the two listing tabs as of `now`.
  pub fn for_tab(archived: bool, search: Option<&str>, now: DateTime<Utc>) -> Self {
    let visibility = if archived {
      Visibility::ArchivedSince(archive_cutoff(now))
    } else {
      Visibility::Active
    };
    Self { visibility, search: normalize_search(search) }
  }

  /// Every contact that has not been deleted. Ignores tab and search.
  pub fn existing() -> Self {
    Self { visibility: Visibility::Existing, search: None }
  }

  /// Evaluate the filter against a single contact.
  pub fn matches(&self, contact: &Contact) -> bool {
    if contact.deleted_at.is_some() {
      return false;
    }
    let visible = match self.visibility {
      Visibility::Active => contact.archived_at.is_none(),
      Visibility::ArchivedSince(cutoff) => {
        contact.archived_at.is_some_and(|at| at >= cutoff)
      }
      Visibility::Existing => true,
    };
    visible && self.search.as_deref().is_none_or(|term| name_contains(&contact.name, term))
  }
}

/// Trim a search term; blank terms mean "no search".
pub fn normalize_search(search: Option<&str>) -> Option<String> {
  search
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

/// Case-insensitive substring match.
pub fn name_contains(name: &str, term: &str) -> bool {
  name.to_lowercase().contains(&term.to_lowercase())
}

// ─── Descriptor ──────────────────────────────────────────────────────────────

/// Everything needed to request one page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryDescriptor {
  pub page:     PageRequest,
  pub archived: bool,
  pub search:   Option<String>,
  pub sort:     Sort,
}

impl QueryDescriptor {
  /// The filter for this descriptor as of `now`.
  pub fn filter(&self, now: DateTime<Utc>) -> ContactFilter {
    ContactFilter::for_tab(self.archived, self.search.as_deref(), now)
  }
}
