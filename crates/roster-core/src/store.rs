//! The storage traits the service layer is written against.
//!
//! [`ContactStore`] is implemented by database backends (e.g.
//! `roster-store-sqlite`); [`ObjectStore`] by whatever holds profile
//! pictures. Neither knows about archival windows or soft-delete rules;
//! those live in [`ContactFilter`] and the service.

use std::future::Future;

use bytes::Bytes;
use uuid::Uuid;

use crate::{
  contact::{Contact, ContactChanges, ContactRecord},
  query::{ContactFilter, Sort},
};

/// Row-level access to persisted contacts.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded runtimes (e.g. tokio with `axum`).
pub trait ContactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return at most `take` rows matching `filter`, ordered by `sort`, after
  /// skipping `skip` rows.
  fn find_page<'a>(
    &'a self,
    filter: &'a ContactFilter,
    skip: u64,
    take: u64,
    sort: Sort,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + 'a;

  /// Count the rows matching `filter`.
  fn count<'a>(
    &'a self,
    filter: &'a ContactFilter,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Fetch a row by id regardless of its lifecycle state.
  fn find_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Persist a new contact. The store assigns `id`, `created_at` and
  /// `updated_at`.
  fn insert(
    &self,
    record: ContactRecord,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Apply `changes` to a single row and bump `updated_at`. Returns `None`
  /// when no row has that id.
  fn update_by_id(
    &self,
    id: Uuid,
    changes: ContactChanges,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;
}

/// Binary storage for profile pictures.
pub trait ObjectStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Durably store `bytes` and return a URI that can be persisted on the
  /// contact.
  fn put<'a>(
    &'a self,
    bytes: Bytes,
    content_type: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Remove a previously stored object.
  fn delete<'a>(
    &'a self,
    uri: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
