//! Contact listing service and mutation coordinator.
//!
//! [`ContactService`] is the only place that knows the listing rules
//! (archival window, soft delete, statistics) and the ordering constraints
//! around profile-picture replacement. It is generic over the row store and
//! the object store so the HTTP layer and the tests can plug in whatever
//! backends they like.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  contact::{ArchiveChange, Contact, ContactChanges, ContactPatch, ContactRecord, NewContact},
  pagination::{PageMeta, Paginated},
  query::{ContactFilter, QueryDescriptor},
  store::{ContactStore, ObjectStore},
};

pub struct ContactService<S, O> {
  store:   S,
  objects: O,
}

impl<S, O> ContactService<S, O>
where
  S: ContactStore,
  O: ObjectStore,
{
  pub fn new(store: S, objects: O) -> Self { Self { store, objects } }

  pub fn store(&self) -> &S { &self.store }

  pub fn objects(&self) -> &O { &self.objects }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// List one page of contacts for `query`.
  ///
  /// With `include_stats`, the metadata also carries the number of
  /// non-deleted contacts regardless of tab or search.
  pub async fn list(
    &self,
    query: &QueryDescriptor,
    include_stats: bool,
  ) -> Result<Paginated<Contact>> {
    self.list_at(query, include_stats, Utc::now()).await
  }

  /// [`list`](Self::list) with the archival cutoff computed from `now`.
  pub async fn list_at(
    &self,
    query: &QueryDescriptor,
    include_stats: bool,
    now: DateTime<Utc>,
  ) -> Result<Paginated<Contact>> {
    let filter = query.filter(now);
    let page = query.page;

    debug!(?filter, page = page.page(), limit = page.limit(), "listing contacts");

    let (data, total) = tokio::join!(
      self.store.find_page(&filter, page.skip(), page.limit(), query.sort),
      self.store.count(&filter),
    );
    let data = data.map_err(Error::store)?;
    let total = total.map_err(Error::store)?;

    let mut meta = PageMeta::new(page, total);

    if include_stats {
      match self.store.count(&ContactFilter::existing()).await {
        Ok(existing) => meta = meta.with_existing(existing),
        Err(e) => warn!(error = %e, "failed to count existing contacts"),
      }
    }

    Ok(Paginated { data, meta })
  }

  /// Fetch a single contact. Deleted contacts are reported as not found.
  pub async fn get_by_id(&self, id: Uuid) -> Result<Contact> {
    self
      .store
      .find_by_id(id)
      .await
      .map_err(Error::store)?
      .filter(|c| !c.is_deleted())
      .ok_or(Error::ContactNotFound(id))
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Create a contact, storing its picture first.
  pub async fn create(&self, new: NewContact) -> Result<Contact> {
    let profile_picture = match new.picture {
      Some(image) => self
        .objects
        .put(image.bytes, &image.content_type)
        .await
        .map_err(Error::object_store)?,
      None => String::new(),
    };

    let record = ContactRecord {
      name: new.name,
      profile_picture: profile_picture.clone(),
      last_contact_at: new.last_contact_at,
    };

    match self.store.insert(record).await {
      Ok(contact) => {
        info!(id = %contact.id, "contact created");
        Ok(contact)
      }
      Err(e) => {
        if !profile_picture.is_empty() {
          self.discard_object(&profile_picture).await;
        }
        Err(Error::store(e))
      }
    }
  }

  /// Apply a partial update.
  ///
  /// A replacement picture is stored before the row changes; the previous
  /// picture is removed only after the new reference has been persisted, and
  /// failing to remove it does not fail the update.
  pub async fn update(&self, id: Uuid, patch: ContactPatch) -> Result<Contact> {
    let existing = self.get_by_id(id).await?;

    let archived_at = match patch.archive {
      ArchiveChange::NoChange => None,
      ArchiveChange::Archive => Some(Some(Utc::now())),
      ArchiveChange::Unarchive => Some(None),
    };

    let uploaded = match patch.picture {
      Some(image) => Some(
        self
          .objects
          .put(image.bytes, &image.content_type)
          .await
          .map_err(Error::object_store)?,
      ),
      None => None,
    };

    let changes = ContactChanges {
      name: patch.name,
      profile_picture: uploaded.clone(),
      last_contact_at: patch.last_contact_at,
      archived_at,
      deleted_at: None,
    };

    let updated = match self.store.update_by_id(id, changes).await {
      Ok(Some(contact)) => contact,
      Ok(None) => {
        if let Some(uri) = &uploaded {
          self.discard_object(uri).await;
        }
        return Err(Error::ContactNotFound(id));
      }
      Err(e) => {
        if let Some(uri) = &uploaded {
          self.discard_object(uri).await;
        }
        return Err(Error::store(e));
      }
    };

    if uploaded.is_some()
      && !existing.profile_picture.is_empty()
      && existing.profile_picture != updated.profile_picture
    {
      self.discard_object(&existing.profile_picture).await;
    }

    info!(id = %id, archive = ?patch.archive, "contact updated");
    Ok(updated)
  }

  pub async fn archive(&self, id: Uuid) -> Result<Contact> {
    self.update(id, ContactPatch::archive()).await
  }

  pub async fn restore(&self, id: Uuid) -> Result<Contact> {
    self.update(id, ContactPatch::unarchive()).await
  }

  /// Soft delete. Deleting an already-deleted contact just moves
  /// `deleted_at` forward.
  pub async fn delete(&self, id: Uuid) -> Result<Contact> {
    let changes = ContactChanges { deleted_at: Some(Utc::now()), ..Default::default() };
    let contact = self
      .store
      .update_by_id(id, changes)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ContactNotFound(id))?;
    info!(id = %id, "contact deleted");
    Ok(contact)
  }

  async fn discard_object(&self, uri: &str) {
    if let Err(e) = self.objects.delete(uri).await {
      warn!(uri, error = %e, "failed to delete stored picture");
    }
  }
}
