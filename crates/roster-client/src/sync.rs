//! [`Synchronizer`]: keeps a [`ContactsView`] in step with the server.
//!
//! Navigation re-fetches the current page. Mutations go to the server and are
//! then folded into the view locally instead of re-fetching. No operation
//! returns an error: failures land in [`ContactsView::error`] and the method
//! returns `false` or `None`.

use chrono::Utc;
use roster_core::{
  contact::Contact,
  query::SortField,
  validate::{CreateContactBody, UpdateContactBody},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
  client::ContactsBackend,
  view::{ContactsView, FetchKind, Tab},
};

pub struct Synchronizer<B> {
  backend: B,
  view:    ContactsView,
}

impl<B: ContactsBackend> Synchronizer<B> {
  pub fn new(backend: B, view: ContactsView) -> Self { Self { backend, view } }

  pub fn view(&self) -> &ContactsView { &self.view }

  pub fn view_mut(&mut self) -> &mut ContactsView { &mut self.view }

  pub fn backend(&self) -> &B { &self.backend }

  // ── Fetching ──────────────────────────────────────────────────────────────

  /// First load of the view, statistics included.
  pub async fn initialize(&mut self) -> bool { self.load(FetchKind::Initial).await }

  /// Re-fetch the current page.
  pub async fn refresh(&mut self) -> bool { self.load(FetchKind::Content).await }

  async fn load(&mut self, kind: FetchKind) -> bool {
    let ticket = self.view.begin_fetch(kind);
    let query = self.view.query();
    debug!(?query, ?kind, "fetching contacts");

    let result = self
      .backend
      .list(&query, kind == FetchKind::Initial)
      .await
      .map_err(|e| {
        warn!(error = %e, "failed to fetch contacts");
        format!("{e:#}")
      });
    let ok = result.is_ok();
    self.view.finish_fetch(ticket, result) && ok
  }

  // ── Navigation ────────────────────────────────────────────────────────────

  pub async fn set_tab(&mut self, tab: Tab) -> bool {
    self.view.set_tab(tab) && self.refresh().await
  }

  pub async fn set_sort_field(&mut self, field: SortField) -> bool {
    self.view.set_sort_field(field) && self.refresh().await
  }

  pub async fn toggle_sort_direction(&mut self) -> bool {
    self.view.toggle_sort_direction() && self.refresh().await
  }

  pub async fn next_page(&mut self) -> bool { self.view.next_page() && self.refresh().await }

  pub async fn previous_page(&mut self) -> bool {
    self.view.previous_page() && self.refresh().await
  }

  pub async fn goto_page(&mut self, page: u64) -> bool {
    self.view.goto_page(page) && self.refresh().await
  }

  /// Commit a debounced search term and refresh if it changed.
  pub async fn commit_search(&mut self, raw: &str) -> bool {
    self.view.commit_search(raw) && self.refresh().await
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// A single contact, from the current page when possible.
  pub async fn get(&mut self, id: Uuid) -> Option<Contact> {
    if let Some(contact) = self.view.find(id) {
      return Some(contact.clone());
    }
    match self.backend.get(id).await {
      Ok(contact) => Some(contact),
      Err(e) => {
        self.record_failure("failed to fetch contact", e);
        None
      }
    }
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  pub async fn create(&mut self, body: &CreateContactBody) -> Option<Contact> {
    match self.backend.create(body).await {
      Ok(contact) => {
        self.view.apply_created(contact.clone(), Utc::now());
        Some(contact)
      }
      Err(e) => {
        self.record_failure("failed to create contact", e);
        None
      }
    }
  }

  pub async fn update(&mut self, id: Uuid, body: &UpdateContactBody) -> Option<Contact> {
    match self.backend.update(id, body).await {
      Ok(contact) => {
        self.view.apply_updated(contact.clone(), Utc::now());
        Some(contact)
      }
      Err(e) => {
        self.record_failure("failed to update contact", e);
        None
      }
    }
  }

  pub async fn archive(&mut self, id: Uuid) -> bool {
    match self.backend.archive(id).await {
      Ok(_) => {
        self.view.apply_moved(id);
        true
      }
      Err(e) => {
        self.record_failure("failed to archive contact", e);
        false
      }
    }
  }

  pub async fn restore(&mut self, id: Uuid) -> bool {
    match self.backend.restore(id).await {
      Ok(_) => {
        self.view.apply_moved(id);
        true
      }
      Err(e) => {
        self.record_failure("failed to restore contact", e);
        false
      }
    }
  }

  pub async fn delete(&mut self, id: Uuid) -> bool {
    match self.backend.delete(id).await {
      Ok(_) => {
        self.view.apply_deleted(id);
        true
      }
      Err(e) => {
        self.record_failure("failed to delete contact", e);
        false
      }
    }
  }

  fn record_failure(&mut self, what: &str, e: anyhow::Error) {
    warn!(error = %e, "{what}");
    self.view.record_error(format!("{what}: {e:#}"));
  }
}
