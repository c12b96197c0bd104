//! Client-side list view state.
//!
//! [`ContactsView`] holds one page of contacts plus the inputs that produced
//! it (tab, committed search, sort, page). Every method is a plain state
//! transition with no I/O, so the [`Synchronizer`](crate::sync::Synchronizer)
//! and the tests drive it directly.
//!
//! Navigation methods return `true` when the caller should fetch.

use chrono::{DateTime, Utc};
use roster_core::{
  contact::Contact,
  pagination::{DEFAULT_LIMIT, PageRequest, Paginated, total_pages},
  query::{ContactFilter, QueryDescriptor, Sort, SortField},
};
use uuid::Uuid;

// ─── Supporting types ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
  #[default]
  Active,
  Archived,
}

impl Tab {
  pub fn is_archived(self) -> bool { self == Tab::Archived }

  pub fn other(self) -> Self {
    match self {
      Tab::Active => Tab::Archived,
      Tab::Archived => Tab::Active,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
  #[default]
  Idle,
  Loading,
  Error,
}

/// What a fetch blocks while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
  /// First load: the whole view waits.
  Initial,
  /// Refresh after navigation or filtering: only the table waits.
  Content,
}

/// Handed out by [`ContactsView::begin_fetch`]; only the most recent ticket
/// may complete a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket {
  generation: u64,
  pub kind:   FetchKind,
}

// ─── View ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ContactsView {
  contacts:       Vec<Contact>,
  page:           u64,
  limit:          u64,
  total:          u64,
  total_pages:    u64,
  total_existing: Option<u64>,

  tab:          Tab,
  search_input: String,
  search:       String,
  sort:         Sort,

  load_state: LoadState,
  fetching:   Option<FetchKind>,
  error:      Option<String>,
  generation: u64,
}

impl Default for ContactsView {
  fn default() -> Self { Self::new(DEFAULT_LIMIT) }
}

impl ContactsView {
  pub fn new(limit: u64) -> Self {
    Self {
      contacts:       Vec::new(),
      page:           1,
      limit:          limit.max(1),
      total:          0,
      total_pages:    0,
      total_existing: None,
      tab:            Tab::Active,
      search_input:   String::new(),
      search:         String::new(),
      sort:           Sort::default(),
      load_state:     LoadState::Idle,
      fetching:       None,
      error:          None,
      generation:     0,
    }
  }

  // ── Accessors ─────────────────────────────────────────────────────────────

  pub fn contacts(&self) -> &[Contact] { &self.contacts }

  pub fn page(&self) -> u64 { self.page }

  pub fn limit(&self) -> u64 { self.limit }

  pub fn total(&self) -> u64 { self.total }

  pub fn total_pages(&self) -> u64 { self.total_pages }

  /// Non-deleted contacts across both tabs, once statistics have been
  /// fetched.
  pub fn total_existing(&self) -> Option<u64> { self.total_existing }

  pub fn has_contacts(&self) -> Option<bool> { self.total_existing.map(|n| n > 0) }

  pub fn tab(&self) -> Tab { self.tab }

  /// What the user has typed so far.
  pub fn search_input(&self) -> &str { &self.search_input }

  /// The search term listings are filtered by.
  pub fn search(&self) -> &str { &self.search }

  pub fn sort(&self) -> Sort { self.sort }

  pub fn load_state(&self) -> LoadState { self.load_state }

  pub fn fetching(&self) -> Option<FetchKind> { self.fetching }

  pub fn is_fetching(&self) -> bool { self.fetching.is_some() }

  pub fn error(&self) -> Option<&str> { self.error.as_deref() }

  pub fn find(&self, id: Uuid) -> Option<&Contact> { self.contacts.iter().find(|c| c.id == id) }

  /// The request matching the current inputs.
  pub fn query(&self) -> QueryDescriptor {
    QueryDescriptor {
      page:     PageRequest::new(Some(self.page as i64), Some(self.limit as i64)),
      archived: self.tab.is_archived(),
      search:   (!self.search.is_empty()).then(|| self.search.clone()),
      sort:     self.sort,
    }
  }

  /// The filter a contact must pass to belong on the current page.
  pub fn filter(&self, now: DateTime<Utc>) -> ContactFilter {
    ContactFilter::for_tab(self.tab.is_archived(), Some(&self.search), now)
  }

  // ── Fetch lifecycle ───────────────────────────────────────────────────────

  /// Mark a fetch as started. Any ticket handed out earlier becomes stale.
  pub fn begin_fetch(&mut self, kind: FetchKind) -> FetchTicket {
    self.generation += 1;
    self.load_state = LoadState::Loading;
    self.fetching = Some(kind);
    self.error = None;
    FetchTicket { generation: self.generation, kind }
  }

  /// Apply a fetch result. Results for stale tickets are dropped and `false`
  /// is returned.
  pub fn finish_fetch(
    &mut self,
    ticket: FetchTicket,
    result: Result<Paginated<Contact>, String>,
  ) -> bool {
    if ticket.generation != self.generation {
      return false;
    }
    self.fetching = None;

    match result {
      Ok(page) => {
        self.contacts = page.data;
        self.page = page.meta.page;
        self.limit = page.meta.limit.max(1);
        self.total = page.meta.total;
        self.total_pages = page.meta.total_pages;
        if let Some(existing) = page.meta.total_existing_contacts {
          self.total_existing = Some(existing);
        }
        self.load_state = LoadState::Idle;
      }
      Err(message) => {
        self.error = Some(message);
        self.load_state = LoadState::Error;
      }
    }
    true
  }

  /// Record a failure from an operation that is not a fetch.
  pub fn record_error(&mut self, message: impl Into<String>) { self.error = Some(message.into()); }

  pub fn clear_error(&mut self) { self.error = None; }

  // ── Navigation ────────────────────────────────────────────────────────────

  pub fn set_tab(&mut self, tab: Tab) -> bool {
    if tab == self.tab {
      return false;
    }
    self.tab = tab;
    self.page = 1;
    true
  }

  /// Sort by `field`. Ignored while a fetch is running.
  pub fn set_sort_field(&mut self, field: SortField) -> bool {
    if self.is_fetching() || field == self.sort.field {
      return false;
    }
    self.sort.field = field;
    self.page = 1;
    true
  }

  /// Flip the sort direction. Ignored while a fetch is running.
  pub fn toggle_sort_direction(&mut self) -> bool {
    if self.is_fetching() {
      return false;
    }
    self.sort.direction = self.sort.direction.toggled();
    self.page = 1;
    true
  }

  pub fn next_page(&mut self) -> bool {
    if self.is_fetching() || self.page >= self.total_pages {
      return false;
    }
    self.page += 1;
    true
  }

  pub fn previous_page(&mut self) -> bool {
    if self.is_fetching() || self.page <= 1 {
      return false;
    }
    self.page -= 1;
    true
  }

  /// Jump to `page`, which must lie in `1..=total_pages`.
  pub fn goto_page(&mut self, page: u64) -> bool {
    if self.is_fetching() || page < 1 || page > self.total_pages {
      return false;
    }
    self.page = page;
    true
  }

  // ── Search ────────────────────────────────────────────────────────────────

  /// Update the displayed search text without touching the listing.
  pub fn set_search_input(&mut self, raw: impl Into<String>) { self.search_input = raw.into(); }

  /// Commit a search term. Returns `false` when the trimmed term equals the
  /// one already committed.
  pub fn commit_search(&mut self, raw: &str) -> bool {
    let term = raw.trim();
    if term == self.search {
      return false;
    }
    self.search = term.to_owned();
    self.page = 1;
    true
  }

  // ── Reconciliation ────────────────────────────────────────────────────────

  /// Fold a newly created contact into the view.
  pub fn apply_created(&mut self, contact: Contact, now: DateTime<Utc>) {
    self.total_existing = self.total_existing.map(|n| n + 1);

    if self.filter(now).matches(&contact) {
      self.total += 1;
      if self.page == 1 {
        self.contacts.insert(0, contact);
        self.contacts.truncate(self.limit as usize);
      }
    }
    self.recompute_pages();
  }

  /// Fold an updated contact into the view. Contacts not on the current page
  /// are ignored.
  pub fn apply_updated(&mut self, contact: Contact, now: DateTime<Utc>) {
    let Some(index) = self.position(contact.id) else {
      return;
    };
    if self.filter(now).matches(&contact) {
      self.contacts[index] = contact;
    } else {
      self.contacts.remove(index);
      self.total = self.total.saturating_sub(1);
    }
    self.recompute_pages();
  }

  /// The contact left the current tab by being archived or restored.
  pub fn apply_moved(&mut self, id: Uuid) { self.remove_local(id); }

  pub fn apply_deleted(&mut self, id: Uuid) {
    self.remove_local(id);
    self.total_existing = self.total_existing.map(|n| n.saturating_sub(1));
  }

  fn remove_local(&mut self, id: Uuid) {
    if let Some(index) = self.position(id) {
      self.contacts.remove(index);
      self.total = self.total.saturating_sub(1);
    }
    self.recompute_pages();
  }

  fn position(&self, id: Uuid) -> Option<usize> { self.contacts.iter().position(|c| c.id == id) }

  fn recompute_pages(&mut self) { self.total_pages = total_pages(self.total, self.limit); }
}

#[cfg(test)]
mod tests;
