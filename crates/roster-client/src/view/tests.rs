use chrono::Duration;
use roster_core::{
  pagination::{PageMeta, PageRequest},
  query::SortDirection,
};

use super::*;

fn contact(name: &str) -> Contact {
  let now = Utc::now();
  Contact {
    id:              Uuid::new_v4(),
    name:            name.into(),
    profile_picture: String::new(),
    last_contact_at: now,
    archived_at:     None,
    deleted_at:      None,
    created_at:      now,
    updated_at:      now,
  }
}

fn archived(name: &str) -> Contact {
  Contact { archived_at: Some(Utc::now() - Duration::days(1)), ..contact(name) }
}

/// A view showing `names` as page `page` of a listing with `total` rows.
fn loaded(names: &[&str], page: u64, limit: u64, total: u64) -> ContactsView {
  let mut view = ContactsView::new(limit);
  let ticket = view.begin_fetch(FetchKind::Initial);
  let request = PageRequest::new(Some(page as i64), Some(limit as i64));
  let result = Paginated {
    data: names.iter().map(|n| contact(n)).collect(),
    meta: PageMeta::new(request, total).with_existing(total),
  };
  assert!(view.finish_fetch(ticket, Ok(result)));
  view
}

fn names(view: &ContactsView) -> Vec<&str> {
  view.contacts().iter().map(|c| c.name.as_str()).collect()
}

// ─── Fetch lifecycle ────────────────────────────────────────────────────────

#[test]
fn fetch_moves_through_loading_to_idle() {
  let mut view = ContactsView::default();
  let ticket = view.begin_fetch(FetchKind::Content);
  assert_eq!(view.load_state(), LoadState::Loading);
  assert_eq!(view.fetching(), Some(FetchKind::Content));

  let page = Paginated { data: vec![contact("Ada")], meta: PageMeta::new(PageRequest::default(), 1) };
  assert!(view.finish_fetch(ticket, Ok(page)));
  assert_eq!(view.load_state(), LoadState::Idle);
  assert!(!view.is_fetching());
  assert_eq!(view.total_pages(), 1);
  assert_eq!(view.total_existing(), None);
}

#[test]
fn failed_fetch_records_error() {
  let mut view = loaded(&["Ada"], 1, 10, 1);
  let ticket = view.begin_fetch(FetchKind::Content);
  assert!(view.finish_fetch(ticket, Err("boom".into())));
  assert_eq!(view.load_state(), LoadState::Error);
  assert_eq!(view.error(), Some("boom"));
  assert_eq!(names(&view), ["Ada"]);

  let _ = view.begin_fetch(FetchKind::Content);
  assert_eq!(view.error(), None);
}

#[test]
fn stale_response_is_dropped() {
  let mut view = ContactsView::default();
  let first = view.begin_fetch(FetchKind::Content);
  let second = view.begin_fetch(FetchKind::Content);

  let newer = Paginated { data: vec![contact("New")], meta: PageMeta::new(PageRequest::default(), 1) };
  assert!(view.finish_fetch(second, Ok(newer)));

  let older = Paginated { data: vec![contact("Old")], meta: PageMeta::new(PageRequest::default(), 1) };
  assert!(!view.finish_fetch(first, Ok(older)));
  assert_eq!(names(&view), ["New"]);
}

#[test]
fn stats_survive_fetches_without_stats() {
  let mut view = loaded(&["Ada"], 1, 10, 4);
  assert_eq!(view.total_existing(), Some(4));
  assert_eq!(view.has_contacts(), Some(true));

  let ticket = view.begin_fetch(FetchKind::Content);
  let page = Paginated { data: vec![], meta: PageMeta::new(PageRequest::default(), 0) };
  view.finish_fetch(ticket, Ok(page));
  assert_eq!(view.total_existing(), Some(4));
}

// ─── Navigation ─────────────────────────────────────────────────────────────

#[test]
fn paging_respects_bounds() {
  let mut view = loaded(&["a", "b"], 1, 2, 5);
  assert_eq!(view.total_pages(), 3);

  assert!(!view.previous_page());
  assert!(view.next_page());
  assert!(view.next_page());
  assert_eq!(view.page(), 3);
  assert!(!view.next_page());

  assert!(!view.goto_page(0));
  assert!(!view.goto_page(4));
  assert!(view.goto_page(1));
  assert_eq!(view.page(), 1);
}

#[test]
fn navigation_is_ignored_while_fetching() {
  let mut view = loaded(&["a", "b"], 2, 2, 6);
  let _ticket = view.begin_fetch(FetchKind::Content);

  assert!(!view.next_page());
  assert!(!view.previous_page());
  assert!(!view.goto_page(3));
  assert!(!view.toggle_sort_direction());
  assert!(!view.set_sort_field(SortField::Name));
  assert_eq!(view.page(), 2);
  assert_eq!(view.sort(), Sort::default());
}

#[test]
fn tab_and_sort_changes_reset_page() {
  let mut view = loaded(&["a"], 3, 1, 5);

  assert!(view.set_tab(Tab::Archived));
  assert_eq!(view.page(), 1);
  assert!(view.query().archived);
  assert!(!view.set_tab(Tab::Archived));

  view.goto_page(2);
  assert!(view.toggle_sort_direction());
  assert_eq!(view.page(), 1);
  assert_eq!(view.sort().direction, SortDirection::Asc);

  view.goto_page(2);
  assert!(view.set_sort_field(SortField::Name));
  assert_eq!(view.page(), 1);
  assert!(!view.set_sort_field(SortField::Name));
}

#[test]
fn committing_search_trims_and_resets_page() {
  let mut view = loaded(&["a"], 2, 1, 5);
  view.set_search_input("  ada ");
  assert_eq!(view.search_input(), "  ada ");
  assert_eq!(view.search(), "");

  assert!(view.commit_search("  ada "));
  assert_eq!(view.search(), "ada");
  assert_eq!(view.page(), 1);
  assert_eq!(view.query().search.as_deref(), Some("ada"));

  view.goto_page(2);
  assert!(!view.commit_search("ada  "));
  assert_eq!(view.page(), 2);

  assert!(view.commit_search("   "));
  assert_eq!(view.query().search, None);
}

// ─── Reconciliation ─────────────────────────────────────────────────────────

#[test]
fn create_on_first_page_prepends_and_counts() {
  let mut view = loaded(&["b", "c", "d"], 1, 3, 3);
  view.apply_created(contact("a"), Utc::now());

  assert_eq!(names(&view), ["a", "b", "c"]);
  assert_eq!(view.total(), 4);
  assert_eq!(view.total_pages(), 2);
  assert_eq!(view.total_existing(), Some(4));
}

#[test]
fn create_on_later_page_keeps_visible_rows() {
  let mut view = loaded(&["d", "e"], 2, 3, 5);
  view.apply_created(contact("a"), Utc::now());

  assert_eq!(names(&view), ["d", "e"]);
  assert_eq!(view.page(), 2);
  assert_eq!(view.total(), 6);
}

#[test]
fn create_outside_filter_only_counts_as_existing() {
  let mut view = loaded(&["Zed"], 1, 10, 1);
  view.commit_search("zed");
  view.apply_created(contact("Ada"), Utc::now());
  assert_eq!(names(&view), ["Zed"]);
  assert_eq!(view.total(), 1);
  assert_eq!(view.total_existing(), Some(2));

  let mut view = loaded(&["Zed"], 1, 10, 1);
  view.set_tab(Tab::Archived);
  view.apply_created(contact("Ada"), Utc::now());
  assert_eq!(view.total(), 1);
}

#[test]
fn update_replaces_or_drops() {
  let mut view = loaded(&["Ada", "Bob"], 1, 10, 2);
  let mut ada = view.contacts()[0].clone();

  ada.name = "Ada King".into();
  view.apply_updated(ada.clone(), Utc::now());
  assert_eq!(names(&view), ["Ada King", "Bob"]);
  assert_eq!(view.total(), 2);

  view.commit_search("bob");
  ada.name = "Ada Lovelace".into();
  view.apply_updated(ada, Utc::now());
  assert_eq!(names(&view), ["Bob"]);
  assert_eq!(view.total(), 1);

  view.apply_updated(contact("Stranger"), Utc::now());
  assert_eq!(names(&view), ["Bob"]);
  assert_eq!(view.total(), 1);
}

#[test]
fn archived_update_leaves_active_tab() {
  let mut view = loaded(&["Ada"], 1, 10, 1);
  let ada = view.contacts()[0].clone();
  view.apply_updated(Contact { archived_at: Some(Utc::now()), ..ada }, Utc::now());
  assert!(view.contacts().is_empty());
  assert_eq!(view.total(), 0);
  assert_eq!(view.total_pages(), 0);
}

#[test]
fn archived_tab_keeps_recently_archived() {
  let mut view = ContactsView::default();
  view.set_tab(Tab::Archived);
  let ticket = view.begin_fetch(FetchKind::Content);
  let page = Paginated {
    data: vec![archived("Ada")],
    meta: PageMeta::new(PageRequest::default(), 1),
  };
  view.finish_fetch(ticket, Ok(page));

  let mut ada = view.contacts()[0].clone();
  ada.name = "Ada K".into();
  view.apply_updated(ada, Utc::now());
  assert_eq!(names(&view), ["Ada K"]);
}

#[test]
fn removal_decrements_only_when_present() {
  let mut view = loaded(&["Ada", "Bob"], 1, 10, 2);
  let ada = view.contacts()[0].id;

  view.apply_moved(Uuid::new_v4());
  assert_eq!(view.total(), 2);

  view.apply_moved(ada);
  assert_eq!(names(&view), ["Bob"]);
  assert_eq!(view.total(), 1);
  assert_eq!(view.total_existing(), Some(2));
}

#[test]
fn delete_also_drops_existing_count() {
  let mut view = loaded(&["Ada"], 1, 10, 1);
  let ada = view.contacts()[0].id;
  view.apply_deleted(ada);
  assert!(view.contacts().is_empty());
  assert_eq!(view.total(), 0);
  assert_eq!(view.total_existing(), Some(0));
  assert_eq!(view.has_contacts(), Some(false));
}

#[test]
fn totals_never_go_negative() {
  let mut view = loaded(&["Ada"], 1, 10, 0);
  let ada = view.contacts()[0].id;
  view.apply_deleted(ada);
  assert_eq!(view.total(), 0);
  assert_eq!(view.total_existing(), Some(0));
}
