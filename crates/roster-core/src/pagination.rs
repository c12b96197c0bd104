//! Pagination engine: page/limit normalisation, offsets and page metadata.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// A normalised `(page, limit)` pair. Both are always `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  page:  u64,
  limit: u64,
}

impl Default for PageRequest {
  fn default() -> Self { Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT } }
}

impl PageRequest {
  /// Absent or non-positive values fall back to page 1 / limit 10.
  pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
    let positive = |v: Option<i64>| v.filter(|n| *n > 0).map(|n| n as u64);
    Self {
      page:  positive(page).unwrap_or(DEFAULT_PAGE),
      limit: positive(limit).unwrap_or(DEFAULT_LIMIT),
    }
  }

  pub fn page(&self) -> u64 { self.page }

  pub fn limit(&self) -> u64 { self.limit }

  /// Rows to skip before this page starts.
  pub fn skip(&self) -> u64 { (self.page - 1).saturating_mul(self.limit) }

  pub fn with_page(self, page: u64) -> Self { Self { page: page.max(1), ..self } }
}

/// `ceil(total / limit)`; zero when there are no rows.
pub fn total_pages(total: u64, limit: u64) -> u64 { total.div_ceil(limit.max(1)) }

/// Metadata accompanying a page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
  pub total:       u64,
  pub page:        u64,
  pub limit:       u64,
  pub total_pages: u64,
  /// Only present when statistics were requested.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub has_contacts: Option<bool>,
  /// Active plus archived (any age), excluding deleted. Only present when
  /// statistics were requested.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub total_existing_contacts: Option<u64>,
}

impl PageMeta {
  pub fn new(request: PageRequest, total: u64) -> Self {
    Self {
      total,
      page: request.page,
      limit: request.limit,
      total_pages: total_pages(total, request.limit),
      has_contacts: None,
      total_existing_contacts: None,
    }
  }

  /// Attach the "existing contacts" statistic.
  pub fn with_existing(mut self, existing: u64) -> Self {
    self.total_existing_contacts = Some(existing);
    self.has_contacts = Some(existing > 0);
    self
  }
}

/// The `{data, meta}` listing envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
  pub data: Vec<T>,
  pub meta: PageMeta,
}

/// The `{data}` envelope around a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
  pub data: T,
}
