//! Debounced search input.
//!
//! Each keystroke replaces the pending timer. Once input has been quiet for
//! the delay, the latest raw value is sent on the channel returned by
//! [`SearchDebouncer::new`]; the receiver decides whether it is worth
//! committing (see [`ContactsView::commit_search`](crate::view::ContactsView::commit_search)).

use std::time::Duration;

use tokio::{
  sync::mpsc,
  task::JoinHandle,
  time::{Instant, sleep_until},
};

/// Quiet period before a search is committed.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(1000);

pub struct SearchDebouncer {
  delay:   Duration,
  pending: Option<JoinHandle<()>>,
  tx:      mpsc::UnboundedSender<String>,
}

impl SearchDebouncer {
  pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { delay, pending: None, tx }, rx)
  }

  /// Register a keystroke. Cancels the previous timer, if any.
  pub fn input(&mut self, raw: impl Into<String>) {
    self.cancel();

    let raw = raw.into();
    let tx = self.tx.clone();
    let deadline = Instant::now() + self.delay;
    self.pending = Some(tokio::spawn(async move {
      sleep_until(deadline).await;
      // Receiver gone means the view was dropped.
      let _ = tx.send(raw);
    }));
  }

  pub fn cancel(&mut self) {
    if let Some(handle) = self.pending.take() {
      handle.abort();
    }
  }

  pub fn is_pending(&self) -> bool { self.pending.as_ref().is_some_and(|h| !h.is_finished()) }
}

impl Drop for SearchDebouncer {
  fn drop(&mut self) { self.cancel(); }
}
