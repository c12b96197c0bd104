//! Client side of Roster: an HTTP client for the contacts API and the view
//! state that a UI renders from.

pub mod client;
pub mod debounce;
pub mod sync;
pub mod view;

pub use client::{ApiClient, ApiConfig, ContactsBackend};
pub use sync::Synchronizer;
pub use view::ContactsView;
