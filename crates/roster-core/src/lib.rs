//! Core types, listing logic and storage traits for the Roster contact
//! manager.
//!
//! This crate is free of HTTP and database dependencies. The storage backend
//! (`roster-store-sqlite`), the JSON API (`roster-api`) and the client
//! (`roster-client`) all build on it.

// Native `async fn` in traits; the `Send` bounds that matter are spelled out
// on the store traits.
#![allow(async_fn_in_trait)]

pub mod contact;
pub mod error;
pub mod pagination;
pub mod query;
pub mod service;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
