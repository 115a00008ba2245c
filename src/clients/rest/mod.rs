//! REST verbs for the DocumentDB API.
//!
//! This module provides a thin client built on top of the
//! [`Executor`](crate::clients::Executor) that offers the verbs resource
//! operations are composed from.
//!
//! # Overview
//!
//! - [`RestClient`]: `query()`, `create()`, `replace()`, `delete()` and `execute()`,
//!   plus `send_raw()` for bodies that are already encoded
//! - [`CallOptions`]: Per-call hook metadata and cancellation token
//!
//! # Queries
//!
//! `query()` issues a GET of the feed when there is no query text, and a
//! POST with an `application/query+json` body otherwise. Either way a
//! continuation token on the [`Query`](crate::Query) selects the page.

mod client;

pub use client::{CallOptions, RestClient};
