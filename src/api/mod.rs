//! Resource operations over the REST verbs.
//!
//! # Overview
//!
//! - [`DocumentDb`]: Flat operations keyed by self links (read, read all,
//!   query, create, upsert, update, replace, delete, execute)
//! - [`Db`], [`Col`], [`Proc`]: Handles that resolve resources by id and
//!   chain into their children
//! - [`ApiError`]: Error type for resource operations
//!
//! # Cancellation
//!
//! [`DocumentDb::with_cancellation`] returns a client whose calls stop
//! waiting out throttling backoff once the token is cancelled, failing
//! with [`HttpError::Cancelled`](crate::clients::HttpError::Cancelled).
//! Handles created from that client inherit the token.

mod client;
mod errors;
mod handles;

pub use client::DocumentDb;
pub use errors::{is_exists, ApiError};
pub use handles::{Col, Db, Proc};
