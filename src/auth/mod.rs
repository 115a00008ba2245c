//! Authentication for the DocumentDB REST API.
//!
//! Requests are authorized with the account master key: each request is
//! signed individually in [`signature`], and the resulting token travels in
//! the `authorization` header next to the `x-ms-date` it was computed over.
//!
//! A key that is not valid base64 is reported as [`AuthError`] when the
//! first request is built, before anything reaches the network.

pub mod signature;

pub use signature::{authorization_token, AuthError};
