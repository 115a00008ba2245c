//! HTTP-specific error types for the DocumentDB client.
//!
//! # Error Handling
//!
//! - [`RequestError`]: Non-2xx responses other than 412, decoded from the JSON error body
//! - [`InvalidHttpRequestError`]: A request that fails validation before sending
//! - [`HttpError`]: Unified error type for request execution
//!
//! Throttled (429) and unavailable (503) responses are retried internally;
//! once the retry budget is spent the last one is reported as an ordinary
//! [`RequestError`].
//!
//! # Example
//!
//! ```rust,ignore
//! use documentdb::clients::HttpError;
//!
//! match executor.execute::<Database>(request).await {
//!     Ok(decoded) => println!("Read {}", decoded.value.resource.id),
//!     Err(HttpError::PreconditionFailed) => println!("Etag is stale, re-read and retry"),
//!     Err(HttpError::Request(e)) if e.is_conflict() => println!("Already exists"),
//!     Err(HttpError::Cancelled) => println!("Gave up while backing off"),
//!     Err(e) => println!("Failed: {e}"),
//! }
//! ```

use serde_json::Value;
use thiserror::Error;

use crate::auth::AuthError;

/// Error code the service returns when an id already exists.
pub const CONFLICT_CODE: &str = "Conflict";

/// Error returned when the service answers with a non-success status.
///
/// `code` and `message` come from the JSON error body. Each is read on its
/// own, so a mistyped or missing field leaves only that field empty; a body
/// that is not JSON leaves both empty. `status` is always set.
///
/// # Example
///
/// ```rust
/// use documentdb::clients::RequestError;
///
/// let error = RequestError::from_body(409, br#"{"code":"Conflict","message":"exists"}"#, None);
/// assert!(error.is_conflict());
/// assert_eq!(error.to_string(), "Conflict, exists");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Error)]
#[error("{code}, {message}")]
pub struct RequestError {
    /// The HTTP status code of the response.
    pub status: u16,
    /// Service error code, e.g. `Conflict` or `NotFound`.
    pub code: String,
    /// Service error message.
    pub message: String,
    /// Value of the `x-ms-activity-id` header, for support requests.
    pub activity_id: Option<String>,
}

impl RequestError {
    /// Builds an error from a response status and raw body.
    #[must_use]
    pub fn from_body(status: u16, body: &[u8], activity_id: Option<String>) -> Self {
        let parsed: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        let field = |name: &str| {
            parsed
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            status,
            code: field("code"),
            message: field("message"),
            activity_id,
        }
    }

    /// Returns `true` if the service reported an id conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.code == CONFLICT_CODE
    }

    /// Returns `true` if the response was a 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Error returned when a request fails validation before it is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A request body was provided without specifying the body type.
    #[error("Cannot set a body without also setting body_type.")]
    MissingBodyType,

    /// A POST or PUT request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },
}

/// Unified error type for request execution.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network or connection error. Not retried.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request could not be signed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// An `If-Match` precondition failed (412). Not retried.
    #[error("Precondition failed: the resource was modified since the supplied etag")]
    PreconditionFailed,

    /// The service rejected the request.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The caller's cancellation token fired while waiting to retry.
    #[error("Request cancelled while waiting to retry")]
    Cancelled,

    /// A success response did not match the expected shape.
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// A request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),
}

impl HttpError {
    /// Returns `true` for a [`RequestError`] with code `Conflict`.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_conflict())
    }
}
