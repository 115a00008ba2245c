//! HTTP client types for DocumentDB communication.
//!
//! This module provides the request execution layer: building signed
//! requests, sending them, retrying transient failures, and decoding
//! responses.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`Executor`]: Sends requests and owns the retry loop
//! - [`HttpRequest`]: A request to be sent to the service
//! - [`HttpResponse`]: A raw response from the service
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, DELETE)
//! - [`DataType`]: Content types for request bodies
//! - [`BackoffPolicy`]: Exponential backoff with jitter
//! - [`ResponseHook`]: Observer invoked for every response
//! - [`rest::RestClient`]: Transport-level verbs (query, create, replace, delete, execute)
//!
//! # Example
//!
//! ```rust,ignore
//! use documentdb::clients::{Executor, HttpMethod, HttpRequest};
//! use documentdb::models::{Database, Feed};
//!
//! let executor = Executor::new(&config)?;
//!
//! let request = HttpRequest::builder(HttpMethod::Get, "dbs").build()?;
//! let databases = executor.execute::<Feed<Database>>(request).await?;
//! ```
//!
//! # Retry Behavior
//!
//! - **429 (Throttled)** and **503 (Unavailable)**: Retried up to
//!   `max_retries` times, waiting [`BackoffPolicy::delay`] between attempts
//! - **412 (Precondition Failed)**: Returned immediately as
//!   [`HttpError::PreconditionFailed`]
//! - **Other errors**: Returned immediately as [`HttpError::Request`]
//!
//! A backoff wait ends early with [`HttpError::Cancelled`] when the
//! request's cancellation token fires. Requests already in flight are never
//! aborted.

mod backoff;
mod errors;
mod executor;
mod hook;
mod http_request;
mod http_response;
pub mod rest;

pub use backoff::{
    BackoffPolicy, DEFAULT_BACKOFF_CEILING, DEFAULT_MAX_WINDOW_MS, DEFAULT_MIN_WINDOW_MS,
};
pub use errors::{HttpError, InvalidHttpRequestError, RequestError, CONFLICT_CODE};
pub use executor::{Decoded, Executor, SDK_VERSION};
pub use hook::{CallContext, ResponseEvent, ResponseHook};
pub use http_request::{
    format_date, DataType, HttpMethod, HttpRequest, HttpRequestBuilder, HEADER_CONTINUATION,
    HEADER_IF_MATCH, HEADER_UPSERT,
};
pub use http_response::HttpResponse;

// Re-export REST client types at the clients module level
pub use rest::{CallOptions, RestClient};
