//! Observation of every response the executor receives.
//!
//! A [`ResponseHook`] is invoked once per attempt, including attempts that
//! are about to be retried, before the status is interpreted. It cannot
//! alter the response.
//!
//! # Example
//!
//! ```rust
//! use documentdb::clients::{ResponseEvent, ResponseHook};
//!
//! struct ChargeLogger;
//!
//! impl ResponseHook for ChargeLogger {
//!     fn on_response(&self, event: &ResponseEvent<'_>) {
//!         println!("{} {} -> {}", event.method, event.link, event.status);
//!     }
//! }
//! ```

use std::collections::HashMap;

use crate::clients::http_request::HttpMethod;
use crate::query::Query;

/// What a call was about, beyond its link.
///
/// The resource handles fill in the collection or stored procedure they
/// act on so a hook can attribute request charges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallContext {
    /// The query that produced the request, if any.
    pub query: Option<Query>,
    /// Id of the collection the call targets.
    pub collection: Option<String>,
    /// Id of the stored procedure being executed.
    pub procedure: Option<String>,
}

impl CallContext {
    /// Context for a call scoped to a collection.
    #[must_use]
    pub fn for_collection(id: impl Into<String>) -> Self {
        Self {
            collection: Some(id.into()),
            ..Self::default()
        }
    }

    /// Adds the stored procedure id.
    #[must_use]
    pub fn with_procedure(mut self, id: impl Into<String>) -> Self {
        self.procedure = Some(id.into());
        self
    }
}

/// A single observed response.
#[derive(Debug)]
pub struct ResponseEvent<'a> {
    /// Method of the request.
    pub method: HttpMethod,
    /// Link the request was sent to.
    pub link: &'a str,
    /// Response status code.
    pub status: u16,
    /// Response headers, keys lower-cased.
    pub headers: &'a HashMap<String, Vec<String>>,
    /// Zero-based attempt number.
    pub attempt: u32,
    /// Call metadata.
    pub context: &'a CallContext,
}

impl ResponseEvent<'_> {
    /// Returns the first value of a header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the request units charged for this attempt.
    #[must_use]
    pub fn request_charge(&self) -> Option<f64> {
        self.header("x-ms-request-charge")
            .and_then(|v| v.parse().ok())
    }
}

/// Observer invoked for every response.
pub trait ResponseHook: Send + Sync {
    /// Called once per attempt with the raw status and headers.
    fn on_response(&self, event: &ResponseEvent<'_>);
}

impl<F> ResponseHook for F
where
    F: Fn(&ResponseEvent<'_>) + Send + Sync,
{
    fn on_response(&self, event: &ResponseEvent<'_>) {
        self(event);
    }
}
