//! HTTP response types for the DocumentDB client.
//!
//! This module provides the [`HttpResponse`] type and accessors for the
//! service headers the client cares about.

use std::collections::HashMap;

use crate::clients::http_request::HEADER_CONTINUATION;

/// `x-ms-activity-id` header.
pub const HEADER_ACTIVITY_ID: &str = "x-ms-activity-id";
/// `x-ms-request-charge` header.
pub const HEADER_REQUEST_CHARGE: &str = "x-ms-request-charge";

/// An HTTP response from the service.
///
/// The body is kept as raw bytes; decoding happens once the status has been
/// interpreted.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers (headers may have multiple values), keys lower-cased.
    pub headers: HashMap<String, Vec<String>>,
    /// The raw response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`.
    #[must_use]
    pub const fn new(code: u16, headers: HashMap<String, Vec<String>>, body: Vec<u8>) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns `true` for statuses the executor waits out and retries (429, 503).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.code, 429 | 503)
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the continuation token of the next page.
    ///
    /// An absent or empty `x-ms-continuation` header means there are no
    /// more pages.
    #[must_use]
    pub fn continuation(&self) -> Option<&str> {
        self.header(HEADER_CONTINUATION).filter(|t| !t.is_empty())
    }

    /// Returns the `x-ms-activity-id` header value, if present.
    ///
    /// This id is useful for support requests and should be included in
    /// error reports.
    #[must_use]
    pub fn activity_id(&self) -> Option<&str> {
        self.header(HEADER_ACTIVITY_ID)
    }

    /// Returns the request units charged, if reported.
    #[must_use]
    pub fn request_charge(&self) -> Option<f64> {
        self.header(HEADER_REQUEST_CHARGE)
            .and_then(|v| v.parse().ok())
    }
}
