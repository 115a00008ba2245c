//! HTTP request types for the DocumentDB client.
//!
//! This module provides the [`HttpRequest`] type and its builder, and the
//! header construction every request goes through before it is sent:
//! signing, query headers, continuation, and caller overrides.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::auth::{authorization_token, AuthError};
use crate::clients::errors::{HttpError, InvalidHttpRequestError};
use crate::clients::hook::CallContext;
use crate::config::{ApiVersion, MasterKey};
use crate::link::ResourceLink;
use crate::query::Query;

/// `x-ms-date` header.
pub const HEADER_DATE: &str = "x-ms-date";
/// `x-ms-version` header.
pub const HEADER_VERSION: &str = "x-ms-version";
/// `authorization` header.
pub const HEADER_AUTHORIZATION: &str = "authorization";
/// `content-type` header.
pub const HEADER_CONTENT_TYPE: &str = "content-type";
/// `content-length` header.
pub const HEADER_CONTENT_LENGTH: &str = "content-length";
/// Marks a POST against a feed as a query.
pub const HEADER_IS_QUERY: &str = "x-ms-documentdb-isquery";
/// Turns a create into an upsert.
pub const HEADER_UPSERT: &str = "x-ms-documentdb-is-upsert";
/// Optimistic-concurrency etag.
pub const HEADER_IF_MATCH: &str = "if-match";
/// Continuation token of a paged feed.
pub const HEADER_CONTINUATION: &str = "x-ms-continuation";

/// Formats a timestamp the way `x-ms-date` expects (RFC 1123, GMT).
#[must_use]
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// HTTP methods used by the REST API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Reads and feed listings.
    Get,
    /// Creates, queries and stored procedure execution.
    Post,
    /// Replaces.
    Put,
    /// Deletes.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Post => write!(f, "post"),
            Self::Put => write!(f, "put"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Content type of a request body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    /// `application/json`.
    Json,
    /// `application/query+json`, for SQL query bodies.
    QueryJson,
}

impl DataType {
    /// Returns the MIME type string for this data type.
    #[must_use]
    pub const fn as_content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::QueryJson => "application/query+json",
        }
    }
}

/// A request against a resource link.
///
/// The body is held as bytes so each retry re-sends exactly the same
/// payload.
///
/// # Example
///
/// ```rust
/// use documentdb::clients::{DataType, HttpMethod, HttpRequest};
///
/// let request = HttpRequest::builder(HttpMethod::Post, "dbs")
///     .body(br#"{"id":"mydb"}"#.to_vec())
///     .body_type(DataType::Json)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.link.resource_type().as_str(), "dbs");
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The resource link (relative to the endpoint).
    pub link: ResourceLink,
    /// The buffered request body, if any.
    pub body: Option<Vec<u8>>,
    /// The content type of the body.
    pub body_type: Option<DataType>,
    /// Continuation token echoed in `x-ms-continuation`.
    pub continuation: Option<String>,
    /// Additional headers, applied over the defaults.
    pub extra_headers: Option<HashMap<String, String>>,
    /// Call metadata handed to the response hook.
    pub context: CallContext,
    /// Cancellation signal observed while waiting to retry.
    pub cancellation: Option<CancellationToken>,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, link: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, link)
    }

    /// Validates the request, ensuring it meets all requirements.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if:
    /// - `body` is `Some` but `body_type` is `None`
    /// - `http_method` is `Post` or `Put` but `body` is `None`
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if self.body.is_some() && self.body_type.is_none() {
            return Err(InvalidHttpRequestError::MissingBodyType);
        }

        if matches!(self.http_method, HttpMethod::Post | HttpMethod::Put) && self.body.is_none() {
            return Err(InvalidHttpRequestError::MissingBody {
                method: self.http_method.to_string(),
            });
        }

        Ok(())
    }

    /// Builds the service headers for this request.
    ///
    /// Starts from `defaults`, adds version, date and the master-key
    /// signature, then the query and continuation headers, and finally the
    /// caller's extra headers. Header names are lower-cased, so a caller
    /// header replaces a default of the same name regardless of case.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the master key is not valid base64.
    pub fn headers(
        &self,
        defaults: &HashMap<String, String>,
        master_key: &MasterKey,
        api_version: &ApiVersion,
        date: &str,
    ) -> Result<HashMap<String, String>, AuthError> {
        let mut headers: HashMap<String, String> = defaults
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.clone()))
            .collect();

        let token = authorization_token(
            &self.http_method.to_string(),
            self.link.resource_type().as_str(),
            self.link.resource_id(),
            date,
            master_key,
        )?;
        headers.insert(HEADER_VERSION.to_string(), api_version.to_string());
        headers.insert(HEADER_DATE.to_string(), date.to_string());
        headers.insert(HEADER_AUTHORIZATION.to_string(), token);

        if let Some(body_type) = &self.body_type {
            headers.insert(
                HEADER_CONTENT_TYPE.to_string(),
                body_type.as_content_type().to_string(),
            );
        }
        if self.body_type == Some(DataType::QueryJson) {
            headers.insert(HEADER_IS_QUERY.to_string(), "True".to_string());
            let length = self.body.as_ref().map_or(0, Vec::len);
            headers.insert(HEADER_CONTENT_LENGTH.to_string(), length.to_string());
        }
        if let Some(token) = self.continuation.as_deref().filter(|t| !t.is_empty()) {
            headers.insert(HEADER_CONTINUATION.to_string(), token.to_string());
        }

        if let Some(extra) = &self.extra_headers {
            for (key, value) in extra {
                headers.insert(key.to_lowercase(), value.clone());
            }
        }

        Ok(headers)
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    link: String,
    body: Option<Vec<u8>>,
    body_type: Option<DataType>,
    continuation: Option<String>,
    extra_headers: Option<HashMap<String, String>>,
    context: CallContext,
    cancellation: Option<CancellationToken>,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, link: impl Into<String>) -> Self {
        Self {
            http_method: method,
            link: link.into(),
            body: None,
            body_type: None,
            continuation: None,
            extra_headers: None,
            context: CallContext::default(),
            cancellation: None,
        }
    }

    /// Sets the request body.
    ///
    /// When setting a body, you must also set the body type via [`body_type`](Self::body_type).
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the content type of the request body.
    #[must_use]
    pub const fn body_type(mut self, body_type: DataType) -> Self {
        self.body_type = Some(body_type);
        self
    }

    /// Attaches a SQL query.
    ///
    /// A query with text becomes the body (`application/query+json`); the
    /// query's continuation token is echoed either way. The query is also
    /// recorded in the call context for the response hook.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Encode`] if a parameter value cannot be serialized.
    pub fn query(mut self, query: &Query) -> Result<Self, HttpError> {
        if query.has_text() {
            self.body = Some(serde_json::to_vec(query).map_err(HttpError::Encode)?);
            self.body_type = Some(DataType::QueryJson);
        }
        if let Some(token) = &query.continuation {
            self.continuation = Some(token.clone());
        }
        self.context.query = Some(query.clone());
        Ok(self)
    }

    /// Sets the continuation token of the page to fetch.
    #[must_use]
    pub fn continuation(mut self, token: impl Into<String>) -> Self {
        self.continuation = Some(token.into());
        self
    }

    /// Sets all extra headers at once.
    #[must_use]
    pub fn extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.extra_headers = Some(headers);
        self
    }

    /// Adds a single extra header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets the call metadata handed to the response hook.
    #[must_use]
    pub fn context(mut self, context: CallContext) -> Self {
        let query = self.context.query.take();
        self.context = context;
        if self.context.query.is_none() {
            self.context.query = query;
        }
        self
    }

    /// Sets the cancellation signal observed while waiting to retry.
    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let request = HttpRequest {
            http_method: self.http_method,
            link: ResourceLink::parse(self.link),
            body: self.body,
            body_type: self.body_type,
            continuation: self.continuation,
            extra_headers: self.extra_headers,
            context: self.context,
            cancellation: self.cancellation,
        };
        request.verify()?;
        Ok(request)
    }
}
