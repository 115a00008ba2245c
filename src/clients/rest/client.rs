//! REST client implementation for the DocumentDB API.
//!
//! This module provides the [`RestClient`] type: the five transport verbs
//! every resource operation is built from.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::clients::{
    CallContext, DataType, Decoded, Executor, HttpError, HttpMethod, HttpRequest,
    HttpRequestBuilder,
};
use crate::config::DocumentDbConfig;
use crate::query::Query;

/// Per-call settings carried alongside a request.
#[derive(Clone, Debug, Default)]
pub struct CallOptions {
    /// Metadata handed to the response hook.
    pub context: CallContext,
    /// Cancellation signal observed during backoff waits.
    pub cancellation: Option<CancellationToken>,
}

impl CallOptions {
    fn apply(&self, builder: HttpRequestBuilder) -> HttpRequestBuilder {
        let builder = builder.context(self.context.clone());
        match &self.cancellation {
            Some(token) => builder.cancellation(token.clone()),
            None => builder,
        }
    }
}

/// REST client for the DocumentDB API.
///
/// Provides `query`, `create`, `replace`, `delete` and `execute` over
/// resource links. Bodies are serialized with `serde_json`; a
/// [`serde_json::Value`] is sent as-is. A `&str` is serialized as a JSON
/// string, so text that is already JSON goes through [`RestClient::send_raw`].
///
/// # Thread Safety
///
/// `RestClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use documentdb::clients::{CallOptions, RestClient};
/// use documentdb::models::{Database, Feed};
///
/// let client = RestClient::new(&config)?;
///
/// let page = client
///     .query::<Feed<Database>>("dbs", None, &CallOptions::default())
///     .await?;
///
/// let created: Database = client
///     .create("dbs", &serde_json::json!({"id": "mydb"}), None, &CallOptions::default())
///     .await?;
/// ```
#[derive(Debug)]
pub struct RestClient {
    /// The executor requests are sent through.
    executor: Executor,
}

// Verify RestClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestClient>();
};

impl RestClient {
    /// Creates a new REST client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Transport`] if the HTTP client cannot be created.
    pub fn new(config: &DocumentDbConfig) -> Result<Self, HttpError> {
        Ok(Self {
            executor: Executor::new(config)?,
        })
    }

    /// Creates a REST client over an existing executor.
    #[must_use]
    pub const fn from_executor(executor: Executor) -> Self {
        Self { executor }
    }

    /// Returns the underlying executor.
    #[must_use]
    pub const fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Reads or queries a feed.
    ///
    /// Without query text this is a GET of `link` (a query carrying only a
    /// continuation token fetches that page). With query text it is a POST
    /// of the query body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] for request, transport and decode failures.
    pub async fn query<T: DeserializeOwned>(
        &self,
        link: &str,
        query: Option<&Query>,
        options: &CallOptions,
    ) -> Result<Decoded<T>, HttpError> {
        let method = if query.is_some_and(Query::has_text) {
            HttpMethod::Post
        } else {
            HttpMethod::Get
        };

        let mut builder = HttpRequest::builder(method, link);
        if let Some(query) = query {
            builder = builder.query(query)?;
        }
        let request = options.apply(builder).build()?;

        self.executor.execute(request).await
    }

    /// Creates a resource under a feed (POST).
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] for encode, request, transport and decode failures.
    pub async fn create<B, T>(
        &self,
        link: &str,
        body: &B,
        headers: Option<HashMap<String, String>>,
        options: &CallOptions,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(HttpMethod::Post, link, body, headers, options)
            .await
    }

    /// Replaces a resource (PUT).
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] for encode, request, transport and decode failures.
    pub async fn replace<B, T>(
        &self,
        link: &str,
        body: &B,
        headers: Option<HashMap<String, String>>,
        options: &CallOptions,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(HttpMethod::Put, link, body, headers, options)
            .await
    }

    /// Deletes a resource. The response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] for request and transport failures.
    pub async fn delete(
        &self,
        link: &str,
        headers: Option<HashMap<String, String>>,
        options: &CallOptions,
    ) -> Result<(), HttpError> {
        let mut builder = HttpRequest::builder(HttpMethod::Delete, link);
        if let Some(headers) = headers {
            builder = builder.extra_headers(headers);
        }
        let request = options.apply(builder).build()?;

        self.executor.execute_discard(request).await?;
        Ok(())
    }

    /// Executes a stored procedure (POST of its argument array).
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] for encode, request, transport and decode failures.
    pub async fn execute<B, T>(
        &self,
        link: &str,
        body: &B,
        options: &CallOptions,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(HttpMethod::Post, link, body, None, options)
            .await
    }

    /// Sends a body that is already encoded JSON, byte for byte.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] for request, transport and decode failures.
    pub async fn send_raw<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        link: &str,
        body: impl Into<Vec<u8>>,
        headers: Option<HashMap<String, String>>,
        options: &CallOptions,
    ) -> Result<T, HttpError> {
        self.send_body(method, link, body.into(), headers, options)
            .await
    }

    async fn send_json<B, T>(
        &self,
        method: HttpMethod,
        link: &str,
        body: &B,
        headers: Option<HashMap<String, String>>,
        options: &CallOptions,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_vec(body).map_err(HttpError::Encode)?;
        self.send_body(method, link, body, headers, options).await
    }

    async fn send_body<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        link: &str,
        body: Vec<u8>,
        headers: Option<HashMap<String, String>>,
        options: &CallOptions,
    ) -> Result<T, HttpError> {
        let mut builder = HttpRequest::builder(method, link)
            .body(body)
            .body_type(DataType::Json);
        if let Some(headers) = headers {
            builder = builder.extra_headers(headers);
        }
        let request = options.apply(builder).build()?;

        let decoded = self.executor.execute(request).await?;
        Ok(decoded.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Endpoint, MasterKey};

    fn config() -> DocumentDbConfig {
        DocumentDbConfig::builder()
            .endpoint(Endpoint::new("https://acct.documents.azure.com/").unwrap())
            .master_key(MasterKey::new("a2V5").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_rest_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RestClient>();
    }

    #[test]
    fn test_rest_client_uses_configured_endpoint() {
        let client = RestClient::new(&config()).unwrap();
        assert_eq!(
            client.executor().endpoint().url_for("dbs"),
            "https://acct.documents.azure.com/dbs"
        );
    }

    #[test]
    fn test_call_options_apply_context_and_token() {
        let token = CancellationToken::new();
        let options = CallOptions {
            context: CallContext::for_collection("orders"),
            cancellation: Some(token),
        };

        let request = options
            .apply(HttpRequest::builder(HttpMethod::Get, "dbs/a/colls/orders/docs/"))
            .build()
            .unwrap();

        assert_eq!(request.context.collection.as_deref(), Some("orders"));
        assert!(request.cancellation.is_some());
    }
}
