//! Request execution against the DocumentDB REST API.
//!
//! This module provides the [`Executor`] type: it signs and sends a
//! [`HttpRequest`], retries throttled (429) and unavailable (503) responses
//! with exponential backoff, and decodes the result.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::clients::backoff::BackoffPolicy;
use crate::clients::errors::{HttpError, RequestError};
use crate::clients::hook::{ResponseEvent, ResponseHook};
use crate::clients::http_request::{format_date, HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::{ApiVersion, DocumentDbConfig, Endpoint, MasterKey};

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A decoded success response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded<T> {
    /// The decoded body.
    pub value: T,
    /// Continuation token of the next page, if there is one.
    pub continuation: Option<String>,
}

/// Sends requests and owns the retry loop.
///
/// The executor holds no per-call state: every call gets its own retry
/// counter, so one executor can serve any number of concurrent calls.
///
/// # Thread Safety
///
/// `Executor` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use documentdb::clients::{Executor, HttpMethod, HttpRequest};
/// use documentdb::models::{Database, Feed};
///
/// let executor = Executor::new(&config)?;
/// let request = HttpRequest::builder(HttpMethod::Get, "dbs").build()?;
///
/// let decoded = executor.execute::<Feed<Database>>(request).await?;
/// println!("{} databases", decoded.value.items.len());
/// ```
pub struct Executor {
    client: reqwest::Client,
    endpoint: Endpoint,
    master_key: MasterKey,
    api_version: ApiVersion,
    max_retries: u32,
    backoff: BackoffPolicy,
    response_hook: Option<Arc<dyn ResponseHook>>,
    ignore_cancellation: bool,
    debug_logging: bool,
    default_headers: HashMap<String, String>,
}

// Verify Executor is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Executor>();
};

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("endpoint", &self.endpoint)
            .field("master_key", &self.master_key)
            .field("api_version", &self.api_version)
            .field("max_retries", &self.max_retries)
            .field("backoff", &self.backoff)
            .field("response_hook", &self.response_hook.is_some())
            .field("ignore_cancellation", &self.ignore_cancellation)
            .field("debug_logging", &self.debug_logging)
            .finish_non_exhaustive()
    }
}

impl Executor {
    /// Creates an executor with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Transport`] if the TLS backend cannot be
    /// initialized.
    pub fn new(config: &DocumentDbConfig) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;
        Ok(Self::with_client(client, config))
    }

    /// Creates an executor over an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: &DocumentDbConfig) -> Self {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}documentdb-rust v{SDK_VERSION}");

        let mut default_headers = HashMap::new();
        default_headers.insert("user-agent".to_string(), user_agent);
        default_headers.insert("accept".to_string(), "application/json".to_string());

        Self {
            client,
            endpoint: config.endpoint().clone(),
            master_key: config.master_key().clone(),
            api_version: config.api_version().clone(),
            max_retries: config.max_retries(),
            backoff: *config.backoff(),
            response_hook: config.response_hook().cloned(),
            ignore_cancellation: config.ignore_cancellation(),
            debug_logging: config.debug_logging(),
            default_headers,
        }
    }

    /// Returns the endpoint requests are sent to.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the default headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends a request and decodes a success body into `T`.
    ///
    /// An empty success body decodes as JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation or signing fails (`InvalidRequest`, `Auth`)
    /// - A network error occurs (`Transport`)
    /// - The etag precondition fails (`PreconditionFailed`)
    /// - Any other non-2xx response is received (`Request`)
    /// - The cancellation token fires during a backoff wait (`Cancelled`)
    /// - The success body does not match `T` (`Decode`)
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<Decoded<T>, HttpError> {
        let response = self.send(&request).await?;
        let body: &[u8] = if response.body.is_empty() {
            b"null"
        } else {
            &response.body
        };
        let value = serde_json::from_slice(body).map_err(HttpError::Decode)?;
        Ok(Decoded {
            value,
            continuation: response.continuation().map(String::from),
        })
    }

    /// Sends a request and ignores the success body.
    ///
    /// Returns the continuation header, if any.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute), minus `Decode`.
    pub async fn execute_discard(&self, request: HttpRequest) -> Result<Option<String>, HttpError> {
        let response = self.send(&request).await?;
        Ok(response.continuation().map(String::from))
    }

    /// Sends a request, retrying 429 and 503 responses.
    ///
    /// Returns the first 2xx response. The request body is re-sent
    /// unchanged on every attempt and each attempt is freshly signed.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = self.endpoint.url_for(request.link.as_str());
        let mut retry_count: u32 = 0;
        let mut attempt: u32 = 0;

        loop {
            let date = format_date(Utc::now());
            let headers =
                request.headers(&self.default_headers, &self.master_key, &self.api_version, &date)?;

            let mut req_builder = match request.http_method {
                HttpMethod::Get => self.client.get(&url),
                HttpMethod::Post => self.client.post(&url),
                HttpMethod::Put => self.client.put(&url),
                HttpMethod::Delete => self.client.delete(&url),
            };
            for (key, value) in &headers {
                req_builder = req_builder.header(key, value);
            }
            if let Some(body) = &request.body {
                req_builder = req_builder.body(body.clone());
            }

            let res = req_builder.send().await?;
            let code = res.status().as_u16();
            let res_headers = Self::parse_response_headers(res.headers());
            let body = res.bytes().await?.to_vec();
            let response = HttpResponse::new(code, res_headers, body);

            if let Some(hook) = &self.response_hook {
                hook.on_response(&ResponseEvent {
                    method: request.http_method,
                    link: request.link.as_str(),
                    status: code,
                    headers: &response.headers,
                    attempt,
                    context: &request.context,
                });
            }

            if self.debug_logging {
                tracing::debug!(
                    method = %request.http_method,
                    link = %request.link,
                    status = code,
                    attempt,
                    activity_id = response.activity_id().unwrap_or_default(),
                    request_charge = response.request_charge().unwrap_or_default(),
                    "DocumentDB response"
                );
            }

            if response.is_retryable() {
                retry_count += 1;
                if retry_count <= self.max_retries {
                    let delay = self.backoff.delay(retry_count);
                    tracing::debug!(
                        link = %request.link,
                        status = code,
                        retry = retry_count,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Retrying throttled request"
                    );
                    self.wait(delay, request.cancellation.as_ref()).await?;
                    attempt += 1;
                    continue;
                }
                tracing::warn!(
                    "Giving up on {} {} after {} retries, last status {}",
                    request.http_method,
                    request.link,
                    self.max_retries,
                    code
                );
            }

            if code == 412 {
                return Err(HttpError::PreconditionFailed);
            }

            if !response.is_ok() {
                return Err(RequestError::from_body(
                    code,
                    &response.body,
                    response.activity_id().map(String::from),
                )
                .into());
            }

            return Ok(response);
        }
    }

    /// Waits out a backoff delay, unless the token fires first.
    async fn wait(
        &self,
        delay: Duration,
        cancellation: Option<&CancellationToken>,
    ) -> Result<(), HttpError> {
        match cancellation {
            Some(token) if !self.ignore_cancellation => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => Err(HttpError::Cancelled),
                    () = tokio::time::sleep(delay) => Ok(()),
                }
            }
            _ => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DocumentDbConfig {
        DocumentDbConfig::builder()
            .endpoint(Endpoint::new("https://example.documents.azure.com/").unwrap())
            .master_key(MasterKey::new("a2V5").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_user_agent_header_format() {
        let executor = Executor::new(&config()).unwrap();
        let user_agent = executor.default_headers().get("user-agent").unwrap();
        assert!(user_agent.starts_with("documentdb-rust v"));
    }

    #[test]
    fn test_user_agent_with_prefix() {
        let config = DocumentDbConfig::builder()
            .endpoint(Endpoint::new("https://example.documents.azure.com").unwrap())
            .master_key(MasterKey::new("a2V5").unwrap())
            .user_agent_prefix("MyApp/1.0")
            .build()
            .unwrap();
        let executor = Executor::new(&config).unwrap();

        let user_agent = executor.default_headers().get("user-agent").unwrap();
        assert!(user_agent.starts_with("MyApp/1.0 | documentdb-rust v"));
    }

    #[test]
    fn test_accept_header_is_json() {
        let executor = Executor::new(&config()).unwrap();
        assert_eq!(
            executor.default_headers().get("accept"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_debug_masks_master_key() {
        let executor = Executor::new(&config()).unwrap();
        let debug = format!("{executor:?}");
        assert!(debug.contains("MasterKey(*****)"));
        assert!(!debug.contains("a2V5"));
    }

    #[test]
    fn test_executor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Executor>();
    }

    #[tokio::test]
    async fn test_wait_returns_cancelled_when_token_fired() {
        let executor = Executor::new(&config()).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result = executor.wait(Duration::from_secs(60), Some(&token)).await;
        assert!(matches!(result, Err(HttpError::Cancelled)));
    }

    #[tokio::test]
    async fn test_wait_ignores_token_when_configured() {
        let config = DocumentDbConfig::builder()
            .endpoint(Endpoint::new("https://example.documents.azure.com").unwrap())
            .master_key(MasterKey::new("a2V5").unwrap())
            .ignore_cancellation(true)
            .build()
            .unwrap();
        let executor = Executor::new(&config).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result = executor.wait(Duration::from_millis(1), Some(&token)).await;
        assert!(result.is_ok());
    }
}
