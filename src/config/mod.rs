//! Configuration types for the DocumentDB client.
//!
//! This module provides the configuration used to construct an
//! [`Executor`](crate::clients::Executor) and everything layered on it.
//!
//! # Overview
//!
//! - [`DocumentDbConfig`]: The main configuration struct holding all client settings
//! - [`DocumentDbConfigBuilder`]: A builder for constructing [`DocumentDbConfig`] instances
//! - [`MasterKey`]: The account key, masked in debug output
//! - [`Endpoint`]: A validated account endpoint URL
//! - [`ApiVersion`]: The REST API version to send
//!
//! Behaviour that other clients expose as process-wide switches (the
//! response hook, verbose response logging, ignoring cancellation) is held
//! here, so two clients in one process never influence each other.
//!
//! # Example
//!
//! ```rust
//! use documentdb::{DocumentDbConfig, Endpoint, MasterKey};
//!
//! let config = DocumentDbConfig::builder()
//!     .endpoint(Endpoint::new("https://acct.documents.azure.com:443/").unwrap())
//!     .master_key(MasterKey::new("c2VjcmV0").unwrap())
//!     .max_retries(5)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.max_retries(), 5);
//! ```

mod newtypes;
mod version;

pub use newtypes::{Endpoint, MasterKey};
pub use version::ApiVersion;

use std::fmt;
use std::sync::Arc;

use crate::clients::{BackoffPolicy, ResponseHook};
use crate::error::ConfigError;

/// Default number of retries for throttled (429) and unavailable (503) responses.
pub const DEFAULT_MAX_RETRIES: u32 = 9;

/// Configuration for the DocumentDB client.
///
/// # Thread Safety
///
/// `DocumentDbConfig` is `Clone`, `Send`, and `Sync`. The response hook is
/// shared through an [`Arc`], so clones observe the same hook.
#[derive(Clone)]
pub struct DocumentDbConfig {
    endpoint: Endpoint,
    master_key: MasterKey,
    api_version: ApiVersion,
    max_retries: u32,
    backoff: BackoffPolicy,
    response_hook: Option<Arc<dyn ResponseHook>>,
    ignore_cancellation: bool,
    debug_logging: bool,
    user_agent_prefix: Option<String>,
}

impl DocumentDbConfig {
    /// Creates a new builder for constructing a `DocumentDbConfig`.
    #[must_use]
    pub fn builder() -> DocumentDbConfigBuilder {
        DocumentDbConfigBuilder::new()
    }

    /// Returns the account endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the master key.
    #[must_use]
    pub const fn master_key(&self) -> &MasterKey {
        &self.master_key
    }

    /// Returns the API version.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the maximum number of retries for 429/503 responses.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the backoff policy used between retries.
    #[must_use]
    pub const fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    /// Returns the response hook, if configured.
    #[must_use]
    pub fn response_hook(&self) -> Option<&Arc<dyn ResponseHook>> {
        self.response_hook.as_ref()
    }

    /// Returns whether cancellation tokens are ignored during backoff waits.
    #[must_use]
    pub const fn ignore_cancellation(&self) -> bool {
        self.ignore_cancellation
    }

    /// Returns whether every response is logged at debug level.
    #[must_use]
    pub const fn debug_logging(&self) -> bool {
        self.debug_logging
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

impl fmt::Debug for DocumentDbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentDbConfig")
            .field("endpoint", &self.endpoint)
            .field("master_key", &self.master_key)
            .field("api_version", &self.api_version)
            .field("max_retries", &self.max_retries)
            .field("backoff", &self.backoff)
            .field("response_hook", &self.response_hook.is_some())
            .field("ignore_cancellation", &self.ignore_cancellation)
            .field("debug_logging", &self.debug_logging)
            .field("user_agent_prefix", &self.user_agent_prefix)
            .finish()
    }
}

// Verify DocumentDbConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DocumentDbConfig>();
};

/// Builder for constructing [`DocumentDbConfig`] instances.
///
/// Required fields are `endpoint` and `master_key`.
///
/// # Defaults
///
/// - `api_version`: [`ApiVersion::latest()`]
/// - `max_retries`: [`DEFAULT_MAX_RETRIES`]
/// - `backoff`: [`BackoffPolicy::default()`] (ceiling 8, window `[300, 600)` ms)
/// - `response_hook`: `None`
/// - `ignore_cancellation`: `false`
/// - `debug_logging`: `false`
/// - `user_agent_prefix`: `None`
#[derive(Default)]
pub struct DocumentDbConfigBuilder {
    endpoint: Option<Endpoint>,
    master_key: Option<MasterKey>,
    api_version: Option<ApiVersion>,
    max_retries: Option<u32>,
    backoff: Option<BackoffPolicy>,
    response_hook: Option<Arc<dyn ResponseHook>>,
    ignore_cancellation: Option<bool>,
    debug_logging: Option<bool>,
    user_agent_prefix: Option<String>,
}

impl DocumentDbConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the account endpoint (required).
    #[must_use]
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Sets the master key (required).
    #[must_use]
    pub fn master_key(mut self, key: MasterKey) -> Self {
        self.master_key = Some(key);
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets the maximum number of retries for 429/503 responses.
    ///
    /// `0` disables retries; the first throttled response is surfaced as a
    /// request error.
    #[must_use]
    pub const fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Sets the backoff policy.
    #[must_use]
    pub const fn backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Sets a hook that observes every response before it is classified.
    ///
    /// # Example
    ///
    /// ```rust
    /// use documentdb::{DocumentDbConfig, Endpoint, MasterKey};
    /// use documentdb::clients::ResponseEvent;
    ///
    /// let config = DocumentDbConfig::builder()
    ///     .endpoint(Endpoint::new("https://x/").unwrap())
    ///     .master_key(MasterKey::new("c2VjcmV0").unwrap())
    ///     .response_hook(|event: &ResponseEvent<'_>| {
    ///         println!("{} {} -> {}", event.method, event.link, event.status);
    ///     })
    ///     .build()
    ///     .unwrap();
    ///
    /// assert!(config.response_hook().is_some());
    /// ```
    #[must_use]
    pub fn response_hook(mut self, hook: impl ResponseHook + 'static) -> Self {
        self.response_hook = Some(Arc::new(hook));
        self
    }

    /// Makes backoff waits run to completion even when the caller's
    /// cancellation token fires.
    #[must_use]
    pub const fn ignore_cancellation(mut self, ignore: bool) -> Self {
        self.ignore_cancellation = Some(ignore);
        self
    }

    /// Logs the status and diagnostic headers of every response at debug level.
    #[must_use]
    pub const fn debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = Some(enabled);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`DocumentDbConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `endpoint` or
    /// `master_key` are not set.
    pub fn build(self) -> Result<DocumentDbConfig, ConfigError> {
        let endpoint = self
            .endpoint
            .ok_or(ConfigError::MissingRequiredField { field: "endpoint" })?;
        let master_key = self
            .master_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "master_key",
            })?;

        Ok(DocumentDbConfig {
            endpoint,
            master_key,
            api_version: self.api_version.unwrap_or_else(ApiVersion::latest),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            backoff: self.backoff.unwrap_or_default(),
            response_hook: self.response_hook,
            ignore_cancellation: self.ignore_cancellation.unwrap_or(false),
            debug_logging: self.debug_logging.unwrap_or(false),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

impl fmt::Debug for DocumentDbConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentDbConfigBuilder")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("max_retries", &self.max_retries)
            .field("response_hook", &self.response_hook.is_some())
            .finish_non_exhaustive()
    }
}
