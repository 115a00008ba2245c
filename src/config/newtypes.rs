//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A DocumentDB account master key.
///
/// The key is the base64 string shown in the portal as the primary or
/// secondary key. Only emptiness is checked here; the base64 payload is
/// decoded when a request is signed, so a malformed key surfaces as
/// [`AuthError`](crate::auth::AuthError) before any network call.
///
/// # Security
///
/// The `Debug` implementation masks the key, displaying only
/// `MasterKey(*****)`.
///
/// # Example
///
/// ```rust
/// use documentdb::MasterKey;
///
/// let key = MasterKey::new("c2VjcmV0").unwrap();
/// assert_eq!(format!("{:?}", key), "MasterKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct MasterKey(String);

impl MasterKey {
    /// Creates a new master key.
    ///
    /// Surrounding whitespace is removed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyMasterKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(ConfigError::EmptyMasterKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for MasterKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(*****)")
    }
}

/// A validated account endpoint URL.
///
/// Trailing slashes are ignored when request URLs are composed, so
/// `https://x/` and `https://x` address the same account.
///
/// # Example
///
/// ```rust
/// use documentdb::Endpoint;
///
/// let endpoint = Endpoint::new("https://x/").unwrap();
/// assert_eq!(endpoint.url_for("dbs/abc/colls/"), "https://x/dbs/abc/colls/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
}

impl Endpoint {
    /// Creates a new validated endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] if the URL has no scheme or
    /// no host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into().trim().to_string();
        let invalid = || ConfigError::InvalidEndpoint { url: url.clone() };

        let scheme_end = url.find("://").ok_or_else(invalid)?;
        let scheme = &url[..scheme_end];
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let remainder = url.get(scheme_end + 3..).unwrap_or_default();
        let host_len = remainder
            .find([':', '/', '?', '#'])
            .unwrap_or(remainder.len());
        if host_len == 0 {
            return Err(invalid());
        }

        Ok(Self { url })
    }

    /// Returns the URL without trailing slashes.
    #[must_use]
    pub fn base(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Composes the request URL for a resource link.
    ///
    /// Exactly one `/` separates the endpoint from the link regardless of
    /// how either side is written. The link's own trailing slash is kept,
    /// since feed links such as `dbs/abc/colls/` rely on it.
    #[must_use]
    pub fn url_for(&self, link: &str) -> String {
        format!("{}/{}", self.base(), link.trim_start_matches('/'))
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl Serialize for Endpoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.url)
    }
}

impl<'de> Deserialize<'de> for Endpoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}
