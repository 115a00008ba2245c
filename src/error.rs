//! Error types for the DocumentDB client.
//!
//! This module contains the error type used for configuration and validation
//! errors. Errors raised while talking to the service live next to the code
//! that raises them:
//!
//! - [`crate::clients::HttpError`] for request execution
//! - [`crate::auth::AuthError`] for request signing
//! - [`crate::api::ApiError`] for the resource API
//!
//! # Example
//!
//! ```rust
//! use documentdb::{ConfigError, MasterKey};
//!
//! let result = MasterKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyMasterKey)));
//! ```

use thiserror::Error;

/// Errors that can occur while building a client configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Master key cannot be empty.
    #[error("Master key cannot be empty. Please provide the account's primary or secondary key.")]
    EmptyMasterKey,

    /// Endpoint URL is invalid.
    #[error("Invalid endpoint URL '{url}'. Expected format: 'https://<account>.documents.azure.com:443/'.")]
    InvalidEndpoint {
        /// The invalid URL that was provided.
        url: String,
    },

    /// API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: 'YYYY-MM-DD' (e.g., '2018-12-31').")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// Backoff window bounds are inverted or empty.
    #[error("Invalid backoff window [{min_ms}, {max_ms}) ms. The lower bound must be below the upper bound.")]
    InvalidBackoffWindow {
        /// Inclusive lower bound in milliseconds.
        min_ms: u64,
        /// Exclusive upper bound in milliseconds.
        max_ms: u64,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}
