//! Master-key request signing.
//!
//! Every request carries an `authorization` header computed as an
//! HMAC-SHA256 over the verb, resource type, resource id and date, keyed by
//! the base64-decoded account master key:
//!
//! ```text
//! {verb}\n{resourceType}\n{resourceId}\n{date}\n\n
//! ```
//!
//! Verb, resource type and date are lower-cased; the resource id is used as
//! it appears in the link. The base64 signature is wrapped as
//! `type=master&ver=1.0&sig=<signature>` and url-encoded.
//!
//! # Example
//!
//! ```rust
//! use documentdb::auth::signature::authorization_token;
//! use documentdb::MasterKey;
//!
//! let key = MasterKey::new("c2VjcmV0").unwrap();
//! let token = authorization_token(
//!     "GET",
//!     "dbs",
//!     "",
//!     "Thu, 27 Apr 2017 00:51:12 GMT",
//!     &key,
//! )
//! .unwrap();
//! assert!(token.starts_with("type%3Dmaster%26ver%3D1.0%26sig%3D"));
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::config::MasterKey;

type HmacSha256 = Hmac<Sha256>;

/// Token type for master-key authorization.
pub const TOKEN_TYPE: &str = "master";

/// Token version for master-key authorization.
pub const TOKEN_VERSION: &str = "1.0";

/// Errors raised while signing a request.
///
/// Signing happens before anything is sent, so these errors never involve
/// the network.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The master key does not decode into HMAC key bytes.
    #[error("Master key is not a valid base64 HMAC key: {reason}")]
    MalformedMasterKey {
        /// Decoder message describing the first invalid input.
        reason: String,
    },
}

/// Builds the string the service expects to be signed.
#[must_use]
pub fn string_to_sign(verb: &str, resource_type: &str, resource_id: &str, date: &str) -> String {
    format!(
        "{}\n{}\n{}\n{}\n\n",
        verb.to_lowercase(),
        resource_type.to_lowercase(),
        resource_id,
        date.to_lowercase()
    )
}

/// Computes the base64 HMAC-SHA256 signature of `payload`.
///
/// # Errors
///
/// Returns [`AuthError::MalformedMasterKey`] if the key does not decode.
pub fn compute_signature(payload: &str, key: &MasterKey) -> Result<String, AuthError> {
    let decoded = STANDARD
        .decode(key.as_ref())
        .map_err(|e| AuthError::MalformedMasterKey {
            reason: e.to_string(),
        })?;
    let mut mac =
        HmacSha256::new_from_slice(&decoded).map_err(|e| AuthError::MalformedMasterKey {
            reason: e.to_string(),
        })?;
    mac.update(payload.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Computes the url-encoded value of the `authorization` header.
///
/// # Errors
///
/// Returns [`AuthError`] if the master key cannot be decoded.
pub fn authorization_token(
    verb: &str,
    resource_type: &str,
    resource_id: &str,
    date: &str,
    key: &MasterKey,
) -> Result<String, AuthError> {
    let payload = string_to_sign(verb, resource_type, resource_id, date);
    let signature = compute_signature(&payload, key)?;
    let token = format!("type={TOKEN_TYPE}&ver={TOKEN_VERSION}&sig={signature}");
    Ok(urlencoding::encode(&token).into_owned())
}
