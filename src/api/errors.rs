//! Error types for resource operations.
//!
//! - [`ApiError::NotFound`]: A lookup by id matched nothing
//! - [`ApiError::MissingId`]: An update was given a document without an id
//! - [`ApiError::Http`]: Wrapped [`HttpError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use documentdb::api::ApiError;
//!
//! match client.db("mydb").await {
//!     Ok(db) => println!("Found: {}", db.database().resource.self_link()),
//!     Err(ApiError::NotFound { resource, id }) => println!("{resource} {id} does not exist"),
//!     Err(e) => println!("Other error: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::clients::HttpError;

/// Error type for resource operations.
///
/// # Example
///
/// ```rust
/// use documentdb::api::ApiError;
///
/// let error = ApiError::NotFound {
///     resource: "Database",
///     id: "mydb".to_string(),
/// };
/// assert_eq!(error.to_string(), "Database with id mydb not found");
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// A lookup by id returned no results.
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// The type name of the resource (e.g., "Database", "Document").
        resource: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// The document passed to an update has no id.
    #[error("Document does not have an id")]
    MissingId,

    /// An HTTP-level error occurred.
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl ApiError {
    /// Returns `true` if the service reported that the id already exists.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_conflict())
    }

    /// Returns `true` for a lookup miss or a 404 from the service.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Http(HttpError::Request(e)) => e.is_not_found(),
            _ => false,
        }
    }
}

/// Returns `true` if `error` means the resource already exists.
#[must_use]
pub fn is_exists(error: &ApiError) -> bool {
    error.is_conflict()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::RequestError;

    fn conflict() -> ApiError {
        HttpError::Request(RequestError::from_body(
            409,
            br#"{"code":"Conflict","message":"Entity with the specified id already exists in the system."}"#,
            None,
        ))
        .into()
    }

    #[test]
    fn test_is_exists_for_conflict() {
        assert!(is_exists(&conflict()));
        assert!(conflict().is_conflict());
    }

    #[test]
    fn test_is_exists_false_for_other_errors() {
        assert!(!is_exists(&ApiError::MissingId));
        assert!(!is_exists(&ApiError::Http(HttpError::PreconditionFailed)));
        let bad_request: ApiError = HttpError::Request(RequestError::from_body(
            400,
            br#"{"code":"BadRequest","message":"nope"}"#,
            None,
        ))
        .into();
        assert!(!is_exists(&bad_request));
    }

    #[test]
    fn test_not_found_detection() {
        let lookup_miss = ApiError::NotFound {
            resource: "Document",
            id: "x".to_string(),
        };
        assert!(lookup_miss.is_not_found());

        let http_404: ApiError =
            HttpError::Request(RequestError::from_body(404, b"{}", None)).into();
        assert!(http_404.is_not_found());
        assert!(!conflict().is_not_found());
    }

    #[test]
    fn test_http_error_is_transparent() {
        let error = ApiError::Http(HttpError::Cancelled);
        assert_eq!(error.to_string(), HttpError::Cancelled.to_string());
    }
}
