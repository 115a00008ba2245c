//! Parameterized SQL queries.
//!
//! A [`Query`] is sent as the JSON body of a POST against a feed link:
//!
//! ```json
//! {"query": "SELECT * FROM root r WHERE r.id = @id",
//!  "parameters": [{"name": "@id", "value": "foo"}]}
//! ```
//!
//! `parameters` is omitted when there are none. The continuation token is
//! never part of the body; it travels in the `x-ms-continuation` header.
//!
//! # Example
//!
//! ```rust
//! use documentdb::Query;
//! use serde_json::json;
//!
//! let query = Query::new(
//!     "SELECT * FROM root r WHERE r.id = @id",
//!     [("@id", json!("foo"))],
//! );
//!
//! assert_eq!(
//!     serde_json::to_value(&query).unwrap(),
//!     json!({
//!         "query": "SELECT * FROM root r WHERE r.id = @id",
//!         "parameters": [{"name": "@id", "value": "foo"}]
//!     })
//! );
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named query parameter.
///
/// `name` is the `@`-prefixed placeholder used in the query text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryParam {
    /// Placeholder name, including the leading `@`.
    pub name: String,
    /// Bound value.
    pub value: Value,
}

/// A SQL query with ordered parameters and an optional continuation token.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Query text.
    #[serde(rename = "query")]
    pub text: String,
    /// Parameters in the order they were supplied.
    #[serde(
        rename = "parameters",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub params: Vec<QueryParam>,
    /// Continuation token of the page to fetch.
    #[serde(skip)]
    pub continuation: Option<String>,
}

impl Query {
    /// Creates a query from its text and parameters.
    ///
    /// Parameters keep the iteration order of `params`; an empty iterator
    /// yields an empty parameter list.
    pub fn new<N, V>(text: impl Into<String>, params: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
    {
        Self {
            text: text.into(),
            params: params
                .into_iter()
                .map(|(name, value)| QueryParam {
                    name: name.into(),
                    value: value.into(),
                })
                .collect(),
            continuation: None,
        }
    }

    /// Creates a query with no parameters.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Creates the lookup-by-id query used by the resource helpers.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new(
            "SELECT * FROM ROOT r WHERE r.id = @id",
            [("@id", Value::String(id.into()))],
        )
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.push(QueryParam {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Sets the continuation token of the page to fetch.
    #[must_use]
    pub fn continuation(mut self, token: impl Into<String>) -> Self {
        self.continuation = Some(token.into());
        self
    }

    /// Returns `true` if there is query text to send as a body.
    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}
