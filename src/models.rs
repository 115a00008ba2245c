//! Resource models.
//!
//! All resources share the system properties in [`Resource`]. The
//! server-assigned ones (`_self`, `_etag`, `_rid`, `_ts`) are only ever
//! filled in by deserializing a server response, so a self link in hand
//! always came from the service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// System properties shared by every resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// User- or server-assigned id, unique within the parent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "_self", default, skip_serializing_if = "String::is_empty")]
    self_link: String,
    #[serde(rename = "_etag", default, skip_serializing_if = "String::is_empty")]
    etag: String,
    #[serde(rename = "_rid", default, skip_serializing_if = "String::is_empty")]
    rid: String,
    #[serde(rename = "_ts", default, skip_serializing_if = "is_zero")]
    ts: i64,
}

impl Resource {
    /// Creates an unsaved resource with the given id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Returns the self link, empty until the resource came back from the server.
    #[must_use]
    pub fn self_link(&self) -> &str {
        &self.self_link
    }

    /// Returns the etag used for optimistic concurrency.
    #[must_use]
    pub fn etag(&self) -> &str {
        &self.etag
    }

    /// Returns the server resource id.
    #[must_use]
    pub fn rid(&self) -> &str {
        &self.rid
    }

    /// Returns the last-modified timestamp (seconds since the Unix epoch).
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.ts
    }
}

/// A type that carries a resource id.
///
/// Documents passed to create or upsert get a fresh UUID when their id is
/// empty, so callers' own document types implement this to opt in.
///
/// # Example
///
/// ```rust
/// use documentdb::HasId;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User {
///     id: String,
///     email: String,
/// }
///
/// impl HasId for User {
///     fn id(&self) -> &str {
///         &self.id
///     }
///
///     fn set_id(&mut self, id: String) {
///         self.id = id;
///     }
/// }
/// ```
pub trait HasId {
    /// Returns the current id, empty when unset.
    fn id(&self) -> &str;

    /// Replaces the id.
    fn set_id(&mut self, id: String);
}

impl HasId for Resource {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// JSON objects read and write their `"id"` member; other values have no id.
impl HasId for Value {
    fn id(&self) -> &str {
        self.get("id").and_then(Value::as_str).unwrap_or_default()
    }

    fn set_id(&mut self, id: String) {
        if let Some(object) = self.as_object_mut() {
            object.insert("id".to_string(), Value::String(id));
        }
    }
}

/// Implements [`HasId`] for a model by delegating to its flattened [`Resource`].
macro_rules! impl_has_id {
    ($($model:ty),* $(,)?) => {
        $(
            impl HasId for $model {
                fn id(&self) -> &str {
                    &self.resource.id
                }

                fn set_id(&mut self, id: String) {
                    self.resource.id = id;
                }
            }
        )*
    };
}

/// A database.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    /// System properties.
    #[serde(flatten)]
    pub resource: Resource,
    /// Addressable path of the collections feed.
    #[serde(rename = "_colls", default, skip_serializing_if = "String::is_empty")]
    pub colls: String,
    /// Addressable path of the users feed.
    #[serde(rename = "_users", default, skip_serializing_if = "String::is_empty")]
    pub users: String,
}

impl Database {
    /// Creates an unsaved database with the given id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            resource: Resource::with_id(id),
            ..Self::default()
        }
    }
}

/// Indexing mode of a collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexingMode {
    /// Index updated synchronously with writes.
    Consistent,
    /// Index updated asynchronously.
    Lazy,
}

/// Data type an index applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexDataType {
    /// String values.
    String,
    /// Numeric values.
    Number,
    /// GeoJSON points.
    Point,
    /// GeoJSON polygons.
    Polygon,
    /// GeoJSON line strings.
    LineString,
}

/// Kind of index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexKind {
    /// Equality lookups.
    Hash,
    /// Range and order-by queries.
    Range,
    /// Geospatial queries.
    Spatial,
}

/// Maximum precision for hash and range indexes.
pub const MAX_PRECISION: i32 = -1;

/// An index on a path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    /// Data type indexed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<IndexDataType>,
    /// Index kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<IndexKind>,
    /// Precision in bytes, or [`MAX_PRECISION`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,
}

/// A path included in the index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludedPath {
    /// JSON path, e.g. `/*` or `/name/?`.
    pub path: String,
    /// Indexes applied to the path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
}

/// A path excluded from the index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedPath {
    /// JSON path.
    pub path: String,
}

/// Indexing policy of a collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingPolicy {
    /// Indexing mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexing_mode: Option<IndexingMode>,
    /// Whether documents are indexed automatically.
    #[serde(default)]
    pub automatic: bool,
    /// Included paths.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_paths: Vec<IncludedPath>,
    /// Excluded paths.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_paths: Vec<ExcludedPath>,
}

/// A document collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// System properties.
    #[serde(flatten)]
    pub resource: Resource,
    /// Indexing policy.
    #[serde(
        rename = "indexingPolicy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub indexing_policy: Option<IndexingPolicy>,
    /// Addressable path of the documents feed.
    #[serde(rename = "_docs", default, skip_serializing_if = "String::is_empty")]
    pub docs: String,
    /// Addressable path of the user-defined functions feed.
    #[serde(rename = "_udfs", default, skip_serializing_if = "String::is_empty")]
    pub udfs: String,
    /// Addressable path of the stored procedures feed.
    #[serde(rename = "_sprocs", default, skip_serializing_if = "String::is_empty")]
    pub sprocs: String,
    /// Addressable path of the triggers feed.
    #[serde(rename = "_triggers", default, skip_serializing_if = "String::is_empty")]
    pub triggers: String,
    /// Addressable path of the conflicts feed.
    #[serde(rename = "_conflicts", default, skip_serializing_if = "String::is_empty")]
    pub conflicts: String,
}

/// System view of a document.
///
/// Create and replace calls decode the server's echo into this type, which
/// carries the new self link and etag. Use your own type with
/// `#[serde(flatten)]` to read the document's content.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// System properties.
    #[serde(flatten)]
    pub resource: Resource,
    /// Addressable path of the attachments feed.
    #[serde(rename = "_attachments", default, skip_serializing_if = "String::is_empty")]
    pub attachments: String,
}

impl Document {
    /// Creates an unsaved document with the given id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            resource: Resource::with_id(id),
            ..Self::default()
        }
    }
}

/// A stored procedure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProcedure {
    /// System properties.
    #[serde(flatten)]
    pub resource: Resource,
    /// JavaScript source.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
}

impl StoredProcedure {
    /// Creates an unsaved stored procedure.
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            resource: Resource::with_id(id),
            body: body.into(),
        }
    }
}

/// A user-defined function.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDefinedFunction {
    /// System properties.
    #[serde(flatten)]
    pub resource: Resource,
    /// JavaScript source.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
}

impl UserDefinedFunction {
    /// Creates an unsaved user-defined function.
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            resource: Resource::with_id(id),
            body: body.into(),
        }
    }
}

impl_has_id!(Database, Collection, Document, StoredProcedure, UserDefinedFunction);

/// A list response.
///
/// The item array is keyed by resource type (`Databases`,
/// `DocumentCollections`, `Documents`, `StoredProcedures`,
/// `UserDefinedFunctions`); all of them decode into `items`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Feed<T> {
    /// Items on this page.
    #[serde(
        alias = "Databases",
        alias = "DocumentCollections",
        alias = "Documents",
        alias = "StoredProcedures",
        alias = "UserDefinedFunctions",
        default = "Vec::new"
    )]
    pub items: Vec<T>,
    /// Number of items reported by the server.
    #[serde(rename = "_count", default)]
    pub count: u64,
}

/// One page of a feed together with the token for the next page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Continuation token; `None` when this is the last page.
    pub continuation: Option<String>,
}

impl<T> Page<T> {
    /// Returns `true` if more pages can be fetched.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.continuation.is_some()
    }
}
