//! Resource links and the resource hierarchy.
//!
//! Every resource is addressed by a relative link made of alternating
//! `type/id` segments: `dbs/{db}/colls/{coll}/docs/{doc}`. A link with an
//! odd number of segments addresses a feed (`dbs/{db}/colls/`), an even
//! number addresses a single resource (`dbs/{db}/colls/{coll}/`).
//!
//! The signing scheme needs the resource type and id a request acts on:
//!
//! | Link | Type | Id |
//! |---|---|---|
//! | `dbs` | `dbs` | (empty) |
//! | `dbs/abc/` | `dbs` | `abc` |
//! | `dbs/abc/colls/` | `colls` | `abc` |
//! | `dbs/abc/colls/def/docs/ghi/` | `docs` | `ghi` |
//!
//! Self links returned by the server end with `/`, so child feeds are
//! composed by plain concatenation (`{self}colls/`).
//!
//! # Example
//!
//! ```rust
//! use documentdb::link::{ResourceLink, ResourceType};
//!
//! let link = ResourceLink::parse("dbs/abc/colls/");
//! assert_eq!(link.resource_type(), &ResourceType::Collections);
//! assert_eq!(link.resource_id(), "abc");
//! ```

use std::fmt;

/// Link of the database feed.
pub const DATABASES_FEED: &str = "dbs";

/// The kind of resource a link addresses.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// Databases (`dbs`).
    Databases,
    /// Collections (`colls`).
    Collections,
    /// Documents (`docs`).
    Documents,
    /// Stored procedures (`sprocs`).
    StoredProcedures,
    /// User-defined functions (`udfs`).
    UserDefinedFunctions,
    /// Any other segment (`users`, `triggers`, `attachments`, ...), signed verbatim.
    Other(String),
}

impl ResourceType {
    /// Maps a path segment to a resource type.
    #[must_use]
    pub fn from_segment(segment: &str) -> Self {
        match segment {
            "dbs" => Self::Databases,
            "colls" => Self::Collections,
            "docs" => Self::Documents,
            "sprocs" => Self::StoredProcedures,
            "udfs" => Self::UserDefinedFunctions,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the path segment (and signing name) of this type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Databases => "dbs",
            Self::Collections => "colls",
            Self::Documents => "docs",
            Self::StoredProcedures => "sprocs",
            Self::UserDefinedFunctions => "udfs",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed resource link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceLink {
    link: String,
    resource_type: ResourceType,
    resource_id: String,
}

impl ResourceLink {
    /// Parses a relative link.
    ///
    /// Leading and trailing slashes are ignored for parsing; the link is
    /// otherwise kept as given.
    #[must_use]
    pub fn parse(link: impl Into<String>) -> Self {
        let link = link.into();
        let segments: Vec<&str> = link
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let n = segments.len();
        let (resource_type, resource_id) = if n == 0 {
            (ResourceType::Other(String::new()), String::new())
        } else if n % 2 == 0 {
            (
                ResourceType::from_segment(segments[n - 2]),
                segments[n - 1].to_string(),
            )
        } else {
            let parent = if n >= 2 { segments[n - 2] } else { "" };
            (ResourceType::from_segment(segments[n - 1]), parent.to_string())
        };

        Self {
            link,
            resource_type,
            resource_id,
        }
    }

    /// Returns the link as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.link
    }

    /// Returns the resource type used for signing.
    #[must_use]
    pub const fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    /// Returns the resource id used for signing.
    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Returns `true` if the link addresses a feed rather than a single resource.
    #[must_use]
    pub fn is_feed(&self) -> bool {
        self.link
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .count()
            % 2
            == 1
    }
}

impl fmt::Display for ResourceLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.link)
    }
}

fn child_feed(parent: &str, resource_type: &ResourceType) -> String {
    if parent.is_empty() || parent.ends_with('/') {
        format!("{parent}{resource_type}/")
    } else {
        format!("{parent}/{resource_type}/")
    }
}

/// Returns the collection feed of a database self link.
#[must_use]
pub fn collections_feed(database_link: &str) -> String {
    child_feed(database_link, &ResourceType::Collections)
}

/// Returns the document feed of a collection self link.
#[must_use]
pub fn documents_feed(collection_link: &str) -> String {
    child_feed(collection_link, &ResourceType::Documents)
}

/// Returns the stored procedure feed of a collection self link.
#[must_use]
pub fn stored_procedures_feed(collection_link: &str) -> String {
    child_feed(collection_link, &ResourceType::StoredProcedures)
}

/// Returns the user-defined function feed of a collection self link.
#[must_use]
pub fn user_defined_functions_feed(collection_link: &str) -> String {
    child_feed(collection_link, &ResourceType::UserDefinedFunctions)
}
