//! # DocumentDB Rust Client
//!
//! A Rust client for the Azure Cosmos DB (DocumentDB) SQL REST API,
//! providing type-safe configuration, master-key request signing, and an
//! async executor that retries throttled requests with exponential backoff.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`DocumentDbConfig`] and [`DocumentDbConfigBuilder`]
//! - Validated newtypes for the account endpoint and master key
//! - Master-key (HMAC-SHA256) signing of every request via [`auth`]
//! - An async executor that retries 429 and 503 responses with jittered
//!   exponential backoff, observing a cancellation token while it waits
//! - Parameterized SQL queries with continuation-token paging
//! - Resource models for databases, collections, documents, stored
//!   procedures and user-defined functions
//! - A flat API keyed by self links and hierarchical `Db` / `Col` / `Proc` handles
//!
//! ## Quick Start
//!
//! ```rust
//! use documentdb::{DocumentDbConfig, Endpoint, MasterKey, ApiVersion};
//!
//! let config = DocumentDbConfig::builder()
//!     .endpoint(Endpoint::new("https://acct.documents.azure.com:443/").unwrap())
//!     .master_key(MasterKey::new("c2VjcmV0LWtleQ==").unwrap())
//!     .api_version(ApiVersion::latest())
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Working With Resources
//!
//! ```rust,ignore
//! use documentdb::{DocumentDb, Query};
//! use serde_json::{json, Value};
//!
//! let client = DocumentDb::new(&config)?;
//!
//! let db = client.create_db_if_not_exists("shop").await?;
//! let orders = db.create_collection_if_not_exists("orders", None).await?;
//!
//! let mut order = json!({"customer": "c-1", "total": 42});
//! orders.create_document(&mut order).await?; // id generated, system fields filled in
//!
//! let query = Query::new(
//!     "SELECT * FROM root r WHERE r.customer = @customer",
//!     [("@customer", "c-1")],
//! );
//! let mut page = orders.query_documents::<Value>(&query).await?;
//! while let Some(token) = page.continuation.take() {
//!     page = orders.query_documents(&query.clone().continuation(token)).await?;
//! }
//! ```
//!
//! ## Throttling and Cancellation
//!
//! Throttled (429) and unavailable (503) responses are retried up to
//! [`DocumentDbConfig::max_retries`] times. Attach a
//! [`CancellationToken`](tokio_util::sync::CancellationToken) to bound the
//! time spent waiting:
//!
//! ```rust,ignore
//! use tokio_util::sync::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let client = client.with_cancellation(token.clone());
//! // token.cancel() from elsewhere ends any backoff wait with HttpError::Cancelled
//! ```
//!
//! ## Observing Responses
//!
//! A [`clients::ResponseHook`] sees the status and headers of every
//! attempt, including retried ones, together with the query, collection and
//! stored procedure the call was made for:
//!
//! ```rust
//! use documentdb::{DocumentDbConfig, Endpoint, MasterKey};
//! use documentdb::clients::ResponseEvent;
//!
//! let config = DocumentDbConfig::builder()
//!     .endpoint(Endpoint::new("https://acct.documents.azure.com").unwrap())
//!     .master_key(MasterKey::new("c2VjcmV0").unwrap())
//!     .response_hook(|event: &ResponseEvent<'_>| {
//!         if let Some(charge) = event.request_charge() {
//!             println!("{} {}: {charge} RU", event.method, event.link);
//!         }
//!     })
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Thread Safety
//!
//! All public types are `Send + Sync` where appropriate, making them safe
//! to use across async tasks and threads.

pub mod api;
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod link;
pub mod models;
pub mod query;

// Re-export public types at crate root for convenience
pub use config::{ApiVersion, DocumentDbConfig, DocumentDbConfigBuilder, Endpoint, MasterKey};
pub use error::ConfigError;

// Re-export client types
pub use api::{is_exists, ApiError, Col, Db, DocumentDb, Proc};
pub use clients::{
    BackoffPolicy, CallContext, HttpError, HttpMethod, RequestError, ResponseEvent, ResponseHook,
    RestClient,
};

// Re-export query and model types
pub use models::{HasId, Page};
pub use query::{Query, QueryParam};
