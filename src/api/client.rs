//! The flat resource API.
//!
//! Every operation takes the self link of the resource (or of its parent
//! for feeds) as returned by the service. Feed links are composed from
//! parent self links with the helpers in [`crate::link`].

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::api::errors::ApiError;
use crate::clients::{
    CallContext, CallOptions, HttpError, RestClient, HEADER_IF_MATCH, HEADER_UPSERT,
};
use crate::config::DocumentDbConfig;
use crate::link::{
    collections_feed, documents_feed, stored_procedures_feed, user_defined_functions_feed,
    DATABASES_FEED,
};
use crate::models::{
    Collection, Database, Document, Feed, HasId, Page, StoredProcedure, UserDefinedFunction,
};
use crate::query::Query;

/// Client for databases, collections, documents, stored procedures and
/// user-defined functions.
///
/// Cloning is cheap: clones share one [`RestClient`] and its connection
/// pool.
///
/// # Example
///
/// ```rust,ignore
/// use documentdb::{DocumentDb, DocumentDbConfig, Endpoint, MasterKey, Query};
/// use documentdb::models::Document;
///
/// let config = DocumentDbConfig::builder()
///     .endpoint(Endpoint::new("https://acct.documents.azure.com:443/")?)
///     .master_key(MasterKey::new(std::env::var("DOCUMENTDB_KEY")?)?)
///     .build()?;
/// let client = DocumentDb::new(&config)?;
///
/// let page = client
///     .query_documents::<Document>(coll.resource.self_link(), &Query::by_id("foo"))
///     .await?;
/// ```
#[derive(Clone, Debug)]
pub struct DocumentDb {
    rest: Arc<RestClient>,
    options: CallOptions,
}

// Verify DocumentDb is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DocumentDb>();
};

fn if_match(etag: &str) -> Option<HashMap<String, String>> {
    (!etag.is_empty()).then(|| HashMap::from([(HEADER_IF_MATCH.to_string(), etag.to_string())]))
}

fn ensure_id<T: HasId>(doc: &mut T) {
    if doc.id().is_empty() {
        doc.set_id(uuid::Uuid::new_v4().to_string());
    }
}

impl DocumentDb {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Transport`] if the HTTP client cannot be created.
    pub fn new(config: &DocumentDbConfig) -> Result<Self, HttpError> {
        Ok(Self::from_rest(RestClient::new(config)?))
    }

    /// Creates a client over an existing [`RestClient`].
    #[must_use]
    pub fn from_rest(rest: RestClient) -> Self {
        Self {
            rest: Arc::new(rest),
            options: CallOptions::default(),
        }
    }

    /// Returns the underlying REST client.
    #[must_use]
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// Returns a client whose calls stop waiting out backoff delays once
    /// `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        let mut client = self.clone();
        client.options.cancellation = Some(token);
        client
    }

    /// Returns a client whose calls report `context` to the response hook.
    #[must_use]
    pub(crate) fn scoped(&self, context: CallContext) -> Self {
        let mut client = self.clone();
        client.options.context = context;
        client
    }

    pub(crate) const fn context(&self) -> &CallContext {
        &self.options.context
    }

    async fn read<T: DeserializeOwned>(&self, link: &str) -> Result<T, ApiError> {
        let decoded = self.rest.query(link, None, &self.options).await?;
        Ok(decoded.value)
    }

    async fn read_feed<T: DeserializeOwned>(
        &self,
        link: &str,
        query: Option<&Query>,
    ) -> Result<Page<T>, ApiError> {
        let decoded = self
            .rest
            .query::<Feed<T>>(link, query, &self.options)
            .await?;
        Ok(Page {
            items: decoded.value.items,
            continuation: decoded.continuation,
        })
    }

    async fn create<B, T>(
        &self,
        link: &str,
        body: &B,
        headers: Option<HashMap<String, String>>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        Ok(self.rest.create(link, body, headers, &self.options).await?)
    }

    async fn replace<B, T>(
        &self,
        link: &str,
        body: &B,
        headers: Option<HashMap<String, String>>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        Ok(self.rest.replace(link, body, headers, &self.options).await?)
    }

    async fn delete(
        &self,
        link: &str,
        headers: Option<HashMap<String, String>>,
    ) -> Result<(), ApiError> {
        Ok(self.rest.delete(link, headers, &self.options).await?)
    }

    // === Read ===

    /// Reads a database by self link.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn read_database(&self, link: &str) -> Result<Database, ApiError> {
        self.read(link).await
    }

    /// Reads a collection by self link.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn read_collection(&self, link: &str) -> Result<Collection, ApiError> {
        self.read(link).await
    }

    /// Reads a document by self link into any deserializable type.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn read_document<T: DeserializeOwned>(&self, link: &str) -> Result<T, ApiError> {
        self.read(link).await
    }

    /// Reads a stored procedure by self link.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn read_stored_procedure(&self, link: &str) -> Result<StoredProcedure, ApiError> {
        self.read(link).await
    }

    /// Reads a user-defined function by self link.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn read_user_defined_function(
        &self,
        link: &str,
    ) -> Result<UserDefinedFunction, ApiError> {
        self.read(link).await
    }

    // === Read all ===

    /// Lists all databases.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn read_databases(&self) -> Result<Vec<Database>, ApiError> {
        Ok(self.read_feed(DATABASES_FEED, None).await?.items)
    }

    /// Lists the collections of a database.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn read_collections(&self, db_link: &str) -> Result<Vec<Collection>, ApiError> {
        Ok(self.read_feed(&collections_feed(db_link), None).await?.items)
    }

    /// Lists the stored procedures of a collection.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn read_stored_procedures(
        &self,
        coll_link: &str,
    ) -> Result<Vec<StoredProcedure>, ApiError> {
        Ok(self
            .read_feed(&stored_procedures_feed(coll_link), None)
            .await?
            .items)
    }

    /// Lists the user-defined functions of a collection.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn read_user_defined_functions(
        &self,
        coll_link: &str,
    ) -> Result<Vec<UserDefinedFunction>, ApiError> {
        Ok(self
            .read_feed(&user_defined_functions_feed(coll_link), None)
            .await?
            .items)
    }

    /// Reads one page of the documents in a collection.
    ///
    /// Pass the previous page's continuation to fetch the next one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn read_documents<T: DeserializeOwned>(
        &self,
        coll_link: &str,
        continuation: Option<&str>,
    ) -> Result<Page<T>, ApiError> {
        let query = continuation.map(|token| Query::default().continuation(token));
        self.read_feed(&documents_feed(coll_link), query.as_ref())
            .await
    }

    // === Query ===

    /// Queries databases.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn query_databases(&self, query: &Query) -> Result<Vec<Database>, ApiError> {
        Ok(self.read_feed(DATABASES_FEED, Some(query)).await?.items)
    }

    /// Queries the collections of a database.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn query_collections(
        &self,
        db_link: &str,
        query: &Query,
    ) -> Result<Vec<Collection>, ApiError> {
        Ok(self
            .read_feed(&collections_feed(db_link), Some(query))
            .await?
            .items)
    }

    /// Queries the stored procedures of a collection.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn query_stored_procedures(
        &self,
        coll_link: &str,
        query: &Query,
    ) -> Result<Vec<StoredProcedure>, ApiError> {
        Ok(self
            .read_feed(&stored_procedures_feed(coll_link), Some(query))
            .await?
            .items)
    }

    /// Queries the user-defined functions of a collection.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn query_user_defined_functions(
        &self,
        coll_link: &str,
        query: &Query,
    ) -> Result<Vec<UserDefinedFunction>, ApiError> {
        Ok(self
            .read_feed(&user_defined_functions_feed(coll_link), Some(query))
            .await?
            .items)
    }

    /// Queries the documents of a collection, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn query_documents<T: DeserializeOwned>(
        &self,
        coll_link: &str,
        query: &Query,
    ) -> Result<Page<T>, ApiError> {
        self.read_feed(&documents_feed(coll_link), Some(query))
            .await
    }

    // === Create ===

    /// Creates a database.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails; a duplicate id
    /// satisfies [`ApiError::is_conflict`].
    pub async fn create_database<B: Serialize + ?Sized>(
        &self,
        body: &B,
    ) -> Result<Database, ApiError> {
        self.create(DATABASES_FEED, body, None).await
    }

    /// Creates a collection in a database.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn create_collection<B: Serialize + ?Sized>(
        &self,
        db_link: &str,
        body: &B,
    ) -> Result<Collection, ApiError> {
        self.create(&collections_feed(db_link), body, None).await
    }

    /// Creates a stored procedure in a collection.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn create_stored_procedure<B: Serialize + ?Sized>(
        &self,
        coll_link: &str,
        body: &B,
    ) -> Result<StoredProcedure, ApiError> {
        self.create(&stored_procedures_feed(coll_link), body, None)
            .await
    }

    /// Creates a user-defined function in a collection.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn create_user_defined_function<B: Serialize + ?Sized>(
        &self,
        coll_link: &str,
        body: &B,
    ) -> Result<UserDefinedFunction, ApiError> {
        self.create(&user_defined_functions_feed(coll_link), body, None)
            .await
    }

    /// Creates a document in a collection.
    ///
    /// A document with an empty id is given a random UUID first. On
    /// success `doc` is replaced by the server's copy, which carries the
    /// system properties.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn create_document<T>(&self, coll_link: &str, doc: &mut T) -> Result<(), ApiError>
    where
        T: Serialize + DeserializeOwned + HasId,
    {
        ensure_id(doc);
        *doc = self.create(&documents_feed(coll_link), &*doc, None).await?;
        Ok(())
    }

    /// Creates or replaces a document by id.
    ///
    /// A non-empty `etag` is sent as `If-Match`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails, including
    /// [`HttpError::PreconditionFailed`] for a stale etag.
    pub async fn upsert_document<T>(
        &self,
        coll_link: &str,
        doc: &mut T,
        etag: &str,
    ) -> Result<(), ApiError>
    where
        T: Serialize + DeserializeOwned + HasId,
    {
        ensure_id(doc);
        let mut headers = if_match(etag).unwrap_or_default();
        headers.insert(HEADER_UPSERT.to_string(), "true".to_string());
        *doc = self
            .create(&documents_feed(coll_link), &*doc, Some(headers))
            .await?;
        Ok(())
    }

    /// Replaces the document with the same id as `doc`.
    ///
    /// The document is looked up by id first. A non-empty `etag` is sent as
    /// `If-Match`. On success `doc` is replaced by the server's copy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingId`] if `doc` has no id,
    /// [`ApiError::NotFound`] if no document has that id, and
    /// [`ApiError::Http`] if a request fails.
    pub async fn update_document<T>(
        &self,
        coll_link: &str,
        doc: &mut T,
        etag: &str,
    ) -> Result<(), ApiError>
    where
        T: Serialize + DeserializeOwned + HasId,
    {
        let id = doc.id().to_string();
        if id.is_empty() {
            return Err(ApiError::MissingId);
        }

        let page = self
            .query_documents::<Document>(coll_link, &Query::by_id(id.as_str()))
            .await?;
        let existing = page.items.into_iter().next().ok_or(ApiError::NotFound {
            resource: "Document",
            id,
        })?;

        *doc = self
            .replace(existing.resource.self_link(), &*doc, if_match(etag))
            .await?;
        Ok(())
    }

    // === Delete ===

    /// Deletes a database.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn delete_database(&self, link: &str) -> Result<(), ApiError> {
        self.delete(link, None).await
    }

    /// Deletes a collection.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn delete_collection(&self, link: &str) -> Result<(), ApiError> {
        self.delete(link, None).await
    }

    /// Deletes a document. A non-empty `etag` is sent as `If-Match`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn delete_document(&self, link: &str, etag: &str) -> Result<(), ApiError> {
        self.delete(link, if_match(etag)).await
    }

    /// Deletes a stored procedure.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn delete_stored_procedure(&self, link: &str) -> Result<(), ApiError> {
        self.delete(link, None).await
    }

    /// Deletes a user-defined function.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn delete_user_defined_function(&self, link: &str) -> Result<(), ApiError> {
        self.delete(link, None).await
    }

    // === Replace ===

    /// Replaces a database.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn replace_database<B: Serialize + ?Sized>(
        &self,
        link: &str,
        body: &B,
    ) -> Result<Database, ApiError> {
        self.replace(link, body, None).await
    }

    /// Replaces a document, sending any extra headers (such as `If-Match`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn replace_document<B, T>(
        &self,
        link: &str,
        doc: &B,
        headers: Option<HashMap<String, String>>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.replace(link, doc, headers).await
    }

    /// Replaces a stored procedure.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn replace_stored_procedure<B: Serialize + ?Sized>(
        &self,
        link: &str,
        body: &B,
    ) -> Result<StoredProcedure, ApiError> {
        self.replace(link, body, None).await
    }

    /// Replaces a user-defined function.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn replace_user_defined_function<B: Serialize + ?Sized>(
        &self,
        link: &str,
        body: &B,
    ) -> Result<UserDefinedFunction, ApiError> {
        self.replace(link, body, None).await
    }

    // === Execute ===

    /// Executes a stored procedure with `params` as its argument array.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails or the result does
    /// not decode into `T`.
    pub async fn execute_stored_procedure<P, T>(&self, link: &str, params: &P) -> Result<T, ApiError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        Ok(self.rest.execute(link, params, &self.options).await?)
    }
}
