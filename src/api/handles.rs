//! Hierarchical handles: a [`Db`] yields [`Col`]s, a [`Col`] yields
//! [`Proc`]s.
//!
//! Each handle holds the resource it was resolved from, so child
//! operations use the server-issued self links directly. Calls made
//! through a [`Col`] report the collection id to the response hook, and
//! calls through a [`Proc`] additionally report the procedure id.
//!
//! # Example
//!
//! ```rust,ignore
//! use documentdb::Query;
//! use serde_json::json;
//!
//! let db = client.create_db_if_not_exists("shop").await?;
//! let orders = db.create_collection_if_not_exists("orders", None).await?;
//!
//! let mut order = json!({"total": 42});
//! orders.create_document(&mut order).await?;
//!
//! let bulk = orders.proc("bulkImport").await?;
//! let imported: u32 = bulk.execute(&[json!([order])]).await?;
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::client::DocumentDb;
use crate::api::errors::ApiError;
use crate::clients::CallContext;
use crate::models::{Collection, Database, HasId, Page, StoredProcedure};
use crate::query::Query;

impl DocumentDb {
    /// Creates a database and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails; a duplicate id
    /// satisfies [`ApiError::is_conflict`].
    pub async fn create_db(&self, id: &str) -> Result<Db, ApiError> {
        let database = self.create_database(&Database::with_id(id)).await?;
        Ok(Db::new(self.clone(), database))
    }

    /// Wraps a database that was already read.
    #[must_use]
    pub fn database_handle(&self, database: Database) -> Db {
        Db::new(self.clone(), database)
    }

    /// Wraps a collection that was already read.
    #[must_use]
    pub fn collection_handle(&self, collection: Collection) -> Col {
        Col::new(self, collection)
    }

    /// Looks up a database by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if no database has that id.
    pub async fn db(&self, id: &str) -> Result<Db, ApiError> {
        let database = self
            .query_databases(&Query::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound {
                resource: "Database",
                id: id.to_string(),
            })?;
        Ok(Db::new(self.clone(), database))
    }

    /// Returns the database with this id, creating it if needed.
    ///
    /// Losing a creation race to another client is not an error: the
    /// database is looked up again.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if a request fails.
    pub async fn create_db_if_not_exists(&self, id: &str) -> Result<Db, ApiError> {
        match self.db(id).await {
            Err(ApiError::NotFound { .. }) => {}
            other => return other,
        }
        match self.create_db(id).await {
            Err(e) if e.is_conflict() => self.db(id).await,
            other => other,
        }
    }
}

/// A resolved database.
#[derive(Clone, Debug)]
pub struct Db {
    client: DocumentDb,
    database: Database,
}

impl Db {
    const fn new(client: DocumentDb, database: Database) -> Self {
        Self { client, database }
    }

    /// Returns the database resource.
    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.database
    }

    /// Deletes the database.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn delete(&self) -> Result<(), ApiError> {
        self.client
            .delete_database(self.database.resource.self_link())
            .await
    }

    /// Creates a collection and returns its handle.
    ///
    /// `template` supplies settings such as the indexing policy; its id is
    /// overwritten with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails; a duplicate id
    /// satisfies [`ApiError::is_conflict`].
    pub async fn create_collection(
        &self,
        id: &str,
        template: Option<Collection>,
    ) -> Result<Col, ApiError> {
        let mut body = template.unwrap_or_default();
        body.set_id(id.to_string());
        let collection = self
            .client
            .create_collection(self.database.resource.self_link(), &body)
            .await?;
        Ok(Col::new(&self.client, collection))
    }

    /// Looks up a collection by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if no collection has that id.
    pub async fn collection(&self, id: &str) -> Result<Col, ApiError> {
        let collection = self
            .client
            .query_collections(self.database.resource.self_link(), &Query::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound {
                resource: "Collection",
                id: id.to_string(),
            })?;
        Ok(Col::new(&self.client, collection))
    }

    /// Returns the collection with this id, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if a request fails.
    pub async fn create_collection_if_not_exists(
        &self,
        id: &str,
        template: Option<Collection>,
    ) -> Result<Col, ApiError> {
        match self.collection(id).await {
            Err(ApiError::NotFound { .. }) => {}
            other => return other,
        }
        match self.create_collection(id, template).await {
            Err(e) if e.is_conflict() => self.collection(id).await,
            other => other,
        }
    }
}

/// A resolved collection.
#[derive(Clone, Debug)]
pub struct Col {
    client: DocumentDb,
    collection: Collection,
}

impl Col {
    fn new(client: &DocumentDb, collection: Collection) -> Self {
        Self {
            client: client.scoped(CallContext::for_collection(collection.id())),
            collection,
        }
    }

    /// Returns the collection resource.
    #[must_use]
    pub const fn collection(&self) -> &Collection {
        &self.collection
    }

    fn link(&self) -> &str {
        self.collection.resource.self_link()
    }

    /// Deletes the collection.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn delete(&self) -> Result<(), ApiError> {
        self.client.delete_collection(self.link()).await
    }

    /// Queries documents, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn query_documents<T: DeserializeOwned>(
        &self,
        query: &Query,
    ) -> Result<Page<T>, ApiError> {
        self.client.query_documents(self.link(), query).await
    }

    /// Creates a document, generating an id when it has none.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn create_document<T>(&self, doc: &mut T) -> Result<(), ApiError>
    where
        T: Serialize + DeserializeOwned + HasId,
    {
        self.client.create_document(self.link(), doc).await
    }

    /// Replaces the document with the same id.
    ///
    /// # Errors
    ///
    /// See [`DocumentDb::update_document`].
    pub async fn update_document<T>(&self, doc: &mut T, etag: &str) -> Result<(), ApiError>
    where
        T: Serialize + DeserializeOwned + HasId,
    {
        self.client.update_document(self.link(), doc, etag).await
    }

    /// Creates or replaces a document by id.
    ///
    /// # Errors
    ///
    /// See [`DocumentDb::upsert_document`].
    pub async fn upsert_document<T>(&self, doc: &mut T, etag: &str) -> Result<(), ApiError>
    where
        T: Serialize + DeserializeOwned + HasId,
    {
        self.client.upsert_document(self.link(), doc, etag).await
    }

    /// Deletes a document by self link.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn delete_document_by_link(&self, link: &str, etag: &str) -> Result<(), ApiError> {
        self.client.delete_document(link, etag).await
    }

    /// Creates a stored procedure and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails.
    pub async fn create_proc(&self, id: &str, body: &str) -> Result<Proc, ApiError> {
        let procedure = self
            .client
            .create_stored_procedure(self.link(), &StoredProcedure::new(id, body))
            .await?;
        Ok(Proc::new(&self.client, procedure))
    }

    /// Looks up a stored procedure by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if no stored procedure has that id.
    pub async fn proc(&self, id: &str) -> Result<Proc, ApiError> {
        let procedure = self
            .client
            .query_stored_procedures(self.link(), &Query::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound {
                resource: "StoredProcedure",
                id: id.to_string(),
            })?;
        Ok(Proc::new(&self.client, procedure))
    }
}

/// A resolved stored procedure.
#[derive(Clone, Debug)]
pub struct Proc {
    client: DocumentDb,
    procedure: StoredProcedure,
}

impl Proc {
    fn new(client: &DocumentDb, procedure: StoredProcedure) -> Self {
        let context = client.context().clone().with_procedure(procedure.id());
        Self {
            client: client.scoped(context),
            procedure,
        }
    }

    /// Returns the stored procedure resource.
    #[must_use]
    pub const fn procedure(&self) -> &StoredProcedure {
        &self.procedure
    }

    /// Executes the procedure. An empty `args` sends `[]`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the request fails or the result does
    /// not decode into `T`.
    pub async fn execute<T: DeserializeOwned>(&self, args: &[Value]) -> Result<T, ApiError> {
        self.client
            .execute_stored_procedure(self.procedure.resource.self_link(), args)
            .await
    }
}
