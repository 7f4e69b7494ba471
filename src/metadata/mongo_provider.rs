//! MongoDB document store.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tracing::debug;

use super::provider::{CatalogError, CatalogResult, DocumentStore};
use super::{doc, Document};
use crate::config::redact;

/// Document store backed by one MongoDB client.
///
/// The client is created per discovery and shut down by [`DocumentStore::close`].
pub struct MongoDocumentStore {
    client: Client,
    db: Database,
}

impl MongoDocumentStore {
    /// Connect to `uri` and verify the server answers a ping on `database`.
    pub async fn connect(uri: &str, database: &str) -> CatalogResult<Self> {
        let options = ClientOptions::parse(uri)
            .await
            .map_err(|e| CatalogError::InvalidUri(e.to_string()))?;

        debug!(uri = %redact(uri), database, "connecting to mongodb");
        let client =
            Client::with_options(options).map_err(|e| CatalogError::ConnectionFailed(e.to_string()))?;
        let db = client.database(database);

        if let Err(e) = db.run_command(doc! { "ping": 1 }).await {
            drop(db);
            client.shutdown().await;
            return Err(CatalogError::ConnectionFailed(e.to_string()));
        }

        Ok(Self { client, db })
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    fn database(&self) -> &str {
        self.db.name()
    }

    async fn list_collections(&self) -> CatalogResult<Vec<String>> {
        Ok(self.db.list_collection_names().await?)
    }

    async fn sample_documents(
        &self,
        collection: &str,
        limit: usize,
    ) -> CatalogResult<Vec<Document>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let cursor = self
            .db
            .collection::<Document>(collection)
            .find(doc! {})
            .limit(limit)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}
