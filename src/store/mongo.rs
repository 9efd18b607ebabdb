use std::time::Duration;

use mongodb::bson::{Bson, Document};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::Client;
use serde_json::{Map, Value};

use super::{DocumentStore, InsertOneResult, StoreTarget};
use crate::errors::NeighborlyError;
use crate::BoxFuture;

const APP_NAME: &str = "neighborly-functions";

/// MongoDB-backed [`DocumentStore`].
///
/// A client is opened for every insert and shut down before the call
/// returns, whatever the outcome.
#[derive(Debug, Clone, Default)]
pub struct MongoStore {
    server_selection_timeout: Option<Duration>,
}

impl MongoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound how long the driver waits for a reachable server.
    pub fn server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.server_selection_timeout = Some(timeout);
        self
    }

    async fn connect(&self, url: &str) -> crate::Result<Client> {
        let mut options = ClientOptions::parse(url)
            .await
            .map_err(|e| NeighborlyError::StoreConnection(e.to_string()))?;

        if let Some(timeout) = self.server_selection_timeout {
            options.server_selection_timeout = Some(timeout);
        }
        if options.app_name.is_none() {
            options.app_name = Some(APP_NAME.to_string());
        }

        Client::with_options(options).map_err(|e| NeighborlyError::StoreConnection(e.to_string()))
    }
}

impl DocumentStore for MongoStore {
    fn insert_one<'a>(
        &'a self,
        target: StoreTarget<'a>,
        document: Map<String, Value>,
    ) -> BoxFuture<'a, crate::Result<InsertOneResult>> {
        Box::pin(async move {
            let document = mongodb::bson::to_document(&document)
                .map_err(|e| NeighborlyError::Serialization(e.to_string()))?;

            let client = self.connect(target.url).await?;
            let outcome = client
                .database(target.database)
                .collection::<Document>(target.collection)
                .insert_one(document)
                .await;
            client.shutdown().await;

            let result = outcome.map_err(classify)?;
            Ok(InsertOneResult {
                inserted_id: id_to_string(&result.inserted_id),
            })
        })
    }
}

fn classify(err: mongodb::error::Error) -> NeighborlyError {
    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. } | ErrorKind::DnsResolve { .. } | ErrorKind::Io(_) => {
            NeighborlyError::StoreConnection(err.to_string())
        }
        _ => NeighborlyError::from(err),
    }
}

fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn test_object_id_renders_as_hex() {
        let oid = ObjectId::new();
        assert_eq!(id_to_string(&Bson::ObjectId(oid)), oid.to_hex());
        assert_eq!(id_to_string(&Bson::ObjectId(oid)).len(), 24);
    }

    #[test]
    fn test_caller_supplied_ids_pass_through() {
        assert_eq!(id_to_string(&Bson::String("ad-7".into())), "ad-7");
        assert_eq!(id_to_string(&Bson::Int32(7)), "7");
    }

    #[tokio::test]
    async fn test_malformed_url_is_connection_error() {
        let store = MongoStore::new();
        let target = StoreTarget {
            url: "not-a-mongo-url",
            database: "neighborlydb",
            collection: "advertisements",
        };
        let err = store.insert_one(target, Map::new()).await.unwrap_err();
        assert!(matches!(err, NeighborlyError::StoreConnection(_)), "{err:?}");
    }
}
