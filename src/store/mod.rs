#[cfg(feature = "mongodb-store")]
pub(crate) mod mongo;

#[cfg(feature = "mongodb-store")]
pub use self::mongo::MongoStore;

use std::fmt::Debug;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::BoxFuture;

/// Where a document goes: connection string, database and collection.
#[derive(Debug, Clone, Copy)]
pub struct StoreTarget<'a> {
    pub url: &'a str,
    pub database: &'a str,
    pub collection: &'a str,
}

/// Outcome of a successful insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOneResult {
    /// Id generated by the store, rendered as text.
    pub inserted_id: String,
}

/// A schema-flexible document database.
///
/// This trait is object-safe and uses boxed futures for async support.
/// The default implementation talks to MongoDB (enabled via the
/// `mongodb-store` feature).
///
/// Implementations acquire whatever connection they need inside
/// `insert_one` and release it before the future completes, on success and
/// on error alike.
///
/// # Example
///
/// ```rust,no_run
/// use neighborly::store::{DocumentStore, InsertOneResult, StoreTarget};
/// use neighborly::BoxFuture;
///
/// #[derive(Debug)]
/// struct NullStore;
///
/// impl DocumentStore for NullStore {
///     fn insert_one<'a>(
///         &'a self,
///         _target: StoreTarget<'a>,
///         _document: serde_json::Map<String, serde_json::Value>,
///     ) -> BoxFuture<'a, neighborly::Result<InsertOneResult>> {
///         Box::pin(async move {
///             Ok(InsertOneResult { inserted_id: "0".into() })
///         })
///     }
/// }
/// ```
pub trait DocumentStore: Send + Sync + Debug {
    /// Insert a single document and return its generated id.
    fn insert_one<'a>(
        &'a self,
        target: StoreTarget<'a>,
        document: Map<String, Value>,
    ) -> BoxFuture<'a, crate::Result<InsertOneResult>>;
}

/// A cloneable, type-erased store handle.
pub type DynStore = Arc<dyn DocumentStore>;
