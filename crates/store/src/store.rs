use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::Result;

/// A record type the store knows how to persist.
///
/// Documents are serialized to JSON for storage, so the wire shape of the
/// type is also its persisted shape.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name of the collection the documents live in.
    const COLLECTION: &'static str;

    /// The document's unique id.
    fn id(&self) -> Uuid;
}

/// Subset-equality filter over a document's serialized fields.
///
/// A document matches when every field named in the filter is present with
/// an equal value. The empty filter matches everything.
#[derive(Debug, Clone)]
pub struct Filter(Value);

impl Filter {
    /// A filter matching every document in the collection.
    pub fn all() -> Self {
        Self(Value::Object(serde_json::Map::new()))
    }

    /// A filter matching documents whose `field` equals `value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert(field.into(), value.into());
        Self(Value::Object(fields))
    }

    /// Tests the filter against a serialized document.
    pub fn matches(&self, document: &Value) -> bool {
        match &self.0 {
            Value::Object(fields) => fields.iter().all(|(k, v)| document.get(k) == Some(v)),
            _ => false,
        }
    }

    /// The filter as a JSON value (JSONB containment operand on Postgres).
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::all()
    }
}

/// A transaction handle owned by a single store interaction.
///
/// Every session ends in exactly one of commit, abort, or drop; dropping
/// without committing discards the staged writes.
#[async_trait]
pub trait Session: Send {
    /// Commits the session's writes.
    async fn commit(self) -> Result<()>;

    /// Aborts the session, discarding its writes.
    async fn abort(self) -> Result<()>;
}

/// Core trait for document store implementations.
///
/// Writes go through a [`Session`]; reads see committed documents only.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait DocumentStore<T: Document>: Send + Sync {
    type Session: Session + Send;

    /// Begins a new transaction.
    async fn begin(&self) -> Result<Self::Session>;

    /// Inserts a document inside the given transaction.
    ///
    /// The write is invisible to readers until the session commits.
    async fn insert(&self, document: &T, session: &mut Self::Session) -> Result<()>;

    /// Returns the first committed document matching the filter.
    async fn find_one(&self, filter: &Filter) -> Result<Option<T>>;

    /// Returns all committed documents matching the filter, in insertion
    /// order. An empty store yields an empty list, not an error.
    async fn find_many(&self, filter: &Filter) -> Result<Vec<T>>;
}
