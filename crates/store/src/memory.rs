use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    store::{Document, DocumentStore, Filter, Session},
};

/// In-memory document store implementation for testing.
///
/// Provides the same transactional interface as the PostgreSQL
/// implementation: writes are staged on the session and only become
/// visible to readers on commit.
pub struct InMemoryStore<T: Document> {
    state: Arc<RwLock<StoreState<T>>>,
}

struct StoreState<T> {
    documents: Vec<T>,
    fail_on_insert: bool,
}

impl<T: Document> Clone for InMemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: Document> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState {
                documents: Vec::new(),
                fail_on_insert: false,
            })),
        }
    }
}

impl<T: Document> InMemoryStore<T> {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to reject the next inserts, simulating a
    /// write failure.
    pub async fn set_fail_on_insert(&self, fail: bool) {
        self.state.write().await.fail_on_insert = fail;
    }

    /// Returns the number of committed documents.
    pub async fn document_count(&self) -> usize {
        self.state.read().await.documents.len()
    }
}

/// Session over an [`InMemoryStore`]; staged writes live on the session.
pub struct InMemorySession<T: Document> {
    staged: Vec<T>,
    state: Arc<RwLock<StoreState<T>>>,
}

#[async_trait]
impl<T: Document> Session for InMemorySession<T> {
    async fn commit(mut self) -> Result<()> {
        let mut state = self.state.write().await;
        state.documents.append(&mut self.staged);
        Ok(())
    }

    async fn abort(mut self) -> Result<()> {
        self.staged.clear();
        Ok(())
    }
}

#[async_trait]
impl<T: Document> DocumentStore<T> for InMemoryStore<T> {
    type Session = InMemorySession<T>;

    async fn begin(&self) -> Result<Self::Session> {
        Ok(InMemorySession {
            staged: Vec::new(),
            state: self.state.clone(),
        })
    }

    async fn insert(&self, document: &T, session: &mut Self::Session) -> Result<()> {
        if self.state.read().await.fail_on_insert {
            return Err(StoreError::Rejected("write refused".to_string()));
        }
        session.staged.push(document.clone());
        Ok(())
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<T>> {
        let state = self.state.read().await;
        for document in &state.documents {
            if filter.matches(&serde_json::to_value(document)?) {
                return Ok(Some(document.clone()));
            }
        }
        Ok(None)
    }

    async fn find_many(&self, filter: &Filter) -> Result<Vec<T>> {
        let state = self.state.read().await;
        let mut matched = Vec::new();
        for document in &state.documents {
            if filter.matches(&serde_json::to_value(document)?) {
                matched.push(document.clone());
            }
        }
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Gadget {
        id: Uuid,
        name: String,
        size: i64,
    }

    impl Document for Gadget {
        const COLLECTION: &'static str = "gadgets";

        fn id(&self) -> Uuid {
            self.id
        }
    }

    fn gadget(name: &str, size: i64) -> Gadget {
        Gadget {
            id: Uuid::new_v4(),
            name: name.to_string(),
            size,
        }
    }

    #[tokio::test]
    async fn staged_insert_is_invisible_until_commit() {
        let store = InMemoryStore::<Gadget>::new();
        let mut session = store.begin().await.unwrap();

        store
            .insert(&gadget("widget", 3), &mut session)
            .await
            .unwrap();
        assert_eq!(store.find_many(&Filter::all()).await.unwrap().len(), 0);

        session.commit().await.unwrap();
        assert_eq!(store.find_many(&Filter::all()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn abort_discards_staged_writes() {
        let store = InMemoryStore::<Gadget>::new();
        let mut session = store.begin().await.unwrap();

        store
            .insert(&gadget("widget", 3), &mut session)
            .await
            .unwrap();
        session.abort().await.unwrap();

        assert_eq!(store.document_count().await, 0);
    }

    #[tokio::test]
    async fn dropped_session_discards_staged_writes() {
        let store = InMemoryStore::<Gadget>::new();
        let mut session = store.begin().await.unwrap();

        store
            .insert(&gadget("widget", 3), &mut session)
            .await
            .unwrap();
        drop(session);

        assert_eq!(store.document_count().await, 0);
    }

    #[tokio::test]
    async fn rejected_insert_surfaces_the_error() {
        let store = InMemoryStore::<Gadget>::new();
        store.set_fail_on_insert(true).await;
        let mut session = store.begin().await.unwrap();

        let result = store.insert(&gadget("widget", 3), &mut session).await;
        assert!(matches!(result, Err(StoreError::Rejected(_))));
    }

    #[tokio::test]
    async fn find_many_filters_by_field() {
        let store = InMemoryStore::<Gadget>::new();
        let mut session = store.begin().await.unwrap();
        store
            .insert(&gadget("widget", 3), &mut session)
            .await
            .unwrap();
        store
            .insert(&gadget("sprocket", 5), &mut session)
            .await
            .unwrap();
        session.commit().await.unwrap();

        let widgets = store
            .find_many(&Filter::eq("name", "widget"))
            .await
            .unwrap();
        assert_eq!(widgets.len(), 1);
        assert_eq!(widgets[0].name, "widget");

        let found = store
            .find_one(&Filter::eq("size", 5))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "sprocket");
    }

    #[tokio::test]
    async fn find_many_on_empty_store_returns_empty_list() {
        let store = InMemoryStore::<Gadget>::new();
        let all = store.find_many(&Filter::all()).await.unwrap();
        assert!(all.is_empty());
    }
}
