//! PostgreSQL integration tests.
//!
//! These tests need Docker and are ignored by default. Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --ignored --test-threads=1
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use store::{Document, DocumentStore, Filter, PostgresStore, Session};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

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

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_documents_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

async fn get_test_store() -> PostgresStore<Gadget> {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE documents")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn committed_insert_is_visible() {
    let store = get_test_store().await;

    let doc = gadget("widget", 3);
    let mut session = store.begin().await.unwrap();
    store.insert(&doc, &mut session).await.unwrap();

    // Invisible until commit.
    assert!(store.find_many(&Filter::all()).await.unwrap().is_empty());

    session.commit().await.unwrap();

    let all = store.find_many(&Filter::all()).await.unwrap();
    assert_eq!(all, vec![doc]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn aborted_insert_is_discarded() {
    let store = get_test_store().await;

    let mut session = store.begin().await.unwrap();
    store
        .insert(&gadget("widget", 3), &mut session)
        .await
        .unwrap();
    session.abort().await.unwrap();

    assert!(store.find_many(&Filter::all()).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn find_filters_with_jsonb_containment() {
    let store = get_test_store().await;

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

    let found = store
        .find_one(&Filter::eq("size", 5))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.name, "sprocket");
}
