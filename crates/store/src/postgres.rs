use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::{
    Result,
    store::{Document, DocumentStore, Filter, Session},
};

/// PostgreSQL-backed document store implementation.
///
/// Documents are kept as JSONB rows in a shared `documents` table, one
/// collection per document type. Sessions wrap a real database
/// transaction, so dropping a session rolls it back.
pub struct PostgresStore<T> {
    pool: PgPool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for PostgresStore<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PostgresStore<T> {
    /// Creates a new PostgreSQL document store.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        tracing::debug!("running database migrations");
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

/// Session over a [`PostgresStore`], wrapping a database transaction.
pub struct PostgresSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Session for PostgresSession {
    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn abort(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl<T: Document> DocumentStore<T> for PostgresStore<T> {
    type Session = PostgresSession;

    async fn begin(&self) -> Result<Self::Session> {
        Ok(PostgresSession {
            tx: self.pool.begin().await?,
        })
    }

    async fn insert(&self, document: &T, session: &mut Self::Session) -> Result<()> {
        let payload = serde_json::to_value(document)?;

        sqlx::query("INSERT INTO documents (id, collection, payload) VALUES ($1, $2, $3)")
            .bind(document.id())
            .bind(T::COLLECTION)
            .bind(&payload)
            .execute(&mut *session.tx)
            .await?;

        Ok(())
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<T>> {
        let row = sqlx::query(
            r#"
            SELECT payload FROM documents
            WHERE collection = $1 AND payload @> $2
            ORDER BY inserted_at ASC
            LIMIT 1
            "#,
        )
        .bind(T::COLLECTION)
        .bind(filter.as_value())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let payload: serde_json::Value = row.try_get("payload")?;
                Ok(Some(serde_json::from_value(payload)?))
            }
            None => Ok(None),
        }
    }

    async fn find_many(&self, filter: &Filter) -> Result<Vec<T>> {
        let rows = sqlx::query(
            r#"
            SELECT payload FROM documents
            WHERE collection = $1 AND payload @> $2
            ORDER BY inserted_at ASC
            "#,
        )
        .bind(T::COLLECTION)
        .bind(filter.as_value())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let payload: serde_json::Value = row.try_get("payload")?;
                Ok(serde_json::from_value::<T>(payload)?)
            })
            .collect()
    }
}
