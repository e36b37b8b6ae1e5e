//! Schema-less document store over SQLite
//!
//! Collections of JSON documents in a single `documents` table. The store
//! exposes the primitives the repositories build on: `find_one`, `find`,
//! `insert_one`, `replace_one`, `delete_one`, `delete_many`, `drop`.
//!
//! Filters are evaluated in-process after fetching a collection's rows.
//! The dataset this system targets is low thousands of documents, so a
//! collection scan per query is acceptable; no index beyond the primary
//! key is maintained.

use crate::{Error, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

mod filter;
pub use filter::Filter;

/// Field the store injects into every document at insert time.
pub const DOC_ID_FIELD: &str = "doc_id";

/// Handle to the backing database. Cheap to clone; constructed once at
/// startup and passed by reference, never held as global state.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if needed) the store at the given database path.
    pub async fn open(db_path: &Path) -> Result<Store> {
        let newly_created = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(&db_url)
            .await?;

        if newly_created {
            info!("Initialized new database: {}", db_path.display());
        } else {
            info!("Opened existing database: {}", db_path.display());
        }

        // WAL allows concurrent readers with one writer
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await?;
        sqlx::query("PRAGMA busy_timeout = 5000")
            .execute(&pool)
            .await?;

        Self::init(pool).await
    }

    /// In-memory store for tests. The pool is capped at one connection so
    /// every handle sees the same database.
    pub async fn in_memory() -> Result<Store> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::init(pool).await
    }

    async fn init(pool: SqlitePool) -> Result<Store> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                doc_id     TEXT NOT NULL,
                body       TEXT NOT NULL,
                PRIMARY KEY (collection, doc_id)
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Store { pool })
    }

    /// Handle to one named collection.
    pub fn collection(&self, name: &'static str) -> Collection {
        Collection {
            pool: self.pool.clone(),
            name,
        }
    }

    /// Close the underlying pool. Pending operations complete first.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Collection-scoped view of the store.
#[derive(Clone)]
pub struct Collection {
    pool: SqlitePool,
    name: &'static str,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// First document matching the filter, or `None`.
    pub async fn find_one(&self, filter: &Filter) -> Result<Option<serde_json::Value>> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    /// All documents matching the filter; the empty filter returns the
    /// whole collection. Order is undefined.
    pub async fn find(&self, filter: &Filter) -> Result<Vec<serde_json::Value>> {
        let bodies: Vec<String> =
            sqlx::query_scalar("SELECT body FROM documents WHERE collection = ?")
                .bind(self.name)
                .fetch_all(&self.pool)
                .await?;

        let mut docs = Vec::with_capacity(bodies.len());
        for body in bodies {
            let doc: serde_json::Value = serde_json::from_str(&body)?;
            if filter.matches(&doc) {
                docs.push(doc);
            }
        }
        debug!(
            collection = self.name,
            matched = docs.len(),
            "find executed"
        );
        Ok(docs)
    }

    /// Insert one document, assigning it a generated id. The id is written
    /// into the document body under `doc_id` and returned.
    pub async fn insert_one(&self, mut doc: serde_json::Value) -> Result<String> {
        let object = doc.as_object_mut().ok_or_else(|| {
            Error::MalformedInput(format!(
                "document for collection '{}' is not a JSON object",
                self.name
            ))
        })?;

        let doc_id = Uuid::new_v4().to_string();
        object.insert(DOC_ID_FIELD.to_string(), doc_id.clone().into());

        sqlx::query("INSERT INTO documents (collection, doc_id, body) VALUES (?, ?, ?)")
            .bind(self.name)
            .bind(&doc_id)
            .bind(doc.to_string())
            .execute(&self.pool)
            .await?;

        debug!(collection = self.name, doc_id = %doc_id, "document inserted");
        Ok(doc_id)
    }

    /// Replace the first document matching the filter with the given body.
    /// The stored `doc_id` is preserved. Returns whether a document was
    /// replaced; callers precede this with an existence check.
    pub async fn replace_one(&self, filter: &Filter, mut doc: serde_json::Value) -> Result<bool> {
        let Some(existing) = self.find_one(filter).await? else {
            return Ok(false);
        };
        let doc_id = existing
            .get(DOC_ID_FIELD)
            .and_then(|id| id.as_str())
            .ok_or_else(|| {
                Error::Internal(format!(
                    "stored document in '{}' has no doc_id",
                    self.name
                ))
            })?
            .to_string();

        if let Some(object) = doc.as_object_mut() {
            object.insert(DOC_ID_FIELD.to_string(), doc_id.clone().into());
        }

        sqlx::query("UPDATE documents SET body = ? WHERE collection = ? AND doc_id = ?")
            .bind(doc.to_string())
            .bind(self.name)
            .bind(&doc_id)
            .execute(&self.pool)
            .await?;

        debug!(collection = self.name, doc_id = %doc_id, "document replaced");
        Ok(true)
    }

    /// Delete the first document matching the filter. Returns the number
    /// of documents removed (0 or 1).
    pub async fn delete_one(&self, filter: &Filter) -> Result<u64> {
        match self.find_one(filter).await? {
            Some(doc) => self.delete_by_doc_ids(std::slice::from_ref(&doc)).await,
            None => Ok(0),
        }
    }

    /// Delete every document matching the filter, returning the count.
    pub async fn delete_many(&self, filter: &Filter) -> Result<u64> {
        let docs = self.find(filter).await?;
        self.delete_by_doc_ids(&docs).await
    }

    /// Drop the whole collection.
    pub async fn drop(&self) -> Result<()> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ?")
            .bind(self.name)
            .execute(&self.pool)
            .await?;
        info!(
            collection = self.name,
            dropped = result.rows_affected(),
            "collection dropped"
        );
        Ok(())
    }

    async fn delete_by_doc_ids(&self, docs: &[serde_json::Value]) -> Result<u64> {
        let mut removed = 0;
        for doc in docs {
            let Some(doc_id) = doc.get(DOC_ID_FIELD).and_then(|id| id.as_str()) else {
                continue;
            };
            let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND doc_id = ?")
                .bind(self.name)
                .bind(doc_id)
                .execute(&self.pool)
                .await?;
            removed += result.rows_affected();
        }
        Ok(removed)
    }
}
