// src/frontier/sqlite.rs
// =============================================================================
// Durable frontier backed by a SQLite file.
//
// Schema:
//   visited(url TEXT PRIMARY KEY)
//   pending(id INTEGER PRIMARY KEY AUTOINCREMENT, url TEXT UNIQUE)
//
// The AUTOINCREMENT id gives FIFO order. Dequeue is a single
// DELETE ... RETURNING, so an entry can only ever come out once.
// =============================================================================

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, instrument};

use super::{Frontier, Result};

const SCHEMA: [&str; 2] = [
    "CREATE TABLE IF NOT EXISTS visited (url TEXT PRIMARY KEY NOT NULL)",
    "CREATE TABLE IF NOT EXISTS pending (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        url TEXT NOT NULL UNIQUE
    )",
];

/// Frontier stored in `<dir>/frontier.db`.
#[derive(Debug, Clone)]
pub struct SqliteFrontier {
    pool: SqlitePool,
}

impl SqliteFrontier {
    /// Opens (or creates) the frontier database at `path`.
    ///
    /// Existing visited/pending rows are kept, which is how an interrupted
    /// crawl picks up where it left off.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        // One connection: the crawl is sequential and this keeps writes ordered
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// A throwaway database, mostly for tests.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        debug!("frontier schema ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl Frontier for SqliteFrontier {
    async fn mark_visited(&mut self, url: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM pending WHERE url = ?")
            .bind(url)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT OR IGNORE INTO visited (url) VALUES (?)")
            .bind(url)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn is_visited(&self, url: &str) -> Result<bool> {
        let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM visited WHERE url = ?)")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;
        Ok(found != 0)
    }

    async fn enqueue(&mut self, url: &str) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO pending (url)
             SELECT ? WHERE NOT EXISTS (SELECT 1 FROM visited WHERE url = ?)",
        )
        .bind(url)
        .bind(url)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn is_queued(&self, url: &str) -> Result<bool> {
        let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pending WHERE url = ?)")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;
        Ok(found != 0)
    }

    async fn dequeue_next(&mut self) -> Result<Option<String>> {
        let url: Option<String> = sqlx::query_scalar(
            "DELETE FROM pending
             WHERE id = (SELECT id FROM pending ORDER BY id ASC LIMIT 1)
             RETURNING url",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(url)
    }

    async fn pending_count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pending")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn visited_count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visited")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    // The pool must be closed before the session directory is removed
    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enqueue_is_idempotent() {
        let mut frontier = SqliteFrontier::in_memory().await.unwrap();
        assert!(frontier.enqueue("https://example.com/a").await.unwrap());
        assert!(!frontier.enqueue("https://example.com/a").await.unwrap());
        assert_eq!(frontier.pending_count().await.unwrap(), 1);

        assert_eq!(
            frontier.dequeue_next().await.unwrap().as_deref(),
            Some("https://example.com/a")
        );
        assert_eq!(frontier.dequeue_next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_visited_never_requeued() {
        let mut frontier = SqliteFrontier::in_memory().await.unwrap();
        frontier.enqueue("https://example.com/a").await.unwrap();
        frontier.mark_visited("https://example.com/a").await.unwrap();

        assert!(frontier.is_visited("https://example.com/a").await.unwrap());
        assert!(!frontier.is_queued("https://example.com/a").await.unwrap());
        assert!(!frontier.enqueue("https://example.com/a").await.unwrap());
        assert_eq!(frontier.dequeue_next().await.unwrap(), None);
        assert_eq!(frontier.visited_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reopen_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frontier.db");

        {
            let mut frontier = SqliteFrontier::open(&path).await.unwrap();
            frontier.mark_visited("https://example.com/").await.unwrap();
            frontier.enqueue("https://example.com/next").await.unwrap();
            frontier.close().await;
        }

        let mut frontier = SqliteFrontier::open(&path).await.unwrap();
        assert!(frontier.is_visited("https://example.com/").await.unwrap());
        assert_eq!(
            frontier.dequeue_next().await.unwrap().as_deref(),
            Some("https://example.com/next")
        );
    }
}
