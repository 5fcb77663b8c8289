use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use super::{RecordRepository, RepositoryError, Upsert};

/// SQLite-backed repository: one `records` table for every collection.
#[derive(Debug, Clone)]
pub struct SqliteRecords {
    pool: SqlitePool,
}

impl SqliteRecords {
    /// Open (or create) the database file at `path`.
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create database directory at {:?}", parent))?;
        }

        let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("failed to open SQLite database at {:?}", path))?;

        Self::with_pool(pool).await
    }

    /// Private in-memory database (single connection, so every query sees it).
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("invalid in-memory SQLite options")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("failed to open in-memory SQLite database")?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> anyhow::Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                seq        INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                id         TEXT NOT NULL,
                body       TEXT NOT NULL,
                UNIQUE (collection, id)
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create records table")?;

        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl RecordRepository for SqliteRecords {
    async fn list(&self, collection: &str) -> Result<Vec<Value>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT body
            FROM records
            WHERE collection = ?1
            ORDER BY seq
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Value, RepositoryError> {
                let body: String = row.try_get("body")?;
                Ok(serde_json::from_str(&body)?)
            })
            .collect()
    }

    async fn upsert(&self, collection: &str, id: &str, body: Value) -> Result<Upsert, RepositoryError> {
        let body = serde_json::to_string(&body)?;
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE records
            SET body = ?3
            WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(&body)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let outcome = if updated > 0 {
            Upsert::Updated
        } else {
            sqlx::query(
                r#"
                INSERT INTO records (collection, id, body)
                VALUES (?1, ?2, ?3)
                "#,
            )
            .bind(collection)
            .bind(id)
            .bind(&body)
            .execute(&mut *tx)
            .await?;
            Upsert::Created
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, RepositoryError> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM records
            WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::contract;
    use serde_json::json;

    #[tokio::test]
    async fn upsert_keeps_first_insertion_order() {
        let repo = SqliteRecords::in_memory().await.unwrap();
        contract::upsert_keeps_first_insertion_order(&repo).await;
    }

    #[tokio::test]
    async fn delete_reports_missing_ids() {
        let repo = SqliteRecords::in_memory().await.unwrap();
        contract::delete_reports_missing_ids(&repo).await;
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Nexus Finance").join("nexus_finance.db");

        {
            let repo = SqliteRecords::open(&path).await.unwrap();
            repo.upsert("clients", "c1", json!({"id": "c1", "name": "Acme"})).await.unwrap();
            repo.pool.close().await;
        }

        let reopened = SqliteRecords::open(&path).await.unwrap();
        assert_eq!(
            reopened.list("clients").await.unwrap(),
            vec![json!({"id": "c1", "name": "Acme"})]
        );
    }
}
