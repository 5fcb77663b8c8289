use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::sync::mpsc;

use anyhow::Context;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::runtime::{Builder, Runtime};

use super::{LocalStore, StoreError};

/// SQLite-backed store: one `blobs` row per key.
///
/// The store owns a small runtime of its own and every call waits for its
/// query there, so the synchronous [`LocalStore`] API can be used both from
/// plain threads and from inside another tokio runtime.
pub struct SqliteStore {
    pool: SqlitePool,
    runtime: StoreRuntime,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create store directory at {:?}", parent))?;
        }

        let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
        Self::connect(options).with_context(|| format!("failed to open local store at {:?}", path))
    }

    /// Private in-memory database, gone when the store is dropped.
    pub fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("invalid in-memory SQLite options")?;
        Self::connect(options).context("failed to open in-memory local store")
    }

    // One connection: a single writer, and `:memory:` is per connection.
    fn connect(options: SqliteConnectOptions) -> anyhow::Result<Self> {
        let runtime = StoreRuntime::new()?;
        let pool = runtime.run(async move {
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options)
                .await?;

            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS blobs (
                    key  TEXT PRIMARY KEY,
                    blob TEXT NOT NULL
                )
                "#,
            )
            .execute(&pool)
            .await?;

            Ok::<_, sqlx::Error>(pool)
        })??;

        Ok(Self { pool, runtime })
    }

    fn db_error(key: &str) -> impl FnOnce(sqlx::Error) -> StoreError + '_ {
        move |source| StoreError::Database {
            key: key.to_string(),
            source,
        }
    }
}

impl LocalStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let pool = self.pool.clone();
        let owned = key.to_string();
        let row = self
            .runtime
            .run(async move {
                sqlx::query("SELECT blob FROM blobs WHERE key = ?1")
                    .bind(owned)
                    .fetch_optional(&pool)
                    .await
            })?
            .map_err(Self::db_error(key))?;

        row.map(|r| r.try_get::<String, _>("blob"))
            .transpose()
            .map_err(Self::db_error(key))
    }

    fn put(&self, key: &str, blob: &str) -> Result<(), StoreError> {
        let pool = self.pool.clone();
        let (owned_key, owned_blob) = (key.to_string(), blob.to_string());
        self.runtime
            .run(async move {
                sqlx::query(
                    r#"
                    INSERT INTO blobs (key, blob)
                    VALUES (?1, ?2)
                    ON CONFLICT(key) DO UPDATE SET blob = excluded.blob
                    "#,
                )
                .bind(owned_key)
                .bind(owned_blob)
                .execute(&pool)
                .await
            })?
            .map_err(Self::db_error(key))?;
        Ok(())
    }
}

/// Runtime the store's queries run on.
///
/// Work is spawned onto it and the caller blocks on a plain channel rather
/// than `Runtime::block_on`, which panics when called from async code.
struct StoreRuntime {
    runtime: Option<Runtime>,
}

impl StoreRuntime {
    fn new() -> anyhow::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("nexus-local-store")
            .enable_all()
            .build()
            .context("failed to start local store runtime")?;
        Ok(Self {
            runtime: Some(runtime),
        })
    }

    fn run<F>(&self, fut: F) -> Result<F::Output, StoreError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("local store runtime stopped".to_string()))?;

        let (tx, rx) = mpsc::sync_channel(1);
        runtime.spawn(async move {
            let _ = tx.send(fut.await);
        });
        rx.recv()
            .map_err(|_| StoreError::Unavailable("local store task aborted".to_string()))
    }
}

impl Drop for StoreRuntime {
    fn drop(&mut self) {
        // Dropping a runtime blocks, which is not allowed inside async code.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_as_none() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.get("nexus-finance-ledger").unwrap(), None);
    }

    #[test]
    fn put_replaces_the_previous_blob() {
        let store = SqliteStore::in_memory().unwrap();
        store.put("nexus-finance-quotes", "[1]").unwrap();
        store.put("nexus-finance-quotes", "[2]").unwrap();
        assert_eq!(store.get("nexus-finance-quotes").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn blobs_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("nexus_finance_local.db");

        SqliteStore::open(&path)
            .unwrap()
            .put("nexus-finance-clients", r#"[{"id":"c1"}]"#)
            .unwrap();

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("nexus-finance-clients").unwrap().as_deref(),
            Some(r#"[{"id":"c1"}]"#)
        );
    }

    #[tokio::test]
    async fn usable_and_droppable_inside_a_runtime() {
        let store = SqliteStore::in_memory().unwrap();
        store.put("nexus-finance-config", "{}").unwrap();
        assert_eq!(store.get("nexus-finance-config").unwrap().as_deref(), Some("{}"));
        drop(store);
    }
}
