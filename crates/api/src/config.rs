//! Server configuration, read from the environment.

use std::path::PathBuf;

pub const BIND_VAR: &str = "NEXUS_BIND";
pub const DB_PATH_VAR: &str = "NEXUS_DB_PATH";

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Where records are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    /// Lost on exit. Selected with `NEXUS_DB_PATH=:memory:`.
    Memory,
    Sqlite(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub storage: Storage,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = lookup(BIND_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| {
                tracing::info!("{BIND_VAR} not set; using {DEFAULT_BIND}");
                DEFAULT_BIND.to_string()
            });

        let storage = match lookup(DB_PATH_VAR).map(|v| v.trim().to_string()) {
            Some(path) if path == ":memory:" => Storage::Memory,
            Some(path) if !path.is_empty() => Storage::Sqlite(PathBuf::from(path)),
            _ => {
                let path = default_db_path()?;
                tracing::info!(path = %path.display(), "{DB_PATH_VAR} not set; using default database");
                Storage::Sqlite(path)
            }
        };

        Ok(Self { bind, storage })
    }
}

/// `~/Documents/Nexus Finance/nexus_finance.db`.
fn default_db_path() -> anyhow::Result<PathBuf> {
    let docs = dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
        .ok_or_else(|| anyhow::anyhow!("failed to resolve documents directory - tried document_dir() and home_dir()/Documents"))?;
    Ok(docs.join("Nexus Finance").join("nexus_finance.db"))
}
