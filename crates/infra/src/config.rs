//! Client-side configuration, read from the environment.

use std::path::PathBuf;

use anyhow::Context;

pub const DATA_DIR_VAR: &str = "NEXUS_DATA_DIR";
pub const API_URL_VAR: &str = "NEXUS_API_URL";

/// File name of the local store database inside the data directory.
pub const LOCAL_DB_FILE: &str = "nexus_finance_local.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the local store database.
    pub data_dir: PathBuf,
    /// Base URL of the remote mirror; `None` keeps everything local.
    pub api_url: Option<String>,
}

impl AppConfig {
    pub fn local_only(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            api_url: None,
        }
    }

    pub fn local_db_path(&self) -> PathBuf {
        self.data_dir.join(LOCAL_DB_FILE)
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = match non_empty(lookup(DATA_DIR_VAR)) {
            Some(dir) => PathBuf::from(dir),
            None => {
                let dir = default_data_dir()?;
                tracing::info!(data_dir = %dir.display(), "{DATA_DIR_VAR} not set, using default");
                dir
            }
        };

        let api_url = non_empty(lookup(API_URL_VAR)).map(|u| u.trim_end_matches('/').to_string());
        if api_url.is_none() {
            tracing::info!("{API_URL_VAR} not set, remote sync disabled");
        }

        Ok(Self { data_dir, api_url })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_data_dir() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    Ok(base.join("nexus-finance"))
}
