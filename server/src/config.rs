//! Server configuration, read from `config.json` when present.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use jobs_feed::FeedConfig;
use serde::Deserialize;

pub const CONFIG_PATH: &str = "config.json";

/// Which backend keeps bookmarks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum BookmarkBackend {
    /// JSON blob on local disk.
    Local {
        #[serde(default = "default_blob_path")]
        path: PathBuf,
    },
    /// Document collection with live listeners. It lives in this process's
    /// memory, so its bookmarks are lost on restart.
    Remote,
}

impl BookmarkBackend {
    /// One-line description for the startup banner.
    pub fn describe(&self) -> String {
        match self {
            BookmarkBackend::Local { path } => format!("stored in {}", path.display()),
            BookmarkBackend::Remote => {
                "kept in an in-memory document collection (lost on restart)".to_string()
            }
        }
    }
}

impl Default for BookmarkBackend {
    fn default() -> Self {
        BookmarkBackend::Local {
            path: default_blob_path(),
        }
    }
}

fn default_blob_path() -> PathBuf {
    PathBuf::from("data/bookmarked_jobs.json")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub feed: FeedConfig,
    pub bookmarks: BookmarkBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            feed: FeedConfig::default(),
            bookmarks: BookmarkBackend::default(),
        }
    }
}

impl AppConfig {
    /// Loads `path` if it exists, otherwise falls back to defaults.
    /// Missing fields take their defaults too.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.feed.page_ceiling, 10);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "feed": { "page_ceiling": 25 }, "bookmarks": { "backend": "remote" } }"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.feed.page_ceiling, 25);
        assert_eq!(config.feed.base_url, jobs_feed::config::DEFAULT_BASE_URL);
        assert_eq!(config.bookmarks, BookmarkBackend::Remote);
    }

    #[test]
    fn test_local_backend_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "bookmarks": { "backend": "local" } }"#).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap().bookmarks, BookmarkBackend::default());

        fs::write(&path, "{ broken").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_backend_description_says_where_bookmarks_live() {
        let local = BookmarkBackend::default().describe();
        assert_eq!(local, "stored in data/bookmarked_jobs.json");

        let remote = BookmarkBackend::Remote.describe();
        assert!(remote.contains("in-memory"));
        assert!(remote.contains("lost on restart"));
    }
}
