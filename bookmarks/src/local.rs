//! Bookmarks kept on the device as a single JSON blob.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use jobs_common::{Bookmark, BookmarkShape, JobId, StoreError, StoredBookmark};
use tokio::sync::{RwLock, watch};
use tracing::{error, info};

use crate::store::BookmarkStore;

/// File-backed store: one file holds a JSON array of every bookmark.
///
/// Reads parse the whole blob (a missing or blank file is an empty list) and
/// writes replace it completely. Entries are keyed by job id.
///
/// A write goes to a sibling temp file that is then renamed over the blob, so
/// the file on disk is always either the old or the new array. Reads share
/// `lock`; writes hold it exclusively for the whole read-modify-write.
#[derive(Debug)]
pub struct LocalBlobStore {
    path: PathBuf,
    lock: RwLock<()>,
    changes: watch::Sender<Vec<StoredBookmark>>,
}

impl LocalBlobStore {
    /// Opens the blob at `path`. A blob that fails to decode is reported but
    /// left untouched; reads and writes keep failing until it is fixed.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let initial = match read_blob(&path).await {
            Ok(bookmarks) => keyed(bookmarks),
            Err(e) => {
                error!(path = %path.display(), error = %e, "could not load bookmarks");
                Vec::new()
            }
        };
        let (changes, _) = watch::channel(initial);

        Self {
            path,
            lock: RwLock::new(()),
            changes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_blob(&self, bookmarks: &[Bookmark]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec(bookmarks)?;
        let tmp = temp_path(&self.path);
        tokio::fs::write(&tmp, json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        self.changes.send_replace(keyed(bookmarks.to_vec()));
        Ok(())
    }
}

async fn read_blob(path: &Path) -> Result<Vec<Bookmark>, StoreError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    if raw.trim().is_empty() || raw.trim() == "null" {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&raw)?)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn keyed(bookmarks: Vec<Bookmark>) -> Vec<StoredBookmark> {
    bookmarks
        .into_iter()
        .map(|bookmark| StoredBookmark {
            key: bookmark.job_id.to_string(),
            bookmark,
        })
        .collect()
}

#[async_trait]
impl BookmarkStore for LocalBlobStore {
    fn shape(&self) -> BookmarkShape {
        BookmarkShape::FullJob
    }

    async fn find(&self, job_id: &JobId) -> Result<Vec<StoredBookmark>, StoreError> {
        let bookmarks = {
            let _guard = self.lock.read().await;
            read_blob(&self.path).await?
        };
        Ok(keyed(
            bookmarks.into_iter().filter(|b| &b.job_id == job_id).collect(),
        ))
    }

    async fn create(&self, bookmark: Bookmark) -> Result<StoredBookmark, StoreError> {
        let _guard = self.lock.write().await;
        let mut bookmarks = read_blob(&self.path).await?;

        match bookmarks.iter_mut().find(|b| b.job_id == bookmark.job_id) {
            Some(existing) => *existing = bookmark.clone(),
            None => bookmarks.push(bookmark.clone()),
        }
        self.write_blob(&bookmarks).await?;

        info!(job_id = %bookmark.job_id, total = bookmarks.len(), "bookmark saved to local blob");
        Ok(StoredBookmark {
            key: bookmark.job_id.to_string(),
            bookmark,
        })
    }

    async fn list(&self) -> Result<Vec<StoredBookmark>, StoreError> {
        let _guard = self.lock.read().await;
        Ok(keyed(read_blob(&self.path).await?))
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.write().await;
        let mut bookmarks = read_blob(&self.path).await?;

        let before = bookmarks.len();
        bookmarks.retain(|b| b.job_id.as_str() != key);
        if bookmarks.len() == before {
            return Ok(false);
        }
        self.write_blob(&bookmarks).await?;

        info!(job_id = key, total = bookmarks.len(), "bookmark removed from local blob");
        Ok(true)
    }

    fn subscribe(&self) -> watch::Receiver<Vec<StoredBookmark>> {
        self.changes.subscribe()
    }
}
