use std::sync::Arc;

use jobs_common::{Bookmark, Job, JobId, StoreError, StoredBookmark};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::store::BookmarkStore;

#[derive(Debug, Error)]
pub enum BookmarkError {
    #[error("job has no usable id")]
    InvalidJob,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added(StoredBookmark),
    AlreadyBookmarked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Number of stored entries deleted (more than one only after a lost
    /// add race left duplicates behind).
    Removed(usize),
    NotPresent,
}

/// Translates bookmark intents into store operations.
///
/// Per job id the only states are bookmarked and not bookmarked. Adding a
/// bookmarked job reports [`AddOutcome::AlreadyBookmarked`]; removing one that
/// is not stored succeeds with [`RemoveOutcome::NotPresent`]. The existence
/// check before a write is best effort: two overlapping adds for the same
/// job can both pass it.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn BookmarkStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn BookmarkStore>) -> Self {
        Self { store }
    }

    pub async fn is_bookmarked(&self, job_id: &JobId) -> Result<bool, BookmarkError> {
        Ok(!self.store.find(job_id).await?.is_empty())
    }

    pub async fn add(&self, job: &Job) -> Result<AddOutcome, BookmarkError> {
        if job.id.as_str().trim().is_empty() {
            return Err(BookmarkError::InvalidJob);
        }

        if self.is_bookmarked(&job.id).await? {
            debug!(job_id = %job.id, "job already bookmarked");
            return Ok(AddOutcome::AlreadyBookmarked);
        }

        let bookmark = Bookmark::from_job(job, self.store.shape());
        let stored = self.store.create(bookmark).await.inspect_err(|e| {
            error!(job_id = %job.id, error = %e, "could not save bookmark");
        })?;
        info!(job_id = %job.id, key = %stored.key, "job bookmarked");
        Ok(AddOutcome::Added(stored))
    }

    /// Deletes every stored entry for `job_id`.
    pub async fn remove(&self, job_id: &JobId) -> Result<RemoveOutcome, BookmarkError> {
        let entries = self.store.find(job_id).await?;

        let mut removed = 0;
        for entry in &entries {
            // Someone else may have deleted it since the query; that is fine.
            if self.store.delete(&entry.key).await.inspect_err(|e| {
                error!(%job_id, key = %entry.key, error = %e, "could not remove bookmark");
            })? {
                removed += 1;
            }
        }

        if removed == 0 {
            debug!(%job_id, "bookmark already absent");
            Ok(RemoveOutcome::NotPresent)
        } else {
            info!(%job_id, removed, "bookmark removed");
            Ok(RemoveOutcome::Removed(removed))
        }
    }

    pub async fn list(&self) -> Result<Vec<StoredBookmark>, BookmarkError> {
        Ok(self.store.list().await?)
    }

    /// Live view of the store; the first snapshot is available immediately.
    pub fn subscribe(&self) -> BookmarkSubscription {
        BookmarkSubscription {
            rx: self.store.subscribe(),
        }
    }
}

/// Live bookmark list. Dropping it unsubscribes.
#[derive(Debug)]
pub struct BookmarkSubscription {
    rx: watch::Receiver<Vec<StoredBookmark>>,
}

impl BookmarkSubscription {
    pub fn current(&self) -> Vec<StoredBookmark> {
        self.rx.borrow().clone()
    }

    /// Waits for the store's next change and returns the full new list, or
    /// `None` once the store is gone.
    pub async fn next(&mut self) -> Option<Vec<StoredBookmark>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
