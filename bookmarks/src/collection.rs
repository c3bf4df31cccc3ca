//! Document-collection backend.
//!
//! Mirrors the contract of the hosted document store the bookmarks screen
//! talks to: one document per bookmark under an id the collection assigns,
//! equality queries on the job id, delete by document id, and listeners that
//! receive the whole collection after every change. Handles are cheap to
//! clone and all clones address the same collection, so several writers can
//! share it. Documents live in memory only and do not survive a restart.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use jobs_common::{Bookmark, BookmarkShape, JobId, StoreError, StoredBookmark};
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use crate::store::BookmarkStore;

#[derive(Debug)]
struct Inner {
    documents: RwLock<Vec<StoredBookmark>>,
    changes: watch::Sender<Vec<StoredBookmark>>,
}

#[derive(Debug, Clone)]
pub struct CollectionStore {
    inner: Arc<Inner>,
}

impl Default for CollectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionStore {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                documents: RwLock::new(Vec::new()),
                changes,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<StoredBookmark> {
        self.inner
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut Vec<StoredBookmark>) -> R) -> R {
        let mut documents = self
            .inner
            .documents
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut *documents);
        // Published while still holding the lock so listeners never see
        // snapshots out of order.
        self.inner.changes.send_replace(documents.clone());
        result
    }
}

#[async_trait]
impl BookmarkStore for CollectionStore {
    fn shape(&self) -> BookmarkShape {
        BookmarkShape::Summary
    }

    async fn find(&self, job_id: &JobId) -> Result<Vec<StoredBookmark>, StoreError> {
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|doc| doc.job_id() == job_id)
            .collect())
    }

    async fn create(&self, bookmark: Bookmark) -> Result<StoredBookmark, StoreError> {
        let stored = StoredBookmark {
            key: Uuid::now_v7().to_string(),
            bookmark,
        };
        let total = self.mutate(|documents| {
            documents.push(stored.clone());
            documents.len()
        });

        info!(doc_id = %stored.key, job_id = %stored.job_id(), total, "bookmark document added");
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<StoredBookmark>, StoreError> {
        Ok(self.snapshot())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        if !self.snapshot().iter().any(|doc| doc.key == key) {
            return Ok(false);
        }
        let removed = self.mutate(|documents| {
            let before = documents.len();
            documents.retain(|doc| doc.key != key);
            before != documents.len()
        });

        if removed {
            info!(doc_id = key, "bookmark document deleted");
        }
        Ok(removed)
    }

    fn subscribe(&self) -> watch::Receiver<Vec<StoredBookmark>> {
        self.inner.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobs_common::Job;

    fn bookmark(id: &str) -> Bookmark {
        Bookmark::from_job(&Job::new(id), BookmarkShape::Summary)
    }

    #[tokio::test]
    async fn test_documents_get_store_assigned_ids() {
        let store = CollectionStore::new();
        let a = store.create(bookmark("a")).await.unwrap();
        let b = store.create(bookmark("b")).await.unwrap();

        assert_ne!(a.key, b.key);
        assert_ne!(a.key, "a");
        assert!(Uuid::parse_str(&a.key).is_ok());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_query_by_job_id_and_delete_by_doc_id() {
        let store = CollectionStore::new();
        let a = store.create(bookmark("a")).await.unwrap();
        store.create(bookmark("b")).await.unwrap();

        let found = store.find(&JobId::from("a")).await.unwrap();
        assert_eq!(found, vec![a.clone()]);

        // Job ids are not document keys.
        assert!(!store.delete("a").await.unwrap());
        assert!(store.delete(&a.key).await.unwrap());
        assert!(store.find(&JobId::from("a")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_documents_and_listeners() {
        let store = CollectionStore::new();
        let other_writer = store.clone();
        let mut rx = store.subscribe();

        other_writer.create(bookmark("a")).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
