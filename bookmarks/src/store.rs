use async_trait::async_trait;
use jobs_common::{Bookmark, BookmarkShape, JobId, StoreError, StoredBookmark};
use tokio::sync::watch;

/// A persistence backend for bookmarks.
///
/// Creates and deletes are idempotent per key and the last write wins.
/// `subscribe` delivers the full current set after every change the backend
/// observes; dropping the receiver unsubscribes.
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Whether the backend keeps full job snapshots or reduced records.
    fn shape(&self) -> BookmarkShape;

    /// Every stored entry for `job_id` (normally zero or one).
    async fn find(&self, job_id: &JobId) -> Result<Vec<StoredBookmark>, StoreError>;

    async fn create(&self, bookmark: Bookmark) -> Result<StoredBookmark, StoreError>;

    async fn list(&self) -> Result<Vec<StoredBookmark>, StoreError>;

    /// Deletes by store key. Returns `false` if nothing was stored under it.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    fn subscribe(&self) -> watch::Receiver<Vec<StoredBookmark>>;
}
