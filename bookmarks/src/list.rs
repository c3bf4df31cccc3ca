use jobs_common::{JobId, StoredBookmark};
use tracing::warn;

use crate::notice::Notice;
use crate::reconciler::Reconciler;

/// The bookmarks screen's copy of the list.
///
/// Removal is optimistic: the entry disappears locally first, then the store
/// is asked to delete it. If the store fails the previous list comes back and
/// the caller gets an error notice to show.
pub struct BookmarkList {
    reconciler: Reconciler,
    items: Vec<StoredBookmark>,
}

impl BookmarkList {
    pub fn new(reconciler: Reconciler) -> Self {
        Self {
            reconciler,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[StoredBookmark] {
        &self.items
    }

    /// Replaces the list with a snapshot delivered by a subscription.
    pub fn apply_snapshot(&mut self, snapshot: Vec<StoredBookmark>) {
        self.items = snapshot;
    }

    /// Pulls the current list; on failure the old list stays visible.
    pub async fn refresh(&mut self) -> Result<(), Notice> {
        match self.reconciler.list().await {
            Ok(items) => {
                self.items = items;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "could not load bookmarks");
                Err(Notice::LoadFailed)
            }
        }
    }

    pub async fn remove(&mut self, job_id: &JobId) -> Result<Notice, Notice> {
        let previous = self.items.clone();
        self.items.retain(|entry| entry.job_id() != job_id);

        match self.reconciler.remove(job_id).await {
            Ok(outcome) => {
                // Pick up anything other writers changed meanwhile.
                if let Ok(items) = self.reconciler.list().await {
                    self.items = items;
                }
                Ok(Notice::from(outcome))
            }
            Err(e) => {
                warn!(%job_id, error = %e, "bookmark removal failed, restoring list");
                self.items = previous;
                Err(Notice::RemoveFailed)
            }
        }
    }
}
