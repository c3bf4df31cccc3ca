//! Bookmark persistence and reconciliation.
//!
//! A [`Reconciler`] turns "bookmark this job" / "forget this job" intents into
//! operations on whichever [`BookmarkStore`] backend is active, keeping at
//! most one stored copy per job id and treating repeat removals as success.

pub mod collection;
pub mod list;
pub mod local;
pub mod notice;
pub mod reconciler;
pub mod store;

pub use collection::CollectionStore;
pub use list::BookmarkList;
pub use local::LocalBlobStore;
pub use notice::{Notice, NoticeLevel};
pub use reconciler::{AddOutcome, BookmarkError, BookmarkSubscription, Reconciler, RemoveOutcome};
pub use store::BookmarkStore;
