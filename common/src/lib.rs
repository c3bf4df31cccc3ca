//! Shared data model for the job board.
//!
//! Jobs come from the remote feed, bookmarks are what the stores persist, and
//! the error enums are shared by every crate that talks to either.

mod bookmark;
mod error;
mod job;

pub use bookmark::{Bookmark, BookmarkShape, StoredBookmark};
pub use error::{FeedError, ResolveError, StoreError};
pub use job::{
    ContactPreference, FeedPage, Job, JobCard, JobId, JobTag, PrimaryDetails, WhatsAppContact,
};
