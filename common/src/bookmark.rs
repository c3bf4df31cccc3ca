use serde::{Deserialize, Serialize};

use crate::job::{Job, JobId, non_blank};

/// What a backend keeps for each bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkShape {
    /// Only the reduced record (id, title, company, location, salary).
    Summary,
    /// The reduced record plus a snapshot of the whole job.
    FullJob,
}

/// A user-saved reference to a job, independent of the feed's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    #[serde(rename = "id")]
    pub job_id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<Job>,
}

impl Bookmark {
    pub fn from_job(job: &Job, shape: BookmarkShape) -> Self {
        Self {
            job_id: job.id.clone(),
            title: non_blank(job.title.as_deref()).unwrap_or("Untitled").to_string(),
            company: non_blank(job.company_name.as_deref())
                .unwrap_or("Unknown Company")
                .to_string(),
            location: non_blank(job.place()).unwrap_or("Unknown Location").to_string(),
            salary: non_blank(job.salary_text()).unwrap_or("N/A").to_string(),
            job: match shape {
                BookmarkShape::Summary => None,
                BookmarkShape::FullJob => Some(job.clone()),
            },
        }
    }
}

/// A bookmark together with the key its store addresses it by.
///
/// The local blob keys entries by job id; the remote collection uses the
/// document id it assigned on create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBookmark {
    pub key: String,
    #[serde(flatten)]
    pub bookmark: Bookmark,
}

impl StoredBookmark {
    pub fn job_id(&self) -> &JobId {
        &self.bookmark.job_id
    }
}
