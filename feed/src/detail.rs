use std::sync::Arc;

use jobs_common::{Job, JobId, JobTag, ResolveError, WhatsAppContact};
use serde::Serialize;
use tracing::debug;

use crate::salary::{SalaryRange, parse_salary_range};
use crate::source::FeedSource;

const NO_DESCRIPTION: &str = "No description available";

/// Looks a single job up for the detail view.
///
/// The remote API has no fetch-by-id endpoint, so this pulls page 1 fresh and
/// scans it. The detail view may be opened before any list was loaded, so
/// the paginator's in-memory jobs are not consulted. Jobs that only appear
/// on later pages cannot be resolved.
pub struct DetailResolver {
    source: Arc<dyn FeedSource>,
}

impl DetailResolver {
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self { source }
    }

    pub async fn resolve(&self, id: &JobId) -> Result<Job, ResolveError> {
        let page = self.source.fetch_page(1).await?;
        let scanned = page.jobs.len();

        page.jobs.into_iter().find(|job| &job.id == id).ok_or_else(|| {
            debug!(%id, scanned, "job not on the first feed page");
            ResolveError::NotFound(id.clone())
        })
    }
}

/// Everything the detail screen shows, with fallbacks applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetail {
    pub id: JobId,
    pub title: Option<String>,
    pub company: Option<String>,
    pub place: Option<String>,
    pub salary: Option<String>,
    pub job_type: Option<String>,
    pub experience: Option<String>,
    pub qualification: Option<String>,
    pub tags: Vec<JobTag>,
    pub description: Vec<String>,
    pub salary_range: Option<SalaryRange>,
    pub whatsapp: Option<WhatsAppContact>,
    pub job: Job,
}

impl From<Job> for JobDetail {
    fn from(job: Job) -> Self {
        let details = job.primary_details.clone().unwrap_or_default();

        let mut description = job.description_blocks();
        if description.is_empty() {
            description.push(NO_DESCRIPTION.to_string());
        }

        let salary_range = match (job.salary_min, job.salary_max) {
            (Some(min), Some(max)) => Some(SalaryRange { min, max }),
            (Some(only), None) | (None, Some(only)) => Some(SalaryRange { min: only, max: only }),
            (None, None) => details.salary.as_deref().and_then(parse_salary_range),
        };

        Self {
            id: job.id.clone(),
            title: job.title.clone(),
            company: job.company_name.clone(),
            place: details.place,
            salary: details.salary,
            job_type: details.job_type,
            experience: details.experience,
            qualification: details.qualification,
            tags: job.job_tags.clone(),
            description,
            salary_range,
            whatsapp: job.whatsapp_contact(),
            job,
        }
    }
}
