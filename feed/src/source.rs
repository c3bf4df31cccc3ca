use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use jobs_common::{FeedError, FeedPage, Job};
use serde_json::Value;
use tracing::{debug, warn};

/// Anything that can hand out pages of the job feed.
///
/// Implementations never retry; a failure goes straight back to the caller.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<FeedPage, FeedError>;
}

/// Feed source backed by the remote listing endpoint.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFeedSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuses an existing client (and its connection pool).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_page(&self, page: u32) -> Result<FeedPage, FeedError> {
        if page == 0 {
            return Err(FeedError::InvalidPage(page));
        }

        debug!(page, url = %self.base_url, "fetching job page");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("page", page)])
            .send()
            .await
            .map_err(|e| FeedError::Transport {
                page,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                page,
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await.map_err(|e| FeedError::Malformed {
            page,
            message: e.to_string(),
        })?;

        decode_page(page, body)
    }
}

/// Turns a `{ "results": [...] }` body into a page.
///
/// The feed mixes promotional cards without an id in with real jobs; those are
/// dropped here. Any other record that fails to decode is dropped with a
/// warning rather than failing the whole page.
pub fn decode_page(page: u32, body: Value) -> Result<FeedPage, FeedError> {
    let Value::Object(mut body) = body else {
        return Err(FeedError::Malformed {
            page,
            message: "expected a JSON object".to_string(),
        });
    };
    let Some(Value::Array(records)) = body.remove("results") else {
        return Err(FeedError::Malformed {
            page,
            message: "missing `results` array".to_string(),
        });
    };

    let mut jobs = Vec::with_capacity(records.len());
    for record in records {
        let has_id = matches!(record.get("id"), Some(id) if !id.is_null());
        if !has_id {
            debug!(page, "skipping feed record without an id");
            continue;
        }
        match serde_json::from_value::<Job>(record) {
            Ok(job) => jobs.push(job),
            Err(e) => warn!(page, error = %e, "skipping undecodable job record"),
        }
    }

    Ok(FeedPage::new(page, jobs))
}

/// In-memory feed with scripted pages.
///
/// Pages that were never scripted come back empty, which is what the remote
/// feed does past its end. Every request is recorded.
#[derive(Debug, Default)]
pub struct StaticFeedSource {
    pages: HashMap<u32, Result<Vec<Job>, FeedError>>,
    requests: Mutex<Vec<u32>>,
}

impl StaticFeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32, jobs: Vec<Job>) -> Self {
        self.pages.insert(page, Ok(jobs));
        self
    }

    pub fn with_failure(mut self, page: u32, error: FeedError) -> Self {
        self.pages.insert(page, Err(error));
        self
    }

    /// Page numbers requested so far, in request order.
    pub fn requests(&self) -> Vec<u32> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    async fn fetch_page(&self, page: u32) -> Result<FeedPage, FeedError> {
        if page == 0 {
            return Err(FeedError::InvalidPage(page));
        }
        match self.requests.lock() {
            Ok(mut requests) => requests.push(page),
            Err(poisoned) => poisoned.into_inner().push(page),
        }
        match self.pages.get(&page) {
            Some(Ok(jobs)) => Ok(FeedPage::new(page, jobs.clone())),
            Some(Err(error)) => Err(error.clone()),
            None => Ok(FeedPage::new(page, Vec::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
    use serde_json::json;

    #[derive(serde::Deserialize)]
    struct PageParams {
        page: u32,
    }

    async fn jobs_handler(Query(params): Query<PageParams>) -> Result<Json<Value>, StatusCode> {
        match params.page {
            1 => Ok(Json(json!({
                "results": [
                    {
                        "id": 101,
                        "title": "Delivery Partner",
                        "primary_details": { "Place": "Chennai" }
                    },
                    { "type": 1037, "title": "Promoted card" },
                    { "id": "b-7", "title": "Tele Caller" }
                ]
            }))),
            2 => Ok(Json(json!({ "status": "ok" }))),
            _ => Err(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    async fn spawn_feed() -> String {
        let app = Router::new().route("/jobs", get(jobs_handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/jobs", addr)
    }

    #[tokio::test]
    async fn test_http_source_decodes_page() {
        let source = HttpFeedSource::new(spawn_feed().await);

        let page = source.fetch_page(1).await.unwrap();
        assert_eq!(page.page, 1);
        let ids: Vec<&str> = page.jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["101", "b-7"]);
        assert_eq!(page.jobs[0].place(), Some("Chennai"));
    }

    #[tokio::test]
    async fn test_http_source_reports_bad_body_and_status() {
        let source = HttpFeedSource::new(spawn_feed().await);

        assert!(matches!(
            source.fetch_page(2).await,
            Err(FeedError::Malformed { page: 2, .. })
        ));
        assert_eq!(
            source.fetch_page(3).await,
            Err(FeedError::Status { page: 3, status: 500 })
        );
        assert_eq!(source.fetch_page(0).await, Err(FeedError::InvalidPage(0)));
    }

    #[tokio::test]
    async fn test_http_source_transport_failure() {
        // Nothing listens on port 9 locally.
        let source = HttpFeedSource::new("http://127.0.0.1:9/jobs");
        assert!(matches!(
            source.fetch_page(1).await,
            Err(FeedError::Transport { page: 1, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        assert!(matches!(
            decode_page(1, json!([1, 2])),
            Err(FeedError::Malformed { page: 1, .. })
        ));
    }

    #[test]
    fn test_decode_keeps_jobs_with_off_type_fields() {
        let body = json!({
            "results": [
                { "id": 1, "job_tags": null },
                { "id": 2, "salary_min": 15000.5 },
                { "id": 3, "contact_preference": { "preference": "1" } },
                { "id": 4 },
                { "id": true }
            ]
        });
        let page = decode_page(3, body).unwrap();

        let ids: Vec<&str> = page.jobs.iter().map(|job| job.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[tokio::test]
    async fn test_static_source_records_requests() {
        let source = StaticFeedSource::new().with_page(1, vec![Job::new("a")]);
        assert_eq!(source.fetch_page(1).await.unwrap().jobs.len(), 1);
        assert!(source.fetch_page(2).await.unwrap().jobs.is_empty());
        assert_eq!(source.requests(), vec![1, 2]);
    }
}
