//! HTTP routes over the job feed and the bookmark reconciler.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use jobs_bookmarks::{BookmarkError, BookmarkList, Notice, Reconciler};
use jobs_common::{JobCard, JobId, ResolveError, StoredBookmark};
use jobs_feed::{DetailResolver, JobDetail, LoadOutcome, Paginator};
use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::error;

/// Long-lived handles shared by every request.
pub struct AppState {
    pub feed: Paginator,
    pub resolver: DetailResolver,
    pub reconciler: Reconciler,
    pub bookmarks: Mutex<BookmarkList>,
}

impl AppState {
    pub fn new(feed: Paginator, resolver: DetailResolver, reconciler: Reconciler) -> Self {
        let bookmarks = Mutex::new(BookmarkList::new(reconciler.clone()));
        Self {
            feed,
            resolver,
            reconciler,
            bookmarks,
        }
    }
}

#[derive(Debug, Serialize)]
struct OutcomeView {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    added: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<LoadOutcome> for OutcomeView {
    fn from(outcome: LoadOutcome) -> Self {
        let (status, page, added, error) = match outcome {
            LoadOutcome::Loaded { page, added } => ("loaded", Some(page), Some(added), None),
            LoadOutcome::Exhausted { page } => ("exhausted", Some(page), None, None),
            LoadOutcome::Skipped => ("skipped", None, None, None),
            LoadOutcome::CeilingReached => ("ceiling_reached", None, None, None),
            LoadOutcome::EndOfFeed => ("end_of_feed", None, None, None),
            LoadOutcome::Failed { page, error } => {
                ("failed", Some(page), None, Some(error.to_string()))
            }
        };
        Self {
            status,
            page,
            added,
            error,
        }
    }
}

/// Response for the job list endpoints
#[derive(Debug, Serialize)]
struct JobListResponse {
    jobs: Vec<JobCard>,
    next_page: u32,
    exhausted: bool,
    loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<OutcomeView>,
}

fn job_list(feed: &Paginator, outcome: Option<LoadOutcome>) -> Json<JobListResponse> {
    Json(JobListResponse {
        jobs: feed.cards(),
        next_page: feed.next_page(),
        exhausted: feed.is_exhausted(),
        loading: feed.is_loading(),
        outcome: outcome.map(OutcomeView::from),
    })
}

fn notice_response(status: StatusCode, notice: Notice, extra: serde_json::Value) -> Response {
    let mut body = json!({ "notice": notice });
    if let (Some(body), serde_json::Value::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }
    (status, Json(body)).into_response()
}

fn resolve_error(err: ResolveError) -> Response {
    match err {
        ResolveError::NotFound(_) => {
            (StatusCode::NOT_FOUND, Json(json!({ "error": "Job not found" }))).into_response()
        }
        ResolveError::Feed(e) => {
            error!(error = %e, "could not fetch job detail");
            let body = Json(json!({ "error": "Error fetching data" }));
            (StatusCode::BAD_GATEWAY, body).into_response()
        }
    }
}

/// Handler for GET /jobs. Loads the first page if nothing has been loaded yet.
async fn list_jobs(State(state): State<Arc<AppState>>) -> Json<JobListResponse> {
    let outcome = if state.feed.has_loaded() {
        None
    } else {
        Some(state.feed.load_next().await)
    };
    job_list(&state.feed, outcome)
}

/// Handler for POST /feed/more, sent when the client scrolled near the end.
async fn load_more(State(state): State<Arc<AppState>>) -> Json<JobListResponse> {
    let outcome = state.feed.on_end_reached().await;
    job_list(&state.feed, Some(outcome))
}

/// Handler for GET /jobs/{id}
async fn job_detail(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.resolver.resolve(&JobId::from(id)).await {
        Ok(job) => Json(JobDetail::from(job)).into_response(),
        Err(e) => resolve_error(e),
    }
}

/// Handler for GET /jobs/{id}/bookmark
async fn bookmark_status(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.reconciler.is_bookmarked(&JobId::from(id)).await {
        Ok(bookmarked) => Json(json!({ "bookmarked": bookmarked })).into_response(),
        Err(e) => {
            error!(error = %e, "could not check bookmark status");
            notice_response(StatusCode::INTERNAL_SERVER_ERROR, Notice::LoadFailed, json!({}))
        }
    }
}

/// Handler for POST /jobs/{id}/bookmark
///
/// Uses the copy already in the feed when there is one, otherwise resolves
/// the job the same way the detail view does.
async fn add_bookmark(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let id = JobId::from(id);
    let job = match state.feed.get(&id) {
        Some(job) => job,
        None => match state.resolver.resolve(&id).await {
            Ok(job) => job,
            Err(e) => return resolve_error(e),
        },
    };

    match state.reconciler.add(&job).await {
        Ok(outcome) => notice_response(
            StatusCode::OK,
            Notice::from(&outcome),
            json!({ "bookmarked": true }),
        ),
        Err(BookmarkError::InvalidJob) => {
            notice_response(StatusCode::BAD_REQUEST, Notice::InvalidJob, json!({}))
        }
        Err(BookmarkError::Store(_)) => notice_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            Notice::SaveFailed,
            json!({ "bookmarked": false }),
        ),
    }
}

fn bookmark_items(list: &BookmarkList) -> Vec<StoredBookmark> {
    list.items().to_vec()
}

/// Handler for GET /bookmarks
async fn list_bookmarks(State(state): State<Arc<AppState>>) -> Response {
    let mut list = state.bookmarks.lock().await;
    match list.refresh().await {
        Ok(()) => Json(json!({ "bookmarks": bookmark_items(&list) })).into_response(),
        Err(notice) => notice_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            notice,
            json!({ "bookmarks": bookmark_items(&list) }),
        ),
    }
}

/// Handler for DELETE /bookmarks/{job_id}
async fn remove_bookmark(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Response {
    let mut list = state.bookmarks.lock().await;
    let (status, notice) = match list.remove(&JobId::from(job_id)).await {
        Ok(notice) => (StatusCode::OK, notice),
        Err(notice) => (StatusCode::INTERNAL_SERVER_ERROR, notice),
    };
    notice_response(status, notice, json!({ "bookmarks": bookmark_items(&list) }))
}

/// Handler for GET / (root)
async fn root_handler() -> &'static str {
    "💼 Job Board API\n\nEndpoints:\n  GET    /jobs                - Loaded jobs (first page on first call)\n  POST   /feed/more           - Load the next page\n  GET    /jobs/{id}           - Job detail\n  GET    /jobs/{id}/bookmark  - Is the job bookmarked?\n  POST   /jobs/{id}/bookmark  - Bookmark the job\n  GET    /bookmarks           - Bookmarked jobs\n  DELETE /bookmarks/{job_id}  - Remove a bookmark"
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/jobs", get(list_jobs))
        // Kept outside /jobs so every /jobs/{id} stays a job id.
        .route("/feed/more", post(load_more))
        .route("/jobs/{id}", get(job_detail))
        .route("/jobs/{id}/bookmark", get(bookmark_status).post(add_bookmark))
        .route("/bookmarks", get(list_bookmarks))
        .route("/bookmarks/{job_id}", delete(remove_bookmark))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use jobs_bookmarks::CollectionStore;
    use jobs_common::{FeedError, Job};
    use jobs_feed::StaticFeedSource;
    use serde_json::Value;
    use tower::ServiceExt;

    fn router_with(source: StaticFeedSource) -> (Router, CollectionStore) {
        let source = Arc::new(source);
        let store = CollectionStore::new();
        let state = AppState::new(
            Paginator::new(source.clone(), 10),
            DetailResolver::new(source),
            Reconciler::new(Arc::new(store.clone())),
        );
        (build_router(Arc::new(state)), store)
    }

    fn feed() -> StaticFeedSource {
        StaticFeedSource::new()
            .with_page(1, vec![Job::new("a").with_title("Cook"), Job::new("b")])
            .with_page(2, vec![Job::new("b"), Job::new("c")])
    }

    async fn call(router: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn job_ids(body: &Value) -> Vec<String> {
        body["jobs"]
            .as_array()
            .unwrap()
            .iter()
            .map(|j| j["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_job_list_loads_and_paginates() {
        let (router, _) = router_with(feed());

        let (status, body) = call(&router, Method::GET, "/jobs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(job_ids(&body), vec!["a", "b"]);
        assert_eq!(body["outcome"]["status"], "loaded");
        assert_eq!(body["jobs"][1]["title"], "No Title Available");

        // Already loaded: no new fetch.
        let (_, body) = call(&router, Method::GET, "/jobs").await;
        assert!(body.get("outcome").is_none());

        let (_, body) = call(&router, Method::POST, "/feed/more").await;
        assert_eq!(job_ids(&body), vec!["a", "b", "c"]);

        let (_, body) = call(&router, Method::POST, "/feed/more").await;
        assert_eq!(body["outcome"]["status"], "exhausted");
        assert_eq!(body["exhausted"], true);

        let (_, body) = call(&router, Method::POST, "/feed/more").await;
        assert_eq!(body["outcome"]["status"], "end_of_feed");
    }

    #[tokio::test]
    async fn test_feed_failure_is_reported_not_fatal() {
        let source = StaticFeedSource::new().with_failure(
            1,
            FeedError::Status { page: 1, status: 503 },
        );
        let (router, _) = router_with(source);

        let (status, body) = call(&router, Method::GET, "/jobs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"]["status"], "failed");
        assert!(body["jobs"].as_array().unwrap().is_empty());

        let (status, body) = call(&router, Method::GET, "/jobs/a").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Error fetching data");
    }

    #[tokio::test]
    async fn test_job_named_more_is_a_plain_detail_route() {
        let source =
            StaticFeedSource::new().with_page(1, vec![Job::new("more").with_title("Porter")]);
        let (router, _) = router_with(source);

        let (status, body) = call(&router, Method::GET, "/jobs/more").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Porter");

        let (status, _) = call(&router, Method::POST, "/jobs/more/bookmark").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_job_detail() {
        let (router, _) = router_with(feed());

        let (status, body) = call(&router, Method::GET, "/jobs/a").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Cook");
        assert_eq!(body["description"][0], "No description available");

        // Only page 1 is searched.
        let (status, body) = call(&router, Method::GET, "/jobs/c").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Job not found");
    }

    #[tokio::test]
    async fn test_bookmark_flow() {
        let (router, store) = router_with(feed());

        let (_, body) = call(&router, Method::GET, "/jobs/a/bookmark").await;
        assert_eq!(body["bookmarked"], false);

        let (status, body) = call(&router, Method::POST, "/jobs/a/bookmark").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notice"]["message"], "Job added to bookmarks!");

        let (status, body) = call(&router, Method::POST, "/jobs/a/bookmark").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notice"]["message"], "Job already bookmarked.");
        assert_eq!(store.len(), 1);

        let (_, body) = call(&router, Method::GET, "/jobs/a/bookmark").await;
        assert_eq!(body["bookmarked"], true);

        let (_, body) = call(&router, Method::GET, "/bookmarks").await;
        assert_eq!(body["bookmarks"][0]["id"], "a");
        assert_eq!(body["bookmarks"][0]["title"], "Cook");
        assert_eq!(body["bookmarks"][0]["company"], "Unknown Company");

        let (status, body) = call(&router, Method::DELETE, "/bookmarks/a").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notice"]["message"], "Job removed from bookmarks!");
        assert!(body["bookmarks"].as_array().unwrap().is_empty());

        let (status, _) = call(&router, Method::DELETE, "/bookmarks/a").await;
        assert_eq!(status, StatusCode::OK);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_bookmarking_unknown_job() {
        let (router, store) = router_with(feed());

        let (status, _) = call(&router, Method::POST, "/jobs/zzz/bookmark").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_bookmark_uses_loaded_feed_beyond_first_page() {
        let (router, store) = router_with(feed());
        call(&router, Method::GET, "/jobs").await;
        call(&router, Method::POST, "/feed/more").await;

        // "c" only exists on page 2, but the list already has it.
        let (status, _) = call(&router, Method::POST, "/jobs/c/bookmark").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.len(), 1);
    }
}
