//! Pagination and deduplication over the job feed.
//!
//! Pages are pulled strictly in order starting at 1, at most one at a time.
//! The merged list only ever grows: a job whose id was already seen on an
//! earlier page (or earlier in the same page) is dropped, so the list keeps
//! first-seen order. A page that contributes nothing new is taken as the end
//! of the feed, since the remote API never says whether more pages exist.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use jobs_common::{FeedError, Job, JobCard, JobId};
use tracing::{debug, info, warn};

use crate::source::FeedSource;

/// Result of asking the paginator for more jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page added `added` previously unseen jobs.
    Loaded { page: u32, added: usize },
    /// The page had nothing new; no further pages are fetched automatically.
    Exhausted { page: u32 },
    /// Another fetch was already in flight; this request was dropped.
    Skipped,
    /// Enough jobs are loaded; the end-of-list trigger did not fetch.
    CeilingReached,
    /// The feed was already exhausted; the end-of-list trigger did not fetch.
    EndOfFeed,
    /// The fetch failed; nothing changed and the same page is retried next time.
    Failed { page: u32, error: FeedError },
}

#[derive(Debug)]
struct FeedState {
    jobs: Vec<Job>,
    seen_ids: HashSet<JobId>,
    next_page: u32,
    exhausted: bool,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            jobs: Vec::new(),
            seen_ids: HashSet::new(),
            next_page: 1,
            exhausted: false,
        }
    }
}

/// Clears the in-flight flag when the fetch finishes or its future is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The session's job feed.
pub struct Paginator {
    source: Arc<dyn FeedSource>,
    ceiling: usize,
    in_flight: AtomicBool,
    state: Mutex<FeedState>,
}

impl Paginator {
    pub fn new(source: Arc<dyn FeedSource>, ceiling: usize) -> Self {
        Self {
            source,
            ceiling,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(FeedState::default()),
        }
    }

    // The lock is never held across an await, so a poisoned state is still
    // consistent.
    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn claim(&self) -> Option<InFlight<'_>> {
        match self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Some(InFlight(&self.in_flight)),
            Err(_) => {
                debug!("page fetch already in flight, dropping request");
                None
            }
        }
    }

    /// Fetches the next page and merges its unseen jobs.
    pub async fn load_next(&self) -> LoadOutcome {
        match self.claim() {
            Some(claim) => self.fetch_next(claim).await,
            None => LoadOutcome::Skipped,
        }
    }

    /// End-of-list trigger: loads more only while below the ceiling and
    /// before the feed has been found exhausted.
    pub async fn on_end_reached(&self) -> LoadOutcome {
        // Checked while holding the claim, so a fetch that finishes
        // concurrently is already merged.
        let Some(claim) = self.claim() else {
            return LoadOutcome::Skipped;
        };
        {
            let state = self.state();
            if state.exhausted {
                return LoadOutcome::EndOfFeed;
            }
            if state.jobs.len() >= self.ceiling {
                return LoadOutcome::CeilingReached;
            }
        }
        self.fetch_next(claim).await
    }

    async fn fetch_next(&self, _claim: InFlight<'_>) -> LoadOutcome {
        let page = self.state().next_page;
        match self.source.fetch_page(page).await {
            Ok(fetched) => self.merge(page, fetched.jobs),
            Err(error) => {
                warn!(page, %error, "failed to load job page, keeping what we have");
                LoadOutcome::Failed { page, error }
            }
        }
    }

    fn merge(&self, page: u32, jobs: Vec<Job>) -> LoadOutcome {
        let mut state = self.state();
        let fetched = jobs.len();

        let mut added = 0;
        for job in jobs {
            if state.seen_ids.insert(job.id.clone()) {
                state.jobs.push(job);
                added += 1;
            }
        }
        state.next_page = page + 1;

        if added == 0 {
            state.exhausted = true;
            info!(page, fetched, "page brought no new jobs, treating feed as exhausted");
            LoadOutcome::Exhausted { page }
        } else {
            info!(page, fetched, added, total = state.jobs.len(), "merged job page");
            LoadOutcome::Loaded { page, added }
        }
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.state().jobs.clone()
    }

    pub fn cards(&self) -> Vec<JobCard> {
        self.state().jobs.iter().map(JobCard::from).collect()
    }

    pub fn get(&self, id: &JobId) -> Option<Job> {
        self.state().jobs.iter().find(|job| &job.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn seen_count(&self) -> usize {
        self.state().seen_ids.len()
    }

    pub fn next_page(&self) -> u32 {
        self.state().next_page
    }

    /// True once any page has been fetched successfully.
    pub fn has_loaded(&self) -> bool {
        self.next_page() > 1
    }

    pub fn is_exhausted(&self) -> bool {
        self.state().exhausted
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }
}
