//! Remote job feed
//!
//! Fetches pages from the remote listing endpoint, merges them into a
//! deduplicated job list, and resolves single jobs for the detail view.

pub mod config;
pub mod detail;
pub mod paginator;
pub mod salary;
pub mod source;

pub use config::FeedConfig;
pub use detail::{DetailResolver, JobDetail};
pub use paginator::{LoadOutcome, Paginator};
pub use salary::{SalaryRange, parse_salary_range};
pub use source::{FeedSource, HttpFeedSource, StaticFeedSource};
