use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://testapi.getlokalapp.com/common/jobs";

/// Most jobs the end-of-list trigger will load without a "has more" signal.
pub const DEFAULT_PAGE_CEILING: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Listing endpoint; `?page=<n>` is appended per request.
    pub base_url: String,
    pub page_ceiling: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_ceiling: DEFAULT_PAGE_CEILING,
        }
    }
}
