// * Configuration Constants
// * Central location for all thresholds, timeouts and defaults

// * Page fetch timeout in milliseconds
pub const PAGE_TIMEOUT_MS: u64 = 60_000;

// * Settle time after navigation before the DOM is captured
pub const DELAY_BEFORE_RETURN_MS: u64 = 500;

// * HTTP client request timeout in seconds
pub const HTTP_TIMEOUT_SECS: u64 = 30;

// * Library-level minimum word count for a retained content block
pub const MIN_WORD_THRESHOLD: usize = 1;

// * Word count threshold used by the stock run configuration
pub const DEFAULT_WORD_COUNT_THRESHOLD: usize = 50;

// * Stock viewport
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1366;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 768;

// * Page crawled when no URL is given
pub const DEFAULT_URL: &str = "https://www.nbcnews.com/artificial-intelligence";

// * z-index above which a fixed/sticky element is treated as an overlay
pub const OVERLAY_Z_INDEX: i32 = 999;

// * Tags that never carry readable content
pub const ALWAYS_EXCLUDED_TAGS: &[&str] = &["script", "style", "noscript", "svg"];
