// * Per-request crawl options

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::constants::{
    ALWAYS_EXCLUDED_TAGS, DEFAULT_WORD_COUNT_THRESHOLD, DELAY_BEFORE_RETURN_MS, PAGE_TIMEOUT_MS,
};

// * How the page HTML is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    // * Full Chromium render
    #[default]
    Browser,
    // * Plain HTTP GET, no script execution
    Http,
    // * HTTP first, escalate to the browser when the page looks script-rendered
    Auto,
}

impl FromStr for FetchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "browser" => Ok(Self::Browser),
            "http" => Ok(Self::Http),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown fetch mode '{}'", other)),
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Browser => "browser",
            Self::Http => "http",
            Self::Auto => "auto",
        };
        f.write_str(name)
    }
}

/// Options controlling content filtering during a single fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerRunConfig {
    /// Minimum words per retained content block
    pub word_count_threshold: usize,
    pub exclude_external_links: bool,
    /// Remove popups, modals and cookie banners
    pub remove_overlay_elements: bool,
    /// Inline iframe documents into the page
    pub process_iframes: bool,
    pub fetch_mode: FetchMode,
    pub page_timeout_ms: u64,
    pub delay_before_return_ms: u64,
    /// Removed in addition to the always-excluded tags
    pub excluded_tags: Vec<String>,
    /// Produce citation-style markdown alongside the raw output
    pub citations: bool,
}

impl Default for CrawlerRunConfig {
    fn default() -> Self {
        Self {
            word_count_threshold: DEFAULT_WORD_COUNT_THRESHOLD,
            exclude_external_links: true,
            remove_overlay_elements: true,
            process_iframes: true,
            fetch_mode: FetchMode::Browser,
            page_timeout_ms: PAGE_TIMEOUT_MS,
            delay_before_return_ms: DELAY_BEFORE_RETURN_MS,
            excluded_tags: Vec::new(),
            citations: true,
        }
    }
}

impl CrawlerRunConfig {
    // * Always-excluded tags followed by user additions, lowercased and deduplicated
    pub fn all_excluded_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = ALWAYS_EXCLUDED_TAGS.iter().map(|t| t.to_string()).collect();
        for tag in &self.excluded_tags {
            let tag = tag.trim().to_ascii_lowercase();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }
}
