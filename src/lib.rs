// * page-scribe: render one page, clean it, print it as markdown.

pub mod config;
pub mod crawler;
pub mod engine;
pub mod network;
pub mod refinery;

pub use config::{BrowserConfig, CrawlerRunConfig, FetchMode};
pub use crawler::{CrawlError, CrawlResult, Crawler};
