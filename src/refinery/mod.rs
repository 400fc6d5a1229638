// * The Refinery: turns fetched HTML into cleaned HTML, markdown, links and metadata.

pub mod content_cleaner;
pub mod iframes;
pub mod links;
pub mod markdown;
pub mod metadata;

pub use content_cleaner::{CleanedHtml, CleaningStats, ContentCleaner};
pub use iframes::{collect_iframes, iframe_body, inline_iframes, IframeRef};
pub use links::{collect_links, Link, Links};
pub use markdown::{MarkdownGenerator, MarkdownResult};
pub use metadata::PageMetadata;

use serde::{Deserialize, Serialize};

use crate::config::CrawlerRunConfig;

/// Everything derived from one page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefinedPage {
    pub cleaned_html: String,
    pub markdown: MarkdownResult,
    pub links: Links,
    pub metadata: PageMetadata,
    pub word_count: usize,
    pub stats: CleaningStats,
}

/// Processing pipeline bound to one run configuration
///
/// # Example
/// ```ignore
/// use page_scribe::refinery::Refinery;
///
/// let refinery = Refinery::new(&CrawlerRunConfig::default());
/// let page = refinery.process(html, "https://example.com/");
/// println!("{}", page.markdown);
/// ```
pub struct Refinery {
    cleaner: ContentCleaner,
    generator: MarkdownGenerator,
}

impl Refinery {
    pub fn new(config: &CrawlerRunConfig) -> Self {
        Self {
            cleaner: ContentCleaner::new(config),
            generator: MarkdownGenerator::new(config.citations),
        }
    }

    /// Runs the full pipeline.
    ///
    /// # Pipeline Steps:
    /// 1. Read metadata from the unpruned document
    /// 2. Prune the DOM (tags, overlays, external links, short blocks),
    ///    collecting links once tags and overlays are gone
    /// 3. Generate markdown from what is left
    pub fn process(&self, html: &str, base_url: &str) -> RefinedPage {
        let metadata = PageMetadata::extract(html);

        let cleaned = self.cleaner.clean(html, base_url);
        let markdown = self.generator.generate(&cleaned.html, base_url);

        RefinedPage {
            cleaned_html: cleaned.html,
            markdown,
            links: cleaned.links,
            metadata,
            word_count: cleaned.word_count,
            stats: cleaned.stats,
        }
    }
}
