// * Crawler session: one browser config, any number of single-page runs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{BrowserConfig, ConfigError, CrawlerRunConfig, FetchMode};
use crate::engine::density::DensityMetrics;
use crate::engine::renderer::{BrowserSession, RenderError, RenderOptions};
use crate::network::{HttpFetcher, NetworkError};
use crate::refinery::{
    collect_iframes, iframe_body, inline_iframes, Links, MarkdownResult, PageMetadata, Refinery,
};

// * Base used for raw HTML, which has no address of its own
const RAW_BASE_URL: &str = "about:blank";

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Invalid URL '{0}': expected http(s)://, file:// or raw:")]
    InvalidUrl(String),

    #[error("Failed to read local file: {0}")]
    Io(#[from] std::io::Error),
}

// * Where a page comes from
#[derive(Debug, Clone, PartialEq)]
pub enum PageSource {
    Web(Url),
    File { url: Url, path: PathBuf },
    Raw(String),
}

impl PageSource {
    pub fn parse(input: &str) -> Result<Self, CrawlError> {
        let trimmed = input.trim_start();
        if let Some(html) = trimmed
            .strip_prefix("raw://")
            .or_else(|| trimmed.strip_prefix("raw:"))
        {
            return Ok(Self::Raw(html.to_string()));
        }

        let url = Url::parse(input.trim()).map_err(|_| CrawlError::InvalidUrl(input.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(Self::Web(url)),
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| CrawlError::InvalidUrl(input.to_string()))?;
                Ok(Self::File { url, path })
            }
            _ => Err(CrawlError::InvalidUrl(input.to_string())),
        }
    }
}

impl fmt::Display for PageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Web(url) => write!(f, "{}", url),
            Self::File { path, .. } => write!(f, "{}", path.display()),
            Self::Raw(html) => write!(f, "raw html ({} bytes)", html.len()),
        }
    }
}

// * Which path actually produced the HTML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchedVia {
    Browser,
    Http,
    File,
    Raw,
}

#[derive(Debug)]
struct FetchedHtml {
    html: String,
    final_url: String,
    status_code: Option<u16>,
    via: FetchedVia,
}

/// Outcome of a single crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub url: String,
    pub final_url: String,
    pub status_code: Option<u16>,
    /// HTML as fetched, before iframe inlining and cleaning
    pub html: String,
    pub cleaned_html: String,
    pub markdown: MarkdownResult,
    pub links: Links,
    pub metadata: PageMetadata,
    pub word_count: usize,
    pub fetched_via: FetchedVia,
    pub success: bool,
}

impl CrawlResult {
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A scoped crawler session.
///
/// The browser is launched on first use and lives until [`Crawler::close`]
/// (or drop, which aborts the CDP handler and lets Chromium exit).
pub struct Crawler {
    config: BrowserConfig,
    http: HttpFetcher,
    browser: Option<BrowserSession>,
}

impl Crawler {
    pub fn start(config: BrowserConfig) -> Result<Self, CrawlError> {
        config.validate()?;
        let http = HttpFetcher::new(&config)?;
        info!("Crawler session opened");

        Ok(Self {
            config,
            http,
            browser: None,
        })
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn browser_running(&self) -> bool {
        self.browser.is_some()
    }

    async fn browser(&mut self) -> Result<&BrowserSession, CrawlError> {
        let session = match self.browser.take() {
            Some(session) => session,
            None => BrowserSession::launch(&self.config).await?,
        };
        Ok(self.browser.insert(session))
    }

    /// Fetches one page and runs it through the refinery.
    pub async fn run(&mut self, url: &str, run: &CrawlerRunConfig) -> Result<CrawlResult, CrawlError> {
        let source = PageSource::parse(url)?;
        info!("Crawling {} (mode={})", source, run.fetch_mode);

        let fetched = match &source {
            PageSource::Raw(html) => FetchedHtml {
                html: html.clone(),
                final_url: RAW_BASE_URL.to_string(),
                status_code: None,
                via: FetchedVia::Raw,
            },
            PageSource::File { url: file_url, path } => FetchedHtml {
                html: tokio::fs::read_to_string(path).await?,
                final_url: file_url.to_string(),
                status_code: None,
                via: FetchedVia::File,
            },
            PageSource::Web(web_url) => self.fetch_web(web_url.as_str(), run).await?,
        };

        let mut html = fetched.html.clone();
        if run.process_iframes {
            let allow_network = matches!(source, PageSource::Web(_));
            html = self.process_iframes(&html, &fetched.final_url, allow_network).await;
        }

        let page = Refinery::new(run).process(&html, &fetched.final_url);
        if page.markdown.raw_markdown.is_empty() {
            warn!("No content survived cleaning for {}", source);
        }

        info!(
            "Crawled {} via {:?}: {} words, {} internal / {} external links",
            fetched.final_url,
            fetched.via,
            page.word_count,
            page.links.internal.len(),
            page.links.external.len()
        );

        Ok(CrawlResult {
            url: url.to_string(),
            final_url: fetched.final_url,
            status_code: fetched.status_code,
            html: fetched.html,
            cleaned_html: page.cleaned_html,
            markdown: page.markdown,
            links: page.links,
            metadata: page.metadata,
            word_count: page.word_count,
            fetched_via: fetched.via,
            success: true,
        })
    }

    async fn fetch_web(&mut self, url: &str, run: &CrawlerRunConfig) -> Result<FetchedHtml, CrawlError> {
        match run.fetch_mode {
            FetchMode::Browser => self.render(url, run).await,
            FetchMode::Http => Ok(self.fetch_http(url).await?),
            FetchMode::Auto => match self.fetch_http(url).await {
                Ok(page) if !DensityMetrics::needs_browser(&page.html) => Ok(page),
                Ok(_) => {
                    info!("Sparse HTTP body for {}, rendering in browser", url);
                    self.render(url, run).await
                }
                Err(e) => {
                    warn!("HTTP fetch failed for {} ({}), rendering in browser", url, e);
                    self.render(url, run).await
                }
            },
        }
    }

    async fn fetch_http(&self, url: &str) -> Result<FetchedHtml, NetworkError> {
        let page = self.http.fetch(url).await?;
        Ok(FetchedHtml {
            html: page.html,
            final_url: page.final_url,
            status_code: Some(page.status),
            via: FetchedVia::Http,
        })
    }

    async fn render(&mut self, url: &str, run: &CrawlerRunConfig) -> Result<FetchedHtml, CrawlError> {
        let options = RenderOptions::from_configs(&self.config, run);
        let rendered = self.browser().await?.render(url, &options).await?;
        Ok(FetchedHtml {
            html: rendered.html,
            final_url: rendered.final_url,
            status_code: None,
            via: FetchedVia::Browser,
        })
    }

    // * srcdoc first, then an HTTP fetch of src. Unresolvable frames stay as they are.
    async fn process_iframes(&self, html: &str, base_url: &str, allow_network: bool) -> String {
        let frames = collect_iframes(html, base_url);
        if frames.is_empty() {
            return html.to_string();
        }

        let mut bodies = HashMap::new();
        for frame in &frames {
            if let Some(doc) = &frame.srcdoc {
                bodies.insert(frame.index, iframe_body(doc));
                continue;
            }

            let Some(src) = frame.src.as_deref().filter(|_| allow_network) else {
                continue;
            };

            match self.http.fetch(src).await {
                Ok(page) => {
                    bodies.insert(frame.index, iframe_body(&page.html));
                }
                Err(e) => debug!("Skipping iframe {}: {}", src, e),
            }
        }

        debug!("Inlining {} of {} iframes", bodies.len(), frames.len());
        inline_iframes(html, &bodies)
    }

    /// Shuts the browser down, if one was launched.
    pub async fn close(mut self) {
        if let Some(browser) = self.browser.take() {
            browser.close().await;
        }
        info!("Crawler session closed");
    }
}
