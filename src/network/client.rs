use reqwest::header::HeaderMap;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::constants::HTTP_TIMEOUT_SECS;
use crate::config::BrowserConfig;
use crate::network::errors::NetworkError;
use crate::network::identity::IdentityProfile;

// * Body and status of a plain HTTP fetch
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub html: String,
    pub status: u16,
    pub final_url: String,
}

// * Plain HTTP engine: used for http/auto fetch modes and iframe documents.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    inner: Client,
}

impl HttpFetcher {
    pub fn new(config: &BrowserConfig) -> Result<Self, NetworkError> {
        let mut headers = HeaderMap::new();
        IdentityProfile::with_user_agent(config.user_agent.as_deref())
            .apply_to_headers(&mut headers)?;

        let mut builder = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS));

        // * Apply Proxy if provided
        if let Some(url) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(url)?);
        }

        Ok(Self {
            inner: builder.build()?,
        })
    }

    // * Fetches a URL; non-success statuses and empty bodies are errors.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, NetworkError> {
        let resp = self.inner.get(url).send().await?;
        let status = resp.status();
        let final_url = resp.url().to_string();

        if status.as_u16() == 403 || status.as_u16() == 429 {
            return Err(NetworkError::Blocked(status.as_u16()));
        }

        if !status.is_success() {
            return Err(NetworkError::Status(status.as_u16()));
        }

        let html = resp.text().await?;
        if html.trim().is_empty() {
            return Err(NetworkError::EmptyResponse);
        }

        debug!("Fetched {} ({} bytes, HTTP {})", final_url, html.len(), status.as_u16());

        Ok(FetchedPage {
            html,
            status: status.as_u16(),
            final_url,
        })
    }
}
