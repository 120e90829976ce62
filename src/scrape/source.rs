//! Page retrieval
//!
//! The scraper only needs "give me the HTML at this URL"; `PageSource` is that
//! seam. `HttpSource` is the real implementation on top of reqwest.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER};
use reqwest::Client;
use std::future::Future;

use super::FetchError;
use crate::config::ScraperConfig;

/// A fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl Page {
    /// A 200 page with the given body
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// An empty page with the given status
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can fetch upstream pages
///
/// Implementations return `Ok` for any HTTP response, whatever its status; only
/// transport failures are errors.
pub trait PageSource {
    fn get(
        &self,
        url: &str,
        referer: Option<&str>,
    ) -> impl Future<Output = Result<Page, FetchError>> + Send;
}

/// Fetches pages over HTTP
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Builds a client with the configured User-Agent and timeout
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml"),
        );

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl PageSource for HttpSource {
    async fn get(&self, url: &str, referer: Option<&str>) -> Result<Page, FetchError> {
        let mut request = self.client.get(url);
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }

        let response = request.send().await.map_err(|e| classify(url, e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify(url, e))?;

        Ok(Page { status, body })
    }
}

/// Maps a reqwest failure onto the fetch error taxonomy
fn classify(url: &str, source: reqwest::Error) -> FetchError {
    if source.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            source,
        }
    }
}
