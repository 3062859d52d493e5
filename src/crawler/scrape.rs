use std::future::Future;
use std::time::Duration;

use log2::debug;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use super::config::CrawlerConfig;
use super::error::FetchError;

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// Anything that can turn a page url into the absolute urls it links to.
///
/// The orchestrator only depends on this, workers call it concurrently.
pub trait LinkSource: Send + Sync + 'static {
    fn fetch_links(&self, url: &Url) -> impl Future<Output = Result<Vec<Url>, FetchError>> + Send;
}

/// Resolves `link` against the page it was found on (RFC 3986 reference
/// resolution), so `../`, `./x`, `/x` and `//host/x` all become absolute.
/// Returns `None` for hrefs that can't be parsed, which callers skip.
pub fn resolve_link(page: &Url, link: &str) -> Option<Url> {
    page.join(link).ok()
}

/// Every anchor href in document order, duplicates included.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Resolved links of a page body. Unresolvable hrefs are dropped silently.
pub fn extract_links(html: &str, page: &Url) -> Vec<Url> {
    extract_hrefs(html)
        .iter()
        .filter_map(|href| resolve_link(page, href))
        .collect()
}

/// Fetches pages over HTTP and reports the links on them.
///
/// Cheap to clone, all clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    timeout: Duration,
}

impl PageFetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(Client::new(), config.request_timeout)
    }

    async fn fetch_body(&self, url: &Url) -> Result<String, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.clone(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::BadResponse {
                url: url.clone(),
                status,
                body,
            });
        }

        response.text().await.map_err(transport)
    }
}

impl LinkSource for PageFetcher {
    async fn fetch_links(&self, url: &Url) -> Result<Vec<Url>, FetchError> {
        let body = self.fetch_body(url).await?;
        let links = extract_links(&body, url);
        debug!("Found {} links on page {}", links.len(), url);
        Ok(links)
    }
}
