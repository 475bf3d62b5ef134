//! Link sources: where outbound article links come from
//!
//! The search engine only ever sees the [`LinkSource`] trait: give it an
//! article title, get back the titles that article links to, in document
//! order. [`ArticleSource`] is the production implementation backed by
//! Wikipedia; tests substitute in-memory graphs.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;

use crate::error::{Error, Result};

/// Anonymous request budget.
/// <https://api.wikimedia.org/wiki/Rate_limits#Anonymous_requests>
pub const ANON_REQUESTS_PER_HOUR: u32 = 500;

/// Personal API token request budget.
/// <https://api.wikimedia.org/wiki/Rate_limits#Personal_requests>
pub const AUTH_REQUESTS_PER_HOUR: u32 = 5000;

const DEFAULT_ENDPOINT: &str = "https://en.wikipedia.org";

/// Hyperlink prefix of article links in anonymously served pages.
const ANON_LINK_PREFIX: &str = "/wiki/";
/// Hyperlink prefix of article links in REST API page HTML.
const AUTH_LINK_PREFIX: &str = "./";

/// The reserved home page; linked from nearly every article and never a
/// useful hop.
const HOME_PAGE: &str = "Main_Page";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A provider of outbound links for one node of the link graph.
#[async_trait]
pub trait LinkSource: Send + Sync {
    /// Fetch the titles `title` links to, in document order.
    ///
    /// # Errors
    ///
    /// Any failure is fatal to the search that issued it; implementations
    /// do not retry.
    async fn outbound_links(&self, title: &str) -> Result<Vec<String>>;
}

/// Wikipedia-backed [`LinkSource`].
///
/// Anonymous by default; configuring a personal API token switches to the
/// REST endpoint, which carries a ten-fold request budget.
///
/// # Example
///
/// ```rust,no_run
/// use wikihop::source::{ArticleSource, LinkSource};
///
/// # async fn example() -> wikihop::Result<()> {
/// let source = ArticleSource::builder()
///     .access_token("my-personal-token")
///     .build();
///
/// let links = source.outbound_links("Rust_(programming_language)").await?;
/// println!("{} outbound links", links.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ArticleSource {
    client: reqwest::Client,
    access_token: Option<String>,
    endpoint: String,
}

impl ArticleSource {
    /// Create an anonymous source with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for `ArticleSource`
    #[must_use]
    pub fn builder() -> ArticleSourceBuilder {
        ArticleSourceBuilder::default()
    }

    /// The request budget of the configured tier, in requests per hour.
    #[must_use]
    pub fn requests_per_hour(&self) -> u32 {
        if self.access_token.is_some() {
            AUTH_REQUESTS_PER_HOUR
        } else {
            ANON_REQUESTS_PER_HOUR
        }
    }

    fn link_prefix(&self) -> &'static str {
        if self.access_token.is_some() {
            AUTH_LINK_PREFIX
        } else {
            ANON_LINK_PREFIX
        }
    }

    fn page_url(&self, title: &str) -> String {
        if self.access_token.is_some() {
            format!("{}/w/rest.php/v1/page/{title}/html", self.endpoint)
        } else {
            format!("{}/wiki/{title}", self.endpoint)
        }
    }

    /// Pull article titles out of a page's anchors.
    ///
    /// Keeps hrefs under `prefix`, strips the prefix and any `#fragment`
    /// suffix, and drops the home page, namespaced entries
    /// (`Help:`, `Talk:`, ...) and empty names. Document order is kept and
    /// duplicates are not collapsed; the visited set is the dedup point.
    fn parse_links(html: &str, prefix: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        // Static CSS selector "a[href]" is always valid
        #[allow(clippy::unwrap_used)]
        let link_selector = Selector::parse("a[href]").unwrap();

        let mut titles = Vec::new();
        for element in document.select(&link_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(name) = href.strip_prefix(prefix) else {
                continue;
            };
            let name = match name.find('#') {
                Some(idx) => &name[..idx],
                None => name,
            };
            if name.is_empty() || name == HOME_PAGE || name.contains(':') {
                continue;
            }
            titles.push(name.to_string());
        }
        titles
    }
}

impl Default for ArticleSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkSource for ArticleSource {
    async fn outbound_links(&self, title: &str) -> Result<Vec<String>> {
        let url = self.page_url(title);
        tracing::trace!(%title, %url, "fetching article");

        let mut request = self.client.get(&url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::network(format!("failed to fetch '{title}': {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http(format!("HTTP {status} fetching '{url}'")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::network(format!("failed to read body of '{url}': {e}")))?;

        Ok(Self::parse_links(&html, self.link_prefix()))
    }
}

/// Builder for [`ArticleSource`]
#[derive(Debug, Clone, Default)]
pub struct ArticleSourceBuilder {
    access_token: Option<String>,
    endpoint: Option<String>,
}

impl ArticleSourceBuilder {
    /// Use a personal API token.
    ///
    /// Switches to the REST endpoint and its larger request budget.
    /// <https://api.wikimedia.org/wiki/Authentication#Personal_API_tokens>
    #[must_use]
    pub fn access_token<S: Into<String>>(mut self, token: S) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Override the base endpoint (a mirror, or a test server).
    ///
    /// Default: `https://en.wikipedia.org`.
    #[must_use]
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Build the [`ArticleSource`]
    #[must_use]
    pub fn build(self) -> ArticleSource {
        ArticleSource {
            client: reqwest::Client::builder()
                .user_agent(concat!("wikihop/", env!("CARGO_PKG_VERSION")))
                .timeout(DEFAULT_REQUEST_TIMEOUT)
                .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
                .build()
                .unwrap_or_default(),
            access_token: self.access_token,
            endpoint: self
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        }
    }
}
