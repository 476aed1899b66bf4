//! Link-following pagination over FHIR search bundles
//!
//! A search result arrives as a sequence of `Bundle` pages. Each page holds
//! an `entry` array and a `link` array; the link with relation `next` is the
//! cursor for the following page. [`Paginator`] walks the chain until no
//! `next` link is left and hands back every entry in page order.

use std::fmt;
use std::num::NonZeroUsize;

use indicatif::ProgressBar;
use serde::Deserialize;
use serde_json::Value;

use crate::error::FetchError;

/// Link relation naming the following page
pub const NEXT_RELATION: &str = "next";

/// One page of a search result
#[derive(Debug, Default, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub entry: Vec<Value>,
    #[serde(default)]
    pub link: Vec<BundleLink>,
}

#[derive(Debug, Deserialize)]
pub struct BundleLink {
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Bundle {
    /// URL of the first `next` link, if it has a non-empty one
    pub fn next_link(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|l| l.relation.as_deref() == Some(NEXT_RELATION))
            .and_then(|l| l.url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// What to do when a page cannot be fetched or an entry cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Log, stop paginating (or skip the entry), keep what was collected
    #[default]
    Partial,
    /// Fail the whole export
    Abort,
}

impl fmt::Display for OnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Partial => f.write_str("partial"),
            Self::Abort => f.write_str("abort"),
        }
    }
}

/// Anything that can turn a page URL into a [`Bundle`].
pub trait PageSource {
    fn fetch(&mut self, url: &str) -> Result<Bundle, FetchError>;
}

impl<S: PageSource + ?Sized> PageSource for &mut S {
    fn fetch(&mut self, url: &str) -> Result<Bundle, FetchError> {
        (**self).fetch(url)
    }
}

/// Entries gathered by one pagination run
#[derive(Debug, Default)]
pub struct Collected {
    pub entries: Vec<Value>,
    /// Requests issued, including a failed last one
    pub requests: usize,
    /// Pages that were fetched and decoded
    pub pages: usize,
    /// Failure that ended pagination early under [`OnError::Partial`]
    pub interrupted: Option<FetchError>,
    /// Stopped by the page limit while a `next` link was still pending
    pub truncated: bool,
}

impl Collected {
    /// True when every page of the chain was read
    pub fn is_complete(&self) -> bool {
        self.interrupted.is_none() && !self.truncated
    }
}

/// Follows `next` links from a start URL, accumulating entries.
#[derive(Debug)]
pub struct Paginator<S> {
    source: S,
    on_error: OnError,
    max_pages: Option<NonZeroUsize>,
}

impl<S: PageSource> Paginator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            on_error: OnError::default(),
            max_pages: None,
        }
    }

    pub fn on_error(mut self, on_error: OnError) -> Self {
        self.on_error = on_error;
        self
    }

    /// Cap the number of requests per run (`None` = follow every link)
    pub fn max_pages(mut self, max_pages: Option<NonZeroUsize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch `start_url` and every page linked from it.
    ///
    /// Under [`OnError::Abort`] the first failed page is returned as `Err`;
    /// under [`OnError::Partial`] it is logged and recorded in
    /// [`Collected::interrupted`].
    pub fn collect(&mut self, start_url: &str, pb: &ProgressBar) -> Result<Collected, FetchError> {
        let mut out = Collected::default();
        let mut next = Some(start_url.to_string());

        while let Some(url) = next.take() {
            if self.max_pages.is_some_and(|max| out.requests >= max.get()) {
                log::warn!(
                    "Page limit ({}) reached, not following {url}",
                    out.requests
                );
                out.truncated = true;
                break;
            }

            out.requests += 1;
            log::debug!("GET {url}");
            let page = match self.source.fetch(&url) {
                Ok(page) => page,
                Err(e) if self.on_error == OnError::Abort => return Err(e),
                Err(e) => {
                    log::error!("Failed to retrieve page {}: {e}", out.requests);
                    out.interrupted = Some(e);
                    break;
                }
            };

            next = page.next_link().map(|link| resolve_link(&url, link));
            out.pages += 1;
            out.entries.extend(page.entry);
            pb.set_message(format!(
                "page {} ({} entries)",
                out.pages,
                out.entries.len()
            ));
        }

        log::debug!(
            "Collected {} entries from {} pages",
            out.entries.len(),
            out.pages
        );
        Ok(out)
    }
}

/// Resolve a possibly relative `next` link against the page it came from
fn resolve_link(current: &str, link: &str) -> String {
    match reqwest::Url::parse(current).and_then(|base| base.join(link)) {
        Ok(url) => url.into(),
        Err(_) => link.to_string(),
    }
}
