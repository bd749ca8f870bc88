//! Page rendering collaborator.
//!
//! `/api/scrape` and url-based `/api/parse` need the text of a rendered
//! page. Rendering sits behind the [`PageScraper`] trait; the headless
//! Chromium implementation is compiled in with the `browser` feature, and
//! without it every render fails with [`ScrapeError::Unavailable`].

pub mod clean;

#[cfg(feature = "browser")]
pub mod chromium;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScrapeError;

pub use clean::normalize_whitespace;

#[cfg(feature = "browser")]
pub use chromium::ChromiumScraper;

/// Default deadline for rendering one page.
pub const DEFAULT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(45);

/// A rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedPage {
    /// Full document HTML after rendering.
    pub raw_html: String,
    /// Inner HTML of `<body>` with scripts and styles removed.
    pub body_html: String,
    /// Normalized text content, one element per line.
    pub cleaned: String,
}

impl ScrapedPage {
    /// Length of the raw HTML in bytes.
    #[must_use]
    pub fn html_len(&self) -> usize {
        self.raw_html.len()
    }

    /// Length of the body HTML in bytes.
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body_html.len()
    }
}

/// Renders a URL and extracts its text.
#[async_trait]
pub trait PageScraper: Send + Sync {
    /// Renders `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`ScrapeError`] if the page cannot be rendered or has no body.
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, ScrapeError>;
}

/// Scraper used when no renderer is compiled in.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableScraper;

#[async_trait]
impl PageScraper for UnavailableScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, ScrapeError> {
        tracing::debug!(url, "scrape requested without a renderer");
        Err(ScrapeError::Unavailable(
            "rebuild with the `browser` feature to render pages".to_string(),
        ))
    }
}

/// Returns the scraper for this build.
#[must_use]
pub fn default_scraper() -> Arc<dyn PageScraper> {
    #[cfg(feature = "browser")]
    {
        Arc::new(ChromiumScraper)
    }
    #[cfg(not(feature = "browser"))]
    {
        Arc::new(UnavailableScraper)
    }
}

/// Renders `url` with `scraper`, giving up after `deadline`.
///
/// # Errors
///
/// Returns the scraper's error, or [`ScrapeError::Timeout`] when the
/// deadline elapses first.
pub async fn scrape_with_deadline(
    scraper: &dyn PageScraper,
    url: &str,
    deadline: Duration,
) -> Result<ScrapedPage, ScrapeError> {
    let started = std::time::Instant::now();
    let result = tokio::time::timeout(deadline, scraper.scrape(url))
        .await
        .unwrap_or_else(|_| Err(ScrapeError::Timeout(deadline)));

    match &result {
        Ok(page) => tracing::info!(
            url,
            html_len = page.html_len(),
            cleaned_len = page.cleaned.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "page rendered"
        ),
        Err(e) => tracing::warn!(url, error = %e, "page render failed"),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticScraper;

    #[async_trait]
    impl PageScraper for StaticScraper {
        async fn scrape(&self, _url: &str) -> Result<ScrapedPage, ScrapeError> {
            Ok(ScrapedPage {
                raw_html: "<html><body><p>hi</p></body></html>".to_string(),
                body_html: "<p>hi</p>".to_string(),
                cleaned: "hi".to_string(),
            })
        }
    }

    struct HangingScraper;

    #[async_trait]
    impl PageScraper for HangingScraper {
        async fn scrape(&self, _url: &str) -> Result<ScrapedPage, ScrapeError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(ScrapedPage::default())
        }
    }

    #[tokio::test]
    async fn test_scrape_within_deadline() {
        let deadline = Duration::from_secs(1);
        let page = scrape_with_deadline(&StaticScraper, "https://example.com", deadline)
            .await
            .unwrap();
        assert_eq!(page.cleaned, "hi");
        assert_eq!(page.html_len(), 35);
        assert_eq!(page.body_len(), 9);
    }

    #[tokio::test]
    async fn test_scrape_deadline_elapses() {
        let deadline = Duration::from_millis(20);
        let err = scrape_with_deadline(&HangingScraper, "https://example.com", deadline)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Timeout(d) if d == Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_unavailable_scraper() {
        let err = UnavailableScraper.scrape("https://example.com").await.unwrap_err();
        assert!(matches!(err, ScrapeError::Unavailable(_)));
        assert!(err.to_string().contains("browser"));
    }
}
