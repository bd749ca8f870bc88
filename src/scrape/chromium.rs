//! Headless Chromium renderer built on chromiumoxide.
//!
//! Every scrape launches its own browser process, renders the page, pulls
//! the text out with a small script and shuts the browser down again. No
//! browser state is shared between requests.

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio::task::JoinHandle;

use crate::error::ScrapeError;
use crate::scrape::clean::normalize_whitespace;
use crate::scrape::{PageScraper, ScrapedPage};

/// Runs in the page. Strips scripts and styles from a copy of `<body>` and
/// collects the text of text-bearing elements, one per line.
const EXTRACT_BODY_JS: &str = r"(() => {
  const body = document.body;
  if (!body) return { found: false, bodyHtml: '', text: '' };
  const clone = body.cloneNode(true);
  clone.querySelectorAll('script, style, noscript').forEach((el) => el.remove());
  const lines = [];
  clone
    .querySelectorAll('p, h1, h2, h3, h4, h5, h6, li, a, td, th, div, span')
    .forEach((el) => {
      const text = (el.textContent || '').trim();
      if (text) lines.push(text);
    });
  return { found: true, bodyHtml: clone.innerHTML, text: lines.join('\n') };
})()";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractedBody {
    found: bool,
    body_html: String,
    text: String,
}

/// Renders pages in a fresh headless Chromium per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumScraper;

impl ChromiumScraper {
    async fn launch(&self) -> Result<(Browser, JoinHandle<()>), ScrapeError> {
        let config = BrowserConfig::builder()
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-gpu")
            .arg("--disable-extensions")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(|e| ScrapeError::Browser(format!("invalid browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Browser(format!("failed to launch browser: {e}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        Ok((browser, handler_task))
    }
}

#[async_trait]
impl PageScraper for ChromiumScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, ScrapeError> {
        let (mut browser, handler_task) = self.launch().await?;

        let result = render(&browser, url).await;

        if let Err(e) = browser.close().await {
            tracing::debug!(error = %e, "browser close failed");
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!(error = %e, "browser did not exit cleanly");
        }
        handler_task.abort();

        result
    }
}

async fn render(browser: &Browser, url: &str) -> Result<ScrapedPage, ScrapeError> {
    let navigation_error = |e: chromiumoxide::error::CdpError| ScrapeError::Navigation {
        url: url.to_string(),
        reason: e.to_string(),
    };

    let page: Page = browser.new_page(url).await.map_err(navigation_error)?;
    page.wait_for_navigation().await.map_err(navigation_error)?;

    let raw_html = page
        .content()
        .await
        .map_err(|e| ScrapeError::Browser(format!("failed to read document: {e}")))?;

    let extracted = page
        .evaluate(EXTRACT_BODY_JS)
        .await
        .map_err(|e| ScrapeError::Browser(format!("text extraction failed: {e}")))?
        .into_value::<ExtractedBody>()
        .map_err(|e| ScrapeError::Browser(format!("unexpected extraction result: {e}")))?;
    if !extracted.found {
        return Err(ScrapeError::NoBody);
    }

    Ok(ScrapedPage {
        raw_html,
        body_html: extracted.body_html,
        cleaned: normalize_whitespace(&extracted.text),
    })
}
