//! Runtime settings.
//!
//! [`Settings`] is assembled once from command-line flags (with
//! `PAGEQUERY_*` environment fallbacks), validated, and shared read-only
//! with every request afterwards.

use std::net::SocketAddr;
use std::time::Duration;

use crate::chunking::DEFAULT_MAX_CHUNK_CHARS;
use crate::error::{Error, Result};
use crate::ollama::{DEFAULT_BASE_URL, DEFAULT_CLIENT_TIMEOUT, OllamaClient};
use crate::query::{DEFAULT_CHUNK_TIMEOUT, PromptTemplate};
use crate::scrape::DEFAULT_SCRAPE_TIMEOUT;

/// Model used when a request leaves it blank.
pub const DEFAULT_MODEL: &str = "gemma2:2b";

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Validated service settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Address the HTTP server listens on.
    pub bind: SocketAddr,
    /// Base URL of the inference service.
    pub ollama_url: String,
    /// Model used when a request does not name one.
    pub default_model: String,
    /// Chunk size used when a request does not set a positive one.
    pub max_chunk_chars: usize,
    /// Ask the inference service for streamed replies.
    pub streaming: bool,
    /// Overall timeout of one generation request.
    pub client_timeout: Duration,
    /// Deadline for one chunk; `None` disables it.
    pub chunk_timeout: Option<Duration>,
    /// Deadline for rendering one page.
    pub scrape_timeout: Duration,
    /// Prompt template for every chunk.
    pub prompt: PromptTemplate,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            ollama_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            streaming: true,
            client_timeout: DEFAULT_CLIENT_TIMEOUT,
            chunk_timeout: Some(DEFAULT_CHUNK_TIMEOUT),
            scrape_timeout: DEFAULT_SCRAPE_TIMEOUT,
            prompt: PromptTemplate::default(),
        }
    }
}

impl Settings {
    /// Checks the settings for values the service cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        let url = self.ollama_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::config(format!(
                "ollama url must start with http:// or https://, got '{}'",
                self.ollama_url
            )));
        }
        if self.default_model.trim().is_empty() {
            return Err(Error::config("default model must not be empty"));
        }
        if self.client_timeout.is_zero() {
            return Err(Error::config("client timeout must be greater than zero"));
        }
        if self.scrape_timeout.is_zero() {
            return Err(Error::config("scrape timeout must be greater than zero"));
        }
        Ok(())
    }

    /// Returns the requested model, or the default when it is missing or blank.
    #[must_use]
    pub fn resolve_model(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_model)
            .to_string()
    }

    /// Builds the inference client these settings describe.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn ollama_client(&self) -> Result<OllamaClient> {
        Ok(OllamaClient::new(self.ollama_url.trim(), self.client_timeout)?
            .with_streaming(self.streaming))
    }
}

/// Converts a seconds count into an optional deadline, `0` meaning none.
#[must_use]
pub const fn optional_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}
