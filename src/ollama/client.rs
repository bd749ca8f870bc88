//! Generation client for the Ollama generate API.

use crate::error::{DecodeError, GenerationError};
use crate::ollama::decoder::decode_stream;
use crate::ollama::types::GenerateRequest;
use async_trait::async_trait;
use std::time::Duration;

/// Default Ollama API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default overall timeout for one generation request.
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(120);

/// A text-generation backend.
///
/// One call produces the complete answer for one prompt. Implementations must
/// be cancel-safe: dropping the returned future abandons the request.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generates text for `prompt` with `model`.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] describing why no usable text was produced.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;
}

/// Client for `POST /api/generate`.
///
/// # Examples
///
/// ```no_run
/// use pagequery::ollama::OllamaClient;
/// use std::time::Duration;
///
/// let client = OllamaClient::new("http://localhost:11434", Duration::from_secs(120))
///     .unwrap()
///     .with_streaming(false);
/// assert_eq!(client.generate_url(), "http://localhost:11434/api/generate");
/// ```
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    streaming: bool,
    timeout: Duration,
    http: reqwest::Client,
}

impl OllamaClient {
    /// Creates a client for the service at `base_url`.
    ///
    /// Streaming is enabled by default. `timeout` bounds the whole request,
    /// body included.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Network`] if the HTTP client cannot be built
    /// (for example, no TLS backend could be initialized).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GenerationError::Network)?;

        Ok(Self {
            base_url: base_url.into(),
            streaming: true,
            timeout,
            http,
        })
    }

    /// Sets whether the service is asked to stream its reply.
    #[must_use]
    pub const fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Returns whether streaming replies are requested.
    #[must_use]
    pub const fn streaming(&self) -> bool {
        self.streaming
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the generate endpoint URL.
    #[must_use]
    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    fn map_send_error(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(self.timeout)
        } else {
            GenerationError::Network(err)
        }
    }

    fn map_decode_error(&self, err: DecodeError) -> GenerationError {
        let DecodeError::StreamRead(source) = &err;
        let timed_out = source
            .downcast_ref::<reqwest::Error>()
            .is_some_and(reqwest::Error::is_timeout);
        if timed_out {
            GenerationError::Timeout(self.timeout)
        } else {
            GenerationError::Decode(err)
        }
    }
}

#[async_trait]
impl Generator for OllamaClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let url = self.generate_url();
        let request = GenerateRequest {
            model,
            prompt,
            stream: self.streaming,
        };

        tracing::debug!(
            url = %url,
            model,
            prompt_len = prompt.len(),
            stream = self.streaming,
            "sending generate request"
        );

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => format!("<failed to read body: {e}>"),
            };
            tracing::warn!(
                status = status.as_u16(),
                body_len = body.len(),
                "inference service error"
            );
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let text = decode_stream(response.bytes_stream())
            .await
            .map_err(|e| self.map_decode_error(e))?;

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        tracing::debug!(model, answer_len = text.len(), "generate request complete");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> OllamaClient {
        OllamaClient::new(base_url, DEFAULT_CLIENT_TIMEOUT).unwrap()
    }

    #[test]
    fn test_defaults() {
        let client = client(DEFAULT_BASE_URL);
        assert!(client.streaming());
        assert_eq!(client.timeout(), Duration::from_secs(120));
        assert_eq!(client.generate_url(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_generate_url_trims_trailing_slash() {
        let client = client("http://ollama:11434/");
        assert_eq!(client.generate_url(), "http://ollama:11434/api/generate");
    }

    #[test]
    fn test_with_streaming() {
        let client = client(DEFAULT_BASE_URL).with_streaming(false);
        assert!(!client.streaming());
    }

    #[test]
    fn test_decode_error_without_timeout_stays_decode() {
        let client = client(DEFAULT_BASE_URL);
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err = client.map_decode_error(DecodeError::StreamRead(Box::new(io)));
        assert!(matches!(err, GenerationError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreadable_error_body_is_reported() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.ends_with(b"}") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            // Promise more body than is sent, then close
            let reply = b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\npartial";
            socket.write_all(reply).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let client = client(&format!("http://{addr}"));
        let err = client.generate("m", "p").await.unwrap_err();
        match err {
            GenerationError::Upstream { status, body } => {
                assert_eq!(status, 500);
                assert!(body.starts_with("<failed to read body"), "got: {body}");
            }
            other => unreachable!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Port 9 (discard) is almost never listening locally
        let client = OllamaClient::new("http://127.0.0.1:9", Duration::from_secs(5)).unwrap();
        let err = client.generate("m", "p").await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Network(_) | GenerationError::Timeout(_)
        ));
    }
}
