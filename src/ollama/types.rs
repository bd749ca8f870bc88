//! Wire types for the Ollama generate API.

use serde::Serialize;

/// Body of `POST /api/generate`.
///
/// Built fresh for every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest<'a> {
    /// Model identifier, e.g. `gemma2:2b`.
    pub model: &'a str,
    /// Fully rendered prompt.
    pub prompt: &'a str,
    /// Whether the service should stream one JSON object per fragment.
    pub stream: bool,
}

/// One decoded unit of the response stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    /// Text carried by this object (empty when the object had none).
    pub fragment: String,
    /// Whether the object carried `"done": true`.
    pub is_final: bool,
}

/// Keys that may carry generated text, in priority order.
pub(crate) const FRAGMENT_KEYS: [&str; 3] = ["response", "output", "message"];
