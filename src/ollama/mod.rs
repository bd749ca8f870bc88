//! Inference service integration.
//!
//! [`OllamaClient`] sends one request per prompt to Ollama's generate API and
//! assembles the reply with the streaming [`decoder`]. Callers depend on the
//! [`Generator`] trait so tests can substitute a fake backend.

pub mod client;
pub mod decoder;
pub mod types;

pub use client::{DEFAULT_BASE_URL, DEFAULT_CLIENT_TIMEOUT, Generator, OllamaClient};
pub use decoder::{StreamDecoder, decode_bytes, decode_stream};
pub use types::{GenerateRequest, StreamEvent};
