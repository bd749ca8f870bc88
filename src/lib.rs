//! # pagequery
//!
//! Ask questions about web pages with a local LLM.
//!
//! pagequery renders a page (or takes text supplied by the caller), splits
//! the text into size-bounded chunks, and asks an Ollama model the same
//! question about every chunk. The per-chunk answers are joined in order.
//!
//! ## Features
//!
//! - **Chunking**: positional, UTF-8 safe, lossless splitting
//! - **Streaming decoder**: newline-delimited or back-to-back JSON replies
//! - **Fail-fast orchestration**: sequential calls under a per-chunk deadline
//! - **HTTP service**: `/healthz`, `/api/scrape`, `/api/parse` on axum
//! - **Headless rendering**: Chromium via the `browser` feature

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chunking;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod logging;
pub mod ollama;
pub mod query;
pub mod scrape;
pub mod server;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{Chunk, join_chunks};

// Re-export chunking types
pub use chunking::{DEFAULT_MAX_CHUNK_CHARS, FixedChunker, chunk_text};

// Re-export generation types
pub use ollama::{Generator, OllamaClient, StreamDecoder, decode_stream};

// Re-export query types
pub use query::{Answer, ChunkOrchestrator, PromptTemplate};

// Re-export service types
pub use config::Settings;
pub use scrape::{PageScraper, ScrapedPage};
pub use server::{AppState, router};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
