//! Chunked question answering.
//!
//! A question is asked of every chunk separately, using [`PromptTemplate`]
//! to build each prompt, and the per-chunk answers are joined in chunk order
//! by [`ChunkOrchestrator`].

pub mod orchestrator;
pub mod prompt;

pub use orchestrator::{Answer, ChunkOrchestrator, ChunkState, DEFAULT_CHUNK_TIMEOUT};
pub use prompt::{DEFAULT_PROMPT_TEMPLATE, PromptTemplate};
