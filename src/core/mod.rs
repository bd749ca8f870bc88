//! Core domain models for pagequery.
//!
//! Request-scoped data structures shared by the chunker, the orchestrator
//! and the output layers. These are pure domain models with no I/O
//! dependencies.

pub mod chunk;

pub use chunk::{Chunk, join_chunks};
