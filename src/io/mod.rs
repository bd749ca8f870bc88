//! I/O utilities for pagequery.
//!
//! File reading and chunk export for the CLI, along with the UTF-8
//! boundary helpers used by the chunker.

pub mod reader;
pub mod unicode;

pub use reader::{read_file, write_chunks};
pub use unicode::{find_char_boundary, find_char_boundary_forward};
