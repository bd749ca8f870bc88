//! CLI layer for pagequery.
//!
//! Provides the command-line interface using clap, with commands for
//! running the HTTP service, inspecting chunk plans, and asking questions
//! about local files.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands, GenerationArgs};
