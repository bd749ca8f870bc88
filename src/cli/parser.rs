//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros. Options that
//! configure the service also read `PAGEQUERY_*` environment variables.

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::chunking::DEFAULT_MAX_CHUNK_CHARS;
use crate::cli::output::OutputFormat;
use crate::config::{DEFAULT_BIND, DEFAULT_MODEL};
use crate::ollama::DEFAULT_BASE_URL;

/// pagequery: ask questions about web pages with a local LLM.
///
/// Renders pages, splits their text into chunks and asks an Ollama model
/// the same question about every chunk.
#[derive(Parser, Debug)]
#[command(name = "pagequery")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Log format (text, json).
    #[arg(long, default_value = "text", global = true, env = "PAGEQUERY_LOG_FORMAT")]
    pub log_format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "PAGEQUERY_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,

        /// Deadline for rendering one page, in seconds.
        #[arg(long, env = "PAGEQUERY_SCRAPE_TIMEOUT_SECS", default_value_t = 45)]
        scrape_timeout_secs: u64,

        /// Inference options.
        #[command(flatten)]
        generation: GenerationArgs,
    },

    /// Show how a file would be chunked, optionally writing the chunks.
    Chunk {
        /// Path to a UTF-8 text file.
        file: PathBuf,

        /// Maximum chunk size in bytes (0 = one chunk).
        #[arg(long, default_value_t = DEFAULT_MAX_CHUNK_CHARS)]
        max_chunk_chars: usize,

        /// Write each chunk to a file in this directory.
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Filename prefix for written chunks.
        #[arg(long, default_value = "chunk")]
        prefix: String,
    },

    /// Ask a question about a text file.
    Ask {
        /// Path to a UTF-8 text file.
        file: PathBuf,

        /// Question to ask of every chunk.
        #[arg(short, long)]
        question: String,

        /// Inference options.
        #[command(flatten)]
        generation: GenerationArgs,
    },
}

/// Options shared by every command that talks to the inference service.
#[derive(Args, Debug, Clone)]
pub struct GenerationArgs {
    /// Base URL of the Ollama service.
    #[arg(long, env = "PAGEQUERY_OLLAMA_URL", default_value = DEFAULT_BASE_URL)]
    pub ollama_url: String,

    /// Model used when a request does not name one.
    #[arg(short, long, env = "PAGEQUERY_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Default chunk size in bytes.
    #[arg(long, env = "PAGEQUERY_MAX_CHUNK_CHARS", default_value_t = DEFAULT_MAX_CHUNK_CHARS)]
    pub max_chunk_chars: usize,

    /// Deadline for one chunk in seconds (0 = no deadline).
    #[arg(long, env = "PAGEQUERY_CHUNK_TIMEOUT_SECS", default_value_t = 60)]
    pub chunk_timeout_secs: u64,

    /// Overall timeout of one inference request in seconds.
    #[arg(long, env = "PAGEQUERY_CLIENT_TIMEOUT_SECS", default_value_t = 120)]
    pub client_timeout_secs: u64,

    /// Request a single JSON reply instead of a stream.
    #[arg(long, env = "PAGEQUERY_NO_STREAM")]
    pub no_stream: bool,

    /// Prompt template file with {chunk} and {question} placeholders.
    #[arg(long, env = "PAGEQUERY_PROMPT_FILE")]
    pub prompt_file: Option<PathBuf>,
}
