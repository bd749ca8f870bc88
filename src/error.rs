//! Error hierarchy.
//!
//! Each layer has its own `thiserror` enum. [`Error`] wraps them for the
//! library and CLI; the HTTP handlers match on the inner enums to choose a
//! status code.

use std::time::Duration;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for library and CLI operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading pages, writing chunk files or binding the listener failed.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// The page could not be rendered.
    #[error("scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    /// A single generation call failed.
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    /// A multi-chunk query failed.
    #[error("{0}")]
    Orchestration(#[from] OrchestratorError),

    /// A CLI invocation was rejected.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// The input to work on is missing or unusable.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// What is missing or malformed.
        message: String,
    },

    /// Settings, prompt templates or logging setup are unusable.
    #[error("configuration error: {message}")]
    Config {
        /// What is wrong.
        message: String,
    },
}

impl Error {
    /// Shorthand for [`Error::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Filesystem and socket failures.
#[derive(Error, Debug)]
pub enum IoError {
    /// The page file does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Requested path.
        path: String,
    },

    /// The page file exists but could not be loaded as text.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Requested path.
        path: String,
        /// Underlying cause.
        reason: String,
    },

    /// A chunk file could not be written.
    #[error("failed to write file: {path}: {reason}")]
    WriteFailed {
        /// Target path.
        path: String,
        /// Underlying cause.
        reason: String,
    },

    /// The chunk output directory could not be created.
    #[error("failed to create directory: {path}: {reason}")]
    DirectoryFailed {
        /// Target directory.
        path: String,
        /// Underlying cause.
        reason: String,
    },

    /// Any other OS-level failure.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// Errors from the page-render collaborator.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// No renderer is compiled into this build.
    #[error("page rendering unavailable: {0}")]
    Unavailable(String),

    /// The browser could not be launched or driven.
    #[error("browser error: {0}")]
    Browser(String),

    /// Navigation to the page failed.
    #[error("navigation to {url} failed: {reason}")]
    Navigation {
        /// Requested URL.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// The rendered document has no `<body>`.
    #[error("no <body> found")]
    NoBody,

    /// Rendering exceeded its deadline.
    #[error("page render timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors decoding the inference service's response stream.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The response body could not be read to completion.
    #[error("failed to read response stream: {0}")]
    StreamRead(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors from a single generation call.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The request never produced a response (connection refused, reset, ...).
    #[error("request to inference service failed: {0}")]
    Network(#[source] reqwest::Error),

    /// The inference service answered with a non-2xx status.
    #[error("inference service returned {status}: {body}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Full response body.
        body: String,
    },

    /// The response stream failed mid-read.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The decoded answer was empty or whitespace only.
    #[error("inference service returned empty response")]
    EmptyResponse,

    /// The call did not finish within its deadline.
    #[error("inference request timed out after {0:?}")]
    Timeout(Duration),
}

impl GenerationError {
    /// Returns true if the call failed because a deadline elapsed.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Errors from a multi-chunk query run.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// There was nothing to query.
    #[error("no chunks to process")]
    NoChunks,

    /// A chunk failed and the run was aborted.
    #[error(
        "chunk {} of {total} failed (model {model}, {processed} processed): {source}",
        .index + 1
    )]
    ChunkFailed {
        /// Zero-based index of the failing chunk.
        index: usize,
        /// Total number of chunks in the run.
        total: usize,
        /// Number of chunks that completed before the failure.
        processed: usize,
        /// Model used for the run.
        model: String,
        /// Underlying generation failure.
        #[source]
        source: GenerationError,
    },
}

impl OrchestratorError {
    /// Returns true if the run failed because a chunk timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        match self {
            Self::NoChunks => false,
            Self::ChunkFailed { source, .. } => source.is_timeout(),
        }
    }
}

/// Rejected CLI arguments.
#[derive(Error, Debug)]
pub enum CommandError {
    /// A required argument is empty.
    #[error("missing required argument: {0}")]
    MissingArgument(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}
