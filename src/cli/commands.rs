//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::chunking::chunk_text;
use crate::cli::output::{
    OutputFormat, format_answer, format_chunk_list, format_write_chunks_result,
};
use crate::cli::parser::{Cli, Commands, GenerationArgs};
use crate::config::{Settings, optional_secs};
use crate::error::{CommandError, Error, Result};
use crate::io::{read_file, write_chunks};
use crate::query::{ChunkOrchestrator, PromptTemplate};
use crate::scrape::default_scraper;
use crate::server::{self, AppState};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success. `serve` returns an empty string
/// once the server has shut down.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub async fn execute(cli: &Cli) -> Result<String> {
    let format = cli.format;

    match &cli.command {
        Commands::Serve {
            bind,
            scrape_timeout_secs,
            generation,
        } => cmd_serve(*bind, *scrape_timeout_secs, generation).await,
        Commands::Chunk {
            file,
            max_chunk_chars,
            out_dir,
            prefix,
        } => cmd_chunk(file, *max_chunk_chars, out_dir.as_deref(), prefix, format),
        Commands::Ask {
            file,
            question,
            generation,
        } => cmd_ask(file, question, generation, format).await,
    }
}

/// Builds validated settings from the shared inference options.
///
/// # Errors
///
/// Returns an error if the prompt file cannot be loaded or a value is invalid.
pub fn build_settings(generation: &GenerationArgs) -> Result<Settings> {
    let settings = Settings {
        ollama_url: generation.ollama_url.clone(),
        default_model: generation.model.clone(),
        max_chunk_chars: generation.max_chunk_chars,
        streaming: !generation.no_stream,
        client_timeout: Duration::from_secs(generation.client_timeout_secs),
        chunk_timeout: optional_secs(generation.chunk_timeout_secs),
        prompt: PromptTemplate::load(generation.prompt_file.as_deref())?,
        ..Settings::default()
    };
    settings.validate()?;
    Ok(settings)
}

async fn cmd_serve(
    bind: SocketAddr,
    scrape_timeout_secs: u64,
    generation: &GenerationArgs,
) -> Result<String> {
    let mut settings = build_settings(generation)?;
    settings.bind = bind;
    settings.scrape_timeout = Duration::from_secs(scrape_timeout_secs);
    settings.validate()?;

    let generator = Arc::new(settings.ollama_client()?);
    let state = AppState::new(settings, generator, default_scraper());
    server::serve(state).await?;

    Ok(String::new())
}

fn cmd_chunk(
    file: &Path,
    max_chunk_chars: usize,
    out_dir: Option<&Path>,
    prefix: &str,
    format: OutputFormat,
) -> Result<String> {
    let content = read_file(file)?;
    let chunks = chunk_text(&content, max_chunk_chars);

    let Some(out_dir) = out_dir else {
        return Ok(format_chunk_list(&chunks, max_chunk_chars, format));
    };

    let chunks_iter = chunks.iter().map(|c| (c.index, c.content.as_str()));
    let paths = write_chunks(out_dir, chunks_iter, prefix)?;

    Ok(format_write_chunks_result(&paths, format))
}

async fn cmd_ask(
    file: &Path,
    question: &str,
    generation: &GenerationArgs,
    format: OutputFormat,
) -> Result<String> {
    let question = question.trim();
    if question.is_empty() {
        return Err(CommandError::MissingArgument("--question".to_string()).into());
    }

    let settings = build_settings(generation)?;
    let content = read_file(file)?;
    if content.trim().is_empty() {
        return Err(Error::invalid_input(format!(
            "{} has no content to ask about",
            file.display()
        )));
    }

    let client = settings.ollama_client()?;
    let chunks = chunk_text(content.trim(), settings.max_chunk_chars);
    let answer = ChunkOrchestrator::new(&client, &settings.prompt)
        .with_chunk_timeout(settings.chunk_timeout)
        .answer(&chunks, question, &settings.default_model)
        .await?;

    Ok(format_answer(&answer, format))
}
