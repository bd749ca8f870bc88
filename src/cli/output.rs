//! Rendering of command results for the terminal.
//!
//! Every command returns a string; `--format json` switches each renderer to
//! pretty-printed JSON for scripting.

use crate::core::Chunk;
use crate::error::Error;
use crate::io::find_char_boundary;
use crate::query::Answer;
use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Write;

/// How command results are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tables and plain answers.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Formats the chunk plan for a file.
#[must_use]
pub fn format_chunk_list(chunks: &[Chunk], max_chunk_chars: usize, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_chunk_list_text(chunks, max_chunk_chars),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ChunkSummary<'a> {
                index: usize,
                start: usize,
                end: usize,
                size: usize,
                preview: &'a str,
            }
            #[derive(Serialize)]
            struct ChunkPlan<'a> {
                max_chunk_chars: usize,
                count: usize,
                chunks: Vec<ChunkSummary<'a>>,
            }
            format_json(&ChunkPlan {
                max_chunk_chars,
                count: chunks.len(),
                chunks: chunks
                    .iter()
                    .map(|c| ChunkSummary {
                        index: c.index,
                        start: c.start(),
                        end: c.end(),
                        size: c.size(),
                        preview: c.preview(60),
                    })
                    .collect(),
            })
        }
    }
}

fn format_chunk_list_text(chunks: &[Chunk], max_chunk_chars: usize) -> String {
    let mut output = String::new();
    let limit = if max_chunk_chars == 0 {
        "unlimited".to_string()
    } else {
        format_size(max_chunk_chars)
    };
    let _ = writeln!(output, "{} chunks (max {limit}):", chunks.len());
    let _ = writeln!(
        output,
        "{:<6} {:<12} {:<12} {:<10} Preview",
        "Index", "Start", "End", "Size"
    );
    output.push_str(&"-".repeat(70));
    output.push('\n');

    for chunk in chunks {
        let preview = truncate(&chunk.content.replace('\n', "\\n"), 30);
        let _ = writeln!(
            output,
            "{:<6} {:<12} {:<12} {:<10} {}",
            chunk.index,
            chunk.start(),
            chunk.end(),
            chunk.size(),
            preview
        );
    }

    output
}

/// Lists the files written by `chunk --out-dir`.
#[must_use]
pub fn format_write_chunks_result(paths: &[String], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            let _ = writeln!(output, "Wrote {} chunks:", paths.len());
            for path in paths {
                let _ = writeln!(output, "  {path}");
            }
            output
        }
        OutputFormat::Json => format_json(&paths),
    }
}

/// Formats the answer of an `ask` run.
#[must_use]
pub fn format_answer(answer: &Answer, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = answer.text.clone();
            if !output.ends_with('\n') {
                output.push('\n');
            }
            output
        }
        OutputFormat::Json => format_json(answer),
    }
}

/// Renders a command failure.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }
            format_json(&ErrorOutput {
                error: error.to_string(),
            })
        }
    }
}

fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Byte count with a binary unit, e.g. `97.7 KB`.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: usize) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Shortens `s` to `max_len` bytes, marking the cut with `...`.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return s[..find_char_boundary(s, max_len)].to_string();
    }
    format!("{}...", &s[..find_char_boundary(s, max_len - 3)])
}
