//! Reading page text from disk and exporting chunks.

use crate::error::{IoError, Result};
use std::path::Path;

/// Largest file the CLI will load (256 MiB).
const MAX_FILE_SIZE: u64 = 256 * 1024 * 1024;

/// Reads a UTF-8 text file into a string.
///
/// # Arguments
///
/// * `path` - Path to the file.
///
/// # Errors
///
/// Returns an error if the file does not exist, is larger than 256 MiB,
/// cannot be read, or is not valid UTF-8.
///
/// # Examples
///
/// ```no_run
/// use pagequery::io::read_file;
///
/// let content = read_file("page.txt").unwrap();
/// ```
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let read_failed = |reason: String| IoError::ReadFailed {
        path: display.clone(),
        reason,
    };

    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: display.clone(),
            }
        } else {
            read_failed(e.to_string())
        }
    })?;

    if metadata.len() > MAX_FILE_SIZE {
        return Err(read_failed(format!(
            "file too large: {} bytes (max: {MAX_FILE_SIZE} bytes)",
            metadata.len()
        ))
        .into());
    }

    let bytes = std::fs::read(path).map_err(|e| read_failed(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| {
        read_failed(format!(
            "invalid UTF-8 at byte offset {}",
            e.utf8_error().valid_up_to()
        ))
        .into()
    })
}

/// Writes each chunk to `out_dir/{prefix}_{index:04}.txt`.
///
/// The directory is created if needed; existing files are overwritten.
///
/// # Returns
///
/// The written paths, in input order.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a file cannot be
/// written.
pub fn write_chunks<'a, P, I>(out_dir: P, chunks: I, prefix: &str) -> Result<Vec<String>>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = (usize, &'a str)>,
{
    let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir).map_err(|e| IoError::DirectoryFailed {
        path: out_dir.display().to_string(),
        reason: e.to_string(),
    })?;

    chunks
        .into_iter()
        .map(|(index, content)| {
            let file = out_dir.join(format!("{prefix}_{index:04}.txt"));
            let display = file.display().to_string();
            std::fs::write(&file, content).map_err(|e| IoError::WriteFailed {
                path: display.clone(),
                reason: e.to_string(),
            })?;
            Ok(display)
        })
        .collect()
}
