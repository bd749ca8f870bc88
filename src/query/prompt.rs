//! Prompt template for per-chunk generation requests.
//!
//! The template is plain text with two placeholders, `{chunk}` and
//! `{question}`. It is parsed once at startup and rendered for every chunk.

use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};
use crate::io::read_file;

/// Compiled-in prompt template.
pub const DEFAULT_PROMPT_TEMPLATE: &str =
    "Extract information from the following content:\n\n{chunk}\n\nQuestion: {question}";

/// Placeholder replaced with the user's question.
const QUESTION_PLACEHOLDER: &str = "{question}";
/// Placeholder replaced with the chunk content.
const CHUNK_PLACEHOLDER: &str = "{chunk}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Question,
    Chunk,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Slot),
}

/// A parsed prompt template.
///
/// Rendering is a single pass over the parsed segments, so placeholder text
/// inside the question or the chunk is never substituted again.
///
/// # Examples
///
/// ```
/// use pagequery::query::PromptTemplate;
///
/// let template = PromptTemplate::parse("Q: {question}\n---\n{chunk}").unwrap();
/// assert_eq!(template.render("why?", "body"), "Q: why?\n---\nbody");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parses a template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if either placeholder is missing.
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let segments = parse_segments(&source);

        for (slot, placeholder) in [
            (Slot::Question, QUESTION_PLACEHOLDER),
            (Slot::Chunk, CHUNK_PLACEHOLDER),
        ] {
            if !segments.contains(&Segment::Slot(slot)) {
                return Err(Error::config(format!(
                    "prompt template must contain {placeholder}"
                )));
            }
        }

        Ok(Self { source, segments })
    }

    /// Loads the template from `path`, or returns the compiled-in default
    /// when no path is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let source = read_file(path)?;
        let template = Self::parse(source).map_err(|e| match e {
            Error::Config { message } => {
                Error::config(format!("{}: {message}", path.display()))
            }
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded prompt template");
        Ok(template)
    }

    /// Renders the prompt for one chunk.
    #[must_use]
    pub fn render(&self, question: &str, chunk: &str) -> String {
        let capacity = self.source.len() + question.len() + chunk.len();
        let mut prompt = String::with_capacity(capacity);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => prompt.push_str(text),
                Segment::Slot(Slot::Question) => prompt.push_str(question),
                Segment::Slot(Slot::Chunk) => prompt.push_str(chunk),
            }
        }
        prompt
    }

    /// Returns the template text as written.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_PROMPT_TEMPLATE.to_string(),
            segments: parse_segments(DEFAULT_PROMPT_TEMPLATE),
        }
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_segments(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = source;

    loop {
        let next = [
            (QUESTION_PLACEHOLDER, Slot::Question),
            (CHUNK_PLACEHOLDER, Slot::Chunk),
        ]
        .into_iter()
        .filter_map(|(token, slot)| rest.find(token).map(|pos| (pos, token, slot)))
        .min_by_key(|(pos, _, _)| *pos);

        let Some((pos, token, slot)) = next else {
            if !rest.is_empty() {
                segments.push(Segment::Literal(rest.to_string()));
            }
            break;
        };

        if pos > 0 {
            segments.push(Segment::Literal(rest[..pos].to_string()));
        }
        segments.push(Segment::Slot(slot));
        rest = &rest[pos + token.len()..];
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_template() {
        let prompt = PromptTemplate::default().render("what?", "short text");
        assert_eq!(
            prompt,
            "Extract information from the following content:\n\nshort text\n\nQuestion: what?"
        );
    }

    #[test]
    fn test_default_matches_parse() {
        let parsed = PromptTemplate::parse(DEFAULT_PROMPT_TEMPLATE).unwrap();
        assert_eq!(parsed, PromptTemplate::default());
    }

    #[test]
    fn test_parse_requires_both_placeholders() {
        let err = PromptTemplate::parse("only {chunk}").unwrap_err();
        assert!(err.to_string().contains("{question}"));

        let err = PromptTemplate::parse("only {question}").unwrap_err();
        assert!(err.to_string().contains("{chunk}"));
    }

    #[test]
    fn test_render_is_single_pass() {
        let template = PromptTemplate::default();
        let prompt = template.render("what is {chunk}?", "literal {question}");
        assert!(prompt.contains("Question: what is {chunk}?"));
        assert!(prompt.contains("literal {question}"));
    }

    #[test]
    fn test_repeated_placeholders() {
        let template = PromptTemplate::parse("{question}|{chunk}|{question}").unwrap();
        assert_eq!(template.render("q", "c"), "q|c|q");
    }

    #[test]
    fn test_chunk_passed_verbatim() {
        let chunk = "  line one\r\n\tline two  ";
        let prompt = PromptTemplate::default().render("q", chunk);
        assert!(prompt.contains(chunk));
    }

    #[test]
    fn test_load_default_without_path() {
        let template = PromptTemplate::load(None).unwrap();
        assert_eq!(template.source(), DEFAULT_PROMPT_TEMPLATE);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Context:\n{{chunk}}\nAnswer: {{question}}").unwrap();
        let template = PromptTemplate::load(Some(file.path())).unwrap();
        assert_eq!(template.render("q", "c"), "Context:\nc\nAnswer: q");
    }

    #[test]
    fn test_load_invalid_file_names_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "no placeholders here").unwrap();
        let err = PromptTemplate::load(Some(file.path())).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("configuration error"));
        assert!(msg.contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_load_missing_file() {
        let err = PromptTemplate::load(Some(Path::new("/nonexistent/prompt.txt"))).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
