//! Decoder for the generate API's JSON object stream.
//!
//! With `"stream": true` Ollama emits one JSON object per fragment, usually
//! one per line:
//! ```text
//! {"model":"gemma2:2b","response":"The","done":false}
//! {"model":"gemma2:2b","response":" answer","done":false}
//! {"model":"gemma2:2b","response":"","done":true,"done_reason":"stop"}
//! ```
//! Some configurations and proxies drop the newlines and send the objects
//! back to back, and a non-streaming reply is a single object. The decoder
//! uses serde_json's streaming deserializer, which needs no delimiter, so all
//! three shapes go through the same path.
//!
//! A malformed segment is skipped up to the next newline or the next `{`,
//! whichever comes first. Only a failure to read the body is an error.

use crate::error::DecodeError;
use crate::ollama::types::{FRAGMENT_KEYS, StreamEvent};
use futures_util::{Stream, StreamExt};
use serde_json::{Map, Value};

/// Incremental decoder state.
///
/// Bytes are fed as they arrive; a JSON value split across reads stays
/// buffered until it is complete.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    /// Bytes received but not yet decoded.
    pending: Vec<u8>,
    /// Concatenated fragments so far.
    text: String,
    /// Number of JSON objects decoded.
    objects: usize,
    /// Number of malformed segments skipped.
    skipped: usize,
    /// Whether a `"done": true` object was seen.
    done: bool,
}

impl StreamDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a slice of the response body and returns the events it completed.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.pending.extend_from_slice(bytes);
        self.drain(false)
    }

    /// Signals end-of-stream and returns any events still buffered.
    ///
    /// Incomplete trailing data is discarded.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        self.drain(true)
    }

    /// Returns the text decoded so far.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes the decoder and returns the concatenated text.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }

    /// Returns the number of JSON objects decoded.
    #[must_use]
    pub const fn objects(&self) -> usize {
        self.objects
    }

    /// Returns the number of malformed segments that were skipped.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Returns whether the service marked the stream as done.
    #[must_use]
    pub const fn saw_done(&self) -> bool {
        self.done
    }

    fn drain(&mut self, at_eof: bool) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        let mut consumed = 0;

        while consumed < self.pending.len() {
            let rest = &self.pending[consumed..];
            let blank = rest.iter().take_while(|b| b.is_ascii_whitespace()).count();
            if blank > 0 {
                consumed += blank;
                continue;
            }

            let mut values = serde_json::Deserializer::from_slice(rest).into_iter::<Value>();
            match values.next() {
                None => consumed = self.pending.len(),
                Some(Ok(value)) => {
                    consumed += values.byte_offset();
                    if let Some(event) = self.accept(&value) {
                        events.push(event);
                    }
                }
                // Value continues in a later read
                Some(Err(err)) if err.is_eof() && !at_eof => break,
                Some(Err(err)) => match resync_offset(rest, &err) {
                    Some(skip) => {
                        tracing::debug!(error = %err, bytes = skip, "skipping malformed segment");
                        self.skipped += 1;
                        consumed += skip;
                    }
                    None if at_eof => {
                        tracing::debug!(
                            error = %err,
                            bytes = rest.len(),
                            "discarding malformed trailing data"
                        );
                        self.skipped += 1;
                        consumed = self.pending.len();
                    }
                    // Wait for the next object to arrive
                    None => break,
                },
            }
        }

        self.pending.drain(..consumed);
        events
    }

    fn accept(&mut self, value: &Value) -> Option<StreamEvent> {
        let Value::Object(object) = value else {
            tracing::trace!("ignoring non-object value");
            return None;
        };
        self.objects += 1;

        if let Some(message) = object.get("error").and_then(Value::as_str) {
            tracing::warn!(error = message, "inference service reported an error in-stream");
        }

        let is_final = object.get("done").and_then(Value::as_bool).unwrap_or(false);
        self.done |= is_final;

        let fragment = extract_fragment(object);
        if let Some(text) = &fragment {
            self.text.push_str(text);
        } else if !is_final {
            return None;
        }

        Some(StreamEvent {
            fragment: fragment.unwrap_or_default(),
            is_final,
        })
    }
}

/// Extracts the fragment carried by the first present, non-null key among
/// `response`, `output`, `message`.
///
/// A string value is used as is; an object value contributes its `content`
/// string (the chat API shape). Any other value carries no text.
pub(crate) fn extract_fragment(object: &Map<String, Value>) -> Option<String> {
    let value = FRAGMENT_KEYS
        .iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())?;

    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(inner) => inner
            .get("content")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        _ => None,
    }
}

/// Byte offset in `buf` of the position a parse error points at.
fn error_offset(buf: &[u8], err: &serde_json::Error) -> usize {
    let line_start = match err.line() {
        0 | 1 => 0,
        line => buf
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .nth(line - 2)
            .map_or(buf.len(), |(i, _)| i + 1),
    };
    (line_start + err.column().saturating_sub(1)).min(buf.len())
}

/// Where decoding resumes after a malformed segment at the start of `buf`:
/// just past the next newline, or at the next `{` after the error position,
/// whichever comes first. `None` when neither is buffered yet.
fn resync_offset(buf: &[u8], err: &serde_json::Error) -> Option<usize> {
    let after_newline = buf.iter().position(|&b| b == b'\n').map(|i| i + 1);
    let from = error_offset(buf, err).max(1);
    let next_object = buf
        .get(from..)
        .and_then(|tail| tail.iter().position(|&b| b == b'{'))
        .map(|i| from + i);

    match (after_newline, next_object) {
        (Some(line), Some(object)) => Some(line.min(object)),
        (line, object) => line.or(object),
    }
}

/// Decodes a complete in-memory response body.
#[must_use]
pub fn decode_bytes(body: &[u8]) -> String {
    let mut decoder = StreamDecoder::new();
    decoder.feed(body);
    decoder.finish();
    decoder.into_text()
}

/// Decodes a response body stream into the concatenated answer text.
///
/// End-of-stream ends decoding successfully whether or not a `done` marker
/// was seen.
///
/// # Errors
///
/// Returns [`DecodeError::StreamRead`] if reading the body fails.
pub async fn decode_stream<S, B, E>(body: S) -> Result<String, DecodeError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut decoder = StreamDecoder::new();
    let mut body = std::pin::pin!(body);

    while let Some(chunk) = body.next().await {
        let bytes = chunk.map_err(|e| DecodeError::StreamRead(Box::new(e)))?;
        for event in decoder.feed(bytes.as_ref()) {
            tracing::trace!(
                fragment_len = event.fragment.len(),
                done = event.is_final,
                "stream event"
            );
        }
    }
    decoder.finish();

    tracing::debug!(
        objects = decoder.objects(),
        skipped = decoder.skipped(),
        done = decoder.saw_done(),
        text_len = decoder.text().len(),
        "response stream complete"
    );

    Ok(decoder.into_text())
}
