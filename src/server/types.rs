//! JSON bodies of the HTTP API. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/scrape`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    /// Page to render.
    #[serde(default)]
    pub url: String,
}

/// Reply of `POST /api/scrape`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    /// Page that was requested.
    pub url: String,
    /// Length of the rendered document HTML in bytes.
    pub html_length: usize,
    /// Length of the cleaned body HTML in bytes.
    pub body_length: usize,
    /// Normalized page text.
    pub cleaned: String,
    /// Failure description; absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `POST /api/parse`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    /// Page to render when `domContent` is empty.
    #[serde(default)]
    pub url: Option<String>,
    /// Page text supplied by the caller.
    #[serde(default)]
    pub dom_content: Option<String>,
    /// Question asked of every chunk.
    #[serde(default)]
    pub question: String,
    /// Model to use; blank selects the default.
    #[serde(default)]
    pub model: Option<String>,
    /// Chunk size in bytes; zero, negative or absent selects the default.
    #[serde(default)]
    pub max_chunk_chars: Option<i64>,
}

/// Reply of `POST /api/parse`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    /// Model used for the run.
    pub model: String,
    /// Number of chunks the content was split into.
    pub chunks: usize,
    /// Chunk answers joined by newlines; empty on failure.
    pub answer: String,
    /// Failure description; absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// One-based number of the chunk that failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_chunk: Option<usize>,
    /// Chunks answered before the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks_processed: Option<usize>,
}

/// Body of every 400 reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// What was wrong with the request.
    pub error: String,
}

/// Reply of `GET /healthz`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always true while the process serves requests.
    pub ok: bool,
    /// Current time, RFC 3339 UTC.
    pub time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_camel_case() {
        let req: ParseRequest = serde_json::from_str(
            r#"{"domContent":"x","question":"q","maxChunkChars":-1,"model":""}"#,
        )
        .unwrap();
        assert_eq!(req.dom_content.as_deref(), Some("x"));
        assert_eq!(req.max_chunk_chars, Some(-1));
        assert_eq!(req.url, None);
    }

    #[test]
    fn test_parse_response_omits_empty_fields() {
        let resp = ParseResponse {
            model: "gemma2:2b".to_string(),
            chunks: 1,
            answer: "a".to_string(),
            ..ParseResponse::default()
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "gemma2:2b", "chunks": 1, "answer": "a"})
        );
    }

    #[test]
    fn test_scrape_response_field_names() {
        let resp = ScrapeResponse {
            url: "u".to_string(),
            html_length: 10,
            body_length: 4,
            cleaned: "c".to_string(),
            error: Some("boom".to_string()),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["htmlLength"], 10);
        assert_eq!(json["bodyLength"], 4);
        assert_eq!(json["error"], "boom");
    }
}
