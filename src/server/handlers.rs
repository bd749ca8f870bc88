//! Request handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};

use crate::chunking::{chunk_text, resolve_max_chunk_chars};
use crate::error::OrchestratorError;
use crate::query::ChunkOrchestrator;
use crate::scrape::scrape_with_deadline;
use crate::server::AppState;
use crate::server::types::{
    ErrorBody, HealthResponse, ParseRequest, ParseResponse, ScrapeRequest, ScrapeResponse,
};

/// 400 message for a scrape request without a usable url.
pub const SCRAPE_USAGE: &str = "Provide a valid 'url' in JSON body.";

/// 400 message for a parse request without a question.
pub const PARSE_USAGE: &str = "Provide 'question' and either 'domContent' or 'url'.";

/// 400 message for a parse request that yielded no content.
pub const NO_CONTENT: &str = "No DOM content to parse. Provide 'domContent' or 'url'.";

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// `GET /healthz`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// `POST /api/scrape`
pub async fn scrape(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected scrape body");
            return bad_request(SCRAPE_USAGE);
        }
    };
    let url = request.url.trim();
    if url.is_empty() {
        return bad_request(SCRAPE_USAGE);
    }

    match scrape_with_deadline(state.scraper.as_ref(), url, state.settings.scrape_timeout).await {
        Ok(page) => Json(ScrapeResponse {
            url: request.url.clone(),
            html_length: page.html_len(),
            body_length: page.body_len(),
            cleaned: page.cleaned,
            error: None,
        })
        .into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(ScrapeResponse {
                url: request.url.clone(),
                error: Some(e.to_string()),
                ..ScrapeResponse::default()
            }),
        )
            .into_response(),
    }
}

/// `POST /api/parse`
pub async fn parse(
    State(state): State<AppState>,
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected parse body");
            return bad_request(PARSE_USAGE);
        }
    };
    let question = request.question.trim();
    if question.is_empty() {
        return bad_request(PARSE_USAGE);
    }

    let settings = &state.settings;
    let model = settings.resolve_model(request.model.as_deref());

    let mut content = request
        .dom_content
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_string();

    if content.is_empty()
        && let Some(url) = request.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    {
        match scrape_with_deadline(state.scraper.as_ref(), url, settings.scrape_timeout).await {
            Ok(page) => content = page.cleaned,
            Err(e) => {
                return (
                    StatusCode::BAD_GATEWAY,
                    Json(ParseResponse {
                        model,
                        error: Some(format!("Scrape failed: {e}")),
                        ..ParseResponse::default()
                    }),
                )
                    .into_response();
            }
        }
    }

    if content.trim().is_empty() {
        return bad_request(NO_CONTENT);
    }

    let max_chunk_chars =
        resolve_max_chunk_chars(request.max_chunk_chars, settings.max_chunk_chars);
    let chunks = chunk_text(&content, max_chunk_chars);
    tracing::info!(
        model = %model,
        chunks = chunks.len(),
        content_len = content.len(),
        max_chunk_chars,
        "parse request"
    );

    let orchestrator = ChunkOrchestrator::new(state.generator.as_ref(), &settings.prompt)
        .with_chunk_timeout(settings.chunk_timeout);

    match orchestrator.answer(&chunks, question, &model).await {
        Ok(answer) => Json(ParseResponse {
            model: answer.model,
            chunks: answer.chunks,
            answer: answer.text,
            ..ParseResponse::default()
        })
        .into_response(),
        Err(err) => {
            let status = if err.is_timeout() {
                StatusCode::GATEWAY_TIMEOUT
            } else {
                StatusCode::BAD_GATEWAY
            };
            let (failed_chunk, chunks_processed) = match &err {
                OrchestratorError::ChunkFailed {
                    index, processed, ..
                } => (Some(index + 1), Some(*processed)),
                OrchestratorError::NoChunks => (None, None),
            };
            (
                status,
                Json(ParseResponse {
                    model,
                    chunks: chunks.len(),
                    answer: String::new(),
                    error: Some(err.to_string()),
                    failed_chunk,
                    chunks_processed,
                }),
            )
                .into_response()
        }
    }
}
