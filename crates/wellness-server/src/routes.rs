//! HTTP routes and handlers

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{Request, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use futures::{future, stream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::convert::Infallible;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use wellness_classifiers::{SentimentLabel, SentimentResult, WellnessTopicResult};
use wellness_core::TextItem;
use wellness_stream::{AnalysisResult, ProcessorStats, SubmitOutcome};

use crate::error::AppError;
use crate::state::AppState;

pub fn create_router(state: AppState, cors: bool) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/api/v1/ping", get(ping))
        .route("/api/v1/sentiment", post(analyze_sentiment))
        .route("/api/v1/topics", post(analyze_topics))
        .route("/api/v1/stream/submit", post(submit_to_stream))
        .route("/api/v1/stream/results", get(stream_results))
        .route("/api/v1/stream/stats", get(stream_stats))
        .fallback(fallback)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        );

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Body shared by every text-analysis endpoint
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct SentimentResponse {
    result: SentimentResult,
}

#[derive(Debug, Serialize)]
struct TopicsResponse {
    result: WellnessTopicResult,
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    id: String,
}

/// Payload of each SSE `message` event
#[derive(Debug, Serialize)]
struct StreamResult<'a> {
    id: &'a str,
    text: &'a str,
    sentiment: SentimentLabel,
    score: f64,
    timestamp: DateTime<Utc>,
}

impl<'a> From<&'a AnalysisResult> for StreamResult<'a> {
    fn from(analysis: &'a AnalysisResult) -> Self {
        Self {
            id: &analysis.item.id,
            text: &analysis.item.text,
            sentiment: analysis.result.label,
            score: analysis.result.score,
            timestamp: analysis.processed_at,
        }
    }
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

async fn ping() -> Json<Value> {
    Json(json!({
        "message": "pong",
        "time": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }))
}

/// Extract a non-empty `text` field, mapping every body problem to one error
fn required_text(payload: Result<Json<TextRequest>, JsonRejection>) -> Result<String, AppError> {
    match payload {
        Ok(Json(TextRequest { text })) if !text.is_empty() => Ok(text),
        Ok(_) => Err(AppError::InvalidRequest),
        Err(rejection) => {
            debug!(error = %rejection, "rejected request body");
            Err(AppError::InvalidRequest)
        }
    }
}

async fn analyze_sentiment(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<SentimentResponse>, AppError> {
    let text = required_text(payload)?;
    let result = state.sentiment.analyze(&text);

    Ok(Json(SentimentResponse { result }))
}

async fn analyze_topics(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<Json<TopicsResponse>, AppError> {
    let text = required_text(payload)?;
    let result = state.topics.analyze(&text);

    Ok(Json(TopicsResponse { result }))
}

async fn submit_to_stream(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let text = required_text(payload)?;
    let item = TextItem::new(format!("item-{}", Uuid::new_v4()), text);
    let id = item.id.clone();

    // Clients always get the id; drops show up in logs and counters
    match state.processor.submit(item) {
        SubmitOutcome::Accepted => debug!(item_id = %id, "item submitted to stream"),
        outcome => warn!(item_id = %id, ?outcome, "stream submission not queued"),
    }

    Ok((StatusCode::ACCEPTED, Json(SubmitResponse { id })))
}

/// Stream results as server-sent events until egress closes, the client
/// disconnects, or the server shuts down
async fn stream_results(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("Client connected to results stream");

    let connected = stream::once(future::ready(Ok::<_, Infallible>(
        Event::default()
            .event("connected")
            .data("Stream connection established"),
    )));

    let results = state
        .processor
        .results()
        .into_stream()
        .filter_map(|analysis| future::ready(result_event(&analysis).map(Ok::<_, Infallible>)))
        .take_until(state.shutdown.clone().cancelled_owned());

    Sse::new(connected.chain(results)).keep_alive(KeepAlive::new().interval(state.keep_alive))
}

fn result_event(analysis: &AnalysisResult) -> Option<Event> {
    match Event::default()
        .event("message")
        .json_data(StreamResult::from(analysis))
    {
        Ok(event) => Some(event),
        Err(e) => {
            error!(item_id = %analysis.item.id, error = %e, "failed to encode result event");
            None
        }
    }
}

async fn stream_stats(State(state): State<AppState>) -> Json<ProcessorStats> {
    Json(state.processor.stats())
}

async fn fallback() -> AppError {
    AppError::NotFound
}
