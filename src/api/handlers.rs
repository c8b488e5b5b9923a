//! Request handlers shared by the service and function endpoints

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};
use url::form_urlencoded;
use uuid::Uuid;

use super::AppState;
use crate::fetchers::TranscriptFetcher;
use crate::transcript::{normalize, TranscriptError, TranscriptResponse};
use crate::utils::resolve_video_id;

pub const SERVICE_NAME: &str = "transcript-service";
pub const MISSING_QUERY_PARAM: &str = "videoId parameter required";
pub const MISSING_BODY_FIELD: &str = "videoId required in request body";

/// JSON body accepted by POST endpoints
#[derive(Debug, Default, Deserialize)]
pub struct TranscriptRequest {
    #[serde(rename = "videoId", default)]
    pub video_id: Option<String>,
}

/// GET / - service health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
    }))
}

/// GET /transcript?videoId=...
pub async fn transcript_get(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let raw = query_video_id(query.as_deref());
    respond(state.fetcher.as_ref(), raw.as_deref(), MISSING_QUERY_PARAM).await
}

/// POST /transcript with `{"videoId": ...}`
pub async fn transcript_post(State(state): State<AppState>, body: Bytes) -> Response {
    let raw = body_video_id(&body);
    respond(state.fetcher.as_ref(), raw.as_deref(), MISSING_QUERY_PARAM).await
}

/// First `videoId` value of a query string
pub fn query_video_id(query: Option<&str>) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "videoId")
        .map(|(_, value)| value.into_owned())
}

/// `videoId` of a JSON body; empty or malformed bodies count as `{}`
pub fn body_video_id(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    serde_json::from_slice::<TranscriptRequest>(body)
        .unwrap_or_default()
        .video_id
}

/// Resolve the id, run the normalizer and pick the status code
pub(crate) async fn respond(
    fetcher: &dyn TranscriptFetcher,
    raw_video_id: Option<&str>,
    missing_message: &str,
) -> Response {
    let request_id = Uuid::new_v4();

    let Some(video_id) = resolve_video_id(raw_video_id) else {
        tracing::info!("[{}] Rejected transcript request without videoId", request_id);
        return json_response(
            StatusCode::BAD_REQUEST,
            TranscriptError::missing_video_id(missing_message).into(),
        );
    };

    tracing::info!(
        "[{}] Fetching transcript for {} via {}",
        request_id,
        video_id,
        fetcher.name()
    );

    let response = normalize(&video_id, fetcher).await;

    match &response {
        TranscriptResponse::Success(result) => tracing::info!(
            "[{}] Transcript for {} has {} segments, {} words",
            request_id,
            video_id,
            result.segments.len(),
            result.word_count
        ),
        TranscriptResponse::Failure(err) => tracing::warn!(
            "[{}] Transcript for {} failed ({}): {}",
            request_id,
            video_id,
            err.error_type.map(|kind| kind.as_str()).unwrap_or("unclassified"),
            err.error
        ),
    }

    let status = if response.is_success() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };

    json_response(status, response)
}

fn json_response(status: StatusCode, body: TranscriptResponse) -> Response {
    (status, Json(body)).into_response()
}
