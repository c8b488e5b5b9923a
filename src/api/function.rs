//! Function-style endpoint at `/api/transcript`.
//!
//! Mirrors a single-route serverless deployment: it can be merged into the
//! full service or served on its own with [`app`].

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;

use super::handlers::{body_video_id, query_video_id, respond, MISSING_BODY_FIELD, MISSING_QUERY_PARAM};
use super::{with_layers, AppState};
use crate::fetchers::TranscriptFetcher;

pub const FUNCTION_PATH: &str = "/api/transcript";

/// Routes of the function endpoint, without state or middleware
pub fn routes() -> Router<AppState> {
    Router::new().route(FUNCTION_PATH, get(function_get).post(function_post))
}

/// Standalone function endpoint with the same middleware as the service
pub fn app(fetcher: Arc<dyn TranscriptFetcher>) -> Router {
    with_layers(routes().with_state(AppState::new(fetcher)))
}

async fn function_get(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let raw = query_video_id(query.as_deref());
    respond(state.fetcher.as_ref(), raw.as_deref(), MISSING_QUERY_PARAM).await
}

async fn function_post(State(state): State<AppState>, body: Bytes) -> Response {
    let raw = body_video_id(&body);
    respond(state.fetcher.as_ref(), raw.as_deref(), MISSING_BODY_FIELD).await
}
