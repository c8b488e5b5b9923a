//! Maps a fetcher outcome onto the canonical transcript record.
//!
//! This is the only place the response shape is decided; every adapter goes
//! through [`normalize`]. It performs no logging, caching or retries.

use super::{TranscriptError, TranscriptResponse, TranscriptResult, TranscriptSegment};
use crate::fetchers::{FetchError, TranscriptFetcher};

/// Fetch the transcript of `video_id` and normalize the outcome.
///
/// `video_id` must already be non-empty; adapters enforce that before calling.
pub async fn normalize(video_id: &str, fetcher: &dyn TranscriptFetcher) -> TranscriptResponse {
    if !fetcher.is_available() {
        return TranscriptError::from_fetch(video_id, &FetchError::unavailable()).into();
    }

    match fetcher.fetch(video_id).await {
        Ok(captions) => {
            let segments = captions
                .into_iter()
                .map(TranscriptSegment::from)
                .collect::<Vec<_>>();
            TranscriptResult::new(video_id, segments).into()
        }
        Err(err) => TranscriptError::from_fetch(video_id, &err).into(),
    }
}
