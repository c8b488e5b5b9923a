use serde::{Deserialize, Serialize};

use crate::fetchers::{ErrorKind, FetchError, RawCaption};

pub mod normalizer;

pub use normalizer::normalize;

/// Reported language of every transcript
pub const TRANSCRIPT_LANGUAGE: &str = "en";

/// Reported origin of every transcript
pub const TRANSCRIPT_SOURCE: &str = "youtube_auto";

/// Individual transcript segment with timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,

    /// Segment text
    pub text: String,
}

impl From<RawCaption> for TranscriptSegment {
    fn from(caption: RawCaption) -> Self {
        Self {
            start: caption.start,
            duration: caption.duration,
            text: caption.text,
        }
    }
}

/// Successful transcript fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptResult {
    pub success: bool,
    pub video_id: String,
    pub segments: Vec<TranscriptSegment>,
    pub full_text: String,
    pub word_count: usize,
    pub language: String,
    pub source: String,
}

impl TranscriptResult {
    /// Build a result, deriving `fullText` and `wordCount` from the segments
    pub fn new(video_id: impl Into<String>, segments: Vec<TranscriptSegment>) -> Self {
        let full_text = join_segments(&segments);
        let word_count = count_words(&full_text);

        Self {
            success: true,
            video_id: video_id.into(),
            segments,
            full_text,
            word_count,
            language: TRANSCRIPT_LANGUAGE.to_string(),
            source: TRANSCRIPT_SOURCE.to_string(),
        }
    }
}

/// Failed transcript fetch, or a request that never reached the fetcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptError {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub video_id: Option<String>,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_type: Option<ErrorKind>,
}

impl TranscriptError {
    /// Payload for a request that carried no video id
    pub fn missing_video_id(message: impl Into<String>) -> Self {
        Self {
            success: false,
            video_id: None,
            error: message.into(),
            error_type: None,
        }
    }

    /// Payload for a fetch that failed
    pub fn from_fetch(video_id: impl Into<String>, err: &FetchError) -> Self {
        Self {
            success: false,
            video_id: Some(video_id.into()),
            error: err.message().to_string(),
            error_type: Some(err.kind()),
        }
    }
}

/// The canonical record every adapter emits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranscriptResponse {
    Success(TranscriptResult),
    Failure(TranscriptError),
}

impl TranscriptResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, TranscriptResponse::Success(_))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<TranscriptResult> for TranscriptResponse {
    fn from(result: TranscriptResult) -> Self {
        TranscriptResponse::Success(result)
    }
}

impl From<TranscriptError> for TranscriptResponse {
    fn from(error: TranscriptError) -> Self {
        TranscriptResponse::Failure(error)
    }
}

/// Join segment texts with a single space, untrimmed
pub fn join_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Count whitespace-delimited tokens
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
