use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod youtube;

use crate::config::FetcherConfig;

/// Message returned when no working fetcher could be constructed
pub const UNAVAILABLE_MESSAGE: &str = "youtube transcript fetcher not available";

/// One caption entry as delivered by a fetcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCaption {
    /// Start offset in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,

    /// Caption text
    pub text: String,
}

impl RawCaption {
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            duration,
            text: text.into(),
        }
    }
}

/// Closed classification of fetch failures.
///
/// The serialized form is the `errorType` label clients see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "ImportError")]
    CapabilityUnavailable,
    #[serde(rename = "VideoUnavailable")]
    NotFound,
    #[serde(rename = "TranscriptsDisabled")]
    CaptionsDisabled,
    #[serde(rename = "RequestBlocked")]
    RateLimited,
    #[serde(rename = "TransportError")]
    TransportError,
    #[serde(rename = "CouldNotRetrieveTranscript")]
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::CapabilityUnavailable => "ImportError",
            ErrorKind::NotFound => "VideoUnavailable",
            ErrorKind::CaptionsDisabled => "TranscriptsDisabled",
            ErrorKind::RateLimited => "RequestBlocked",
            ErrorKind::TransportError => "TransportError",
            ErrorKind::Unknown => "CouldNotRetrieveTranscript",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a transcript fetcher
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct FetchError {
    kind: ErrorKind,
    message: String,
}

impl FetchError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unavailable() -> Self {
        Self::new(ErrorKind::CapabilityUnavailable, UNAVAILABLE_MESSAGE)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn captions_disabled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CaptionsDisabled, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportError, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) {
            return Self::rate_limited(err.to_string());
        }
        Self::transport(err.to_string())
    }
}

/// Capability that retrieves the caption entries of a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Fetch caption entries in chronological order
    async fn fetch(&self, video_id: &str) -> Result<Vec<RawCaption>, FetchError>;

    /// Whether this fetcher can be used at all
    fn is_available(&self) -> bool {
        true
    }

    /// Name used in logs
    fn name(&self) -> &'static str;
}

/// Stand-in used when the real fetcher failed to initialize
pub struct UnavailableFetcher;

#[async_trait]
impl TranscriptFetcher for UnavailableFetcher {
    async fn fetch(&self, _video_id: &str) -> Result<Vec<RawCaption>, FetchError> {
        Err(FetchError::unavailable())
    }

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

/// Build the fetcher for this process, falling back to [`UnavailableFetcher`]
pub fn build_fetcher(config: &FetcherConfig) -> Arc<dyn TranscriptFetcher> {
    match youtube::YoutubeFetcher::new(config) {
        Ok(fetcher) => {
            tracing::debug!("Using YouTube fetcher at {}", config.base_url);
            Arc::new(fetcher)
        }
        Err(e) => {
            tracing::warn!("YouTube fetcher could not be initialized: {}", e);
            Arc::new(UnavailableFetcher)
        }
    }
}
