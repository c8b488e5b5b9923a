//! Transcript Service - fetch YouTube caption tracks as structured JSON
//!
//! This library normalizes the outcome of a transcript fetch into one canonical
//! record and exposes it through a CLI command, a function-style HTTP endpoint
//! and a standalone HTTP service.

pub mod api;
pub mod cli;
pub mod config;
pub mod fetchers;
pub mod output;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use fetchers::{ErrorKind, FetchError, RawCaption, TranscriptFetcher};
pub use transcript::{normalize, TranscriptError, TranscriptResponse, TranscriptResult, TranscriptSegment};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;
