//! Error taxonomy for the tone-detection pipeline.
//!
//! Extraction and matching failures are fatal to a request ([`OrchestratorError`]).
//! Segmenter and sink failures are local: they are logged and carried alongside
//! successful results rather than aborting the whole request.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignalError {
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to decode audio: {0}")]
    DecodeError(String),

    #[error("clip contains no audio track")]
    NoAudioTrack,
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("decode error: {0}")]
    DecodeError(String),

    #[error("ffmpeg not found in PATH")]
    FfmpegMissing,

    #[error("ffmpeg invocation failed: {0}")]
    FfmpegFailed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SegmenterError {
    #[error("audio extraction failed: {0}")]
    Extract(#[from] CodecError),

    #[error("no matches associated with segment")]
    NoMatches,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("notification sink failed: {0}")]
    Failed(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cooldown store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read profile catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse profile catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize profile catalog: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error("unknown stream scope: {0}")]
    UnknownScope(String),
}
