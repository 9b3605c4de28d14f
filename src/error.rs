//! Error types for the session orchestrator
//!
//! Module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for the orchestrator
#[derive(Error, Debug)]
pub enum Error {
    /// Requester is not connected to any voice-capable target
    #[error("requester is not connected to a voice channel")]
    NotConnected,

    /// Media resolver could not produce a playable stream
    #[error("could not resolve a playable stream: {0}")]
    ResolutionFailed(String),

    /// Skip requested while nothing is streaming
    #[error("nothing is currently playing")]
    NothingPlaying,

    /// Audio sink connection or streaming failure
    #[error("audio sink error: {0}")]
    Sink(String),

    /// File I/O errors
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the orchestrator Error
pub type Result<T> = std::result::Result<T, Error>;
