//! Resolved track metadata

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A resolved, playable unit with metadata and a stream URI.
///
/// Produced by the media resolver, never mutated after creation. Consumed
/// exactly once by the playback driver and retained only as the session's
/// `current` reference for status queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Unique id assigned at resolution time
    pub track_id: Uuid,

    /// Display title
    pub title: String,

    /// Uploader / artist name
    pub uploader: String,

    /// Reported duration in seconds
    pub duration_secs: u64,

    /// Direct stream URI handed to the audio sink
    pub stream_uri: String,
}

impl Track {
    /// Create a track with a fresh id.
    pub fn new(
        title: impl Into<String>,
        uploader: impl Into<String>,
        duration_secs: u64,
        stream_uri: impl Into<String>,
    ) -> Self {
        Self {
            track_id: Uuid::new_v4(),
            title: title.into(),
            uploader: uploader.into(),
            duration_secs,
            stream_uri: stream_uri.into(),
        }
    }
}
