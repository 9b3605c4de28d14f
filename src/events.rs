//! Session event types
//!
//! Broadcast to observers (UI glue, metrics, tests) alongside the
//! user-facing notification channel. No receivers is fine; sends are
//! best-effort.

use crate::GroupId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Track appended to a session's queue
    TrackEnqueued {
        group_id: GroupId,
        track_id: Uuid,
        title: String,
        timestamp: DateTime<Utc>,
    },

    /// Track started streaming
    TrackStarted {
        group_id: GroupId,
        track_id: Uuid,
        title: String,
        timestamp: DateTime<Utc>,
    },

    /// Track finished streaming
    ///
    /// `completed` is false when the stream ended with a sink error or
    /// never started.
    TrackFinished {
        group_id: GroupId,
        track_id: Uuid,
        completed: bool,
        timestamp: DateTime<Utc>,
    },

    /// Queue became empty after the last track finished
    QueueDrained {
        group_id: GroupId,
        timestamp: DateTime<Utc>,
    },

    /// Watchdog started the ambient clip
    AmbientStarted {
        group_id: GroupId,
        clip: String,
        timestamp: DateTime<Utc>,
    },

    /// Session state destroyed and the sink disconnected
    SessionClosed {
        group_id: GroupId,
        reason: CloseReason,
        timestamp: DateTime<Utc>,
    },
}

/// Why a session was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    /// Explicit stop request
    Stopped,
    /// Idle watchdog fired
    IdleTimeout,
}
