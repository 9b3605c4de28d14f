//! Per-session FIFO of pending tracks
//!
//! Insertion order is play order. Each session owns an independent queue;
//! operations on different sessions never contend.

use crate::track::Track;
use std::collections::VecDeque;

/// FIFO queue of pending tracks for one session.
#[derive(Debug, Default)]
pub struct TrackQueue {
    tracks: VecDeque<Track>,
}

impl TrackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track at the tail.
    pub fn append(&mut self, track: Track) {
        self.tracks.push_back(track);
    }

    /// Pop the next track to play. `None` when empty, not an error.
    pub fn pop_front(&mut self) -> Option<Track> {
        self.tracks.pop_front()
    }

    /// Point-in-time copy of at most `limit` pending tracks for display.
    /// The underlying queue is never truncated.
    pub fn snapshot(&self, limit: usize) -> Vec<Track> {
        self.tracks.iter().take(limit).cloned().collect()
    }

    /// Drop all pending tracks.
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
