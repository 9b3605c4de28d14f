//! Session state and registry
//!
//! One [`Session`] per group: its queue, the currently streaming track, the
//! live sink handle, and the armed watchdog. All of it is mutated only while
//! holding the session's mutex, which serializes user commands against
//! in-flight completion callbacks. Different sessions share nothing and run
//! fully in parallel.

pub mod queue;
pub mod watchdog;

use crate::sink::AudioSink;
use crate::track::Track;
use crate::GroupId;
use queue::TrackQueue;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use watchdog::WatchdogHandle;

/// Mutable per-group playback state.
///
/// Invariant: `current` is `Some` iff the sink is actively streaming a
/// track; `watchdog` is `Some` iff `current` is `None` and the sink is still
/// connected.
pub struct Session {
    pub group_id: GroupId,

    /// Pending tracks, FIFO
    pub queue: TrackQueue,

    /// Track currently streaming; `None` when idle or stopped
    pub current: Option<Track>,

    /// Live audio connection; released on disconnect
    pub sink: Option<Arc<dyn AudioSink>>,

    /// Pending idle watchdog; at most one per session
    pub watchdog: Option<WatchdogHandle>,

    /// Incremented on every stream start. Completion callbacks carry the
    /// value current at their stream's start; a mismatch marks them stale
    /// (double-advance guard).
    pub stream_seq: u64,

    /// Monotonic id handed to armed watchdogs, so a FIRING task can tell
    /// whether the stored handle is still its own.
    pub watchdog_seq: u64,

    /// Set on teardown. Callers that were waiting on the mutex check this
    /// and re-create the session instead of mutating a corpse.
    pub closed: bool,
}

impl Session {
    fn new(group_id: GroupId) -> Self {
        Self {
            group_id,
            queue: TrackQueue::new(),
            current: None,
            sink: None,
            watchdog: None,
            stream_seq: 0,
            watchdog_seq: 0,
            closed: false,
        }
    }

    /// ARMED → INACTIVE if a watchdog is pending; idempotent otherwise.
    pub fn cancel_watchdog(&mut self) {
        if let Some(handle) = self.watchdog.take() {
            handle.cancel();
        }
    }
}

/// Concurrency-safe mapping from group id to its session.
///
/// Sessions are created lazily on first use and removed on teardown. The
/// registry is passed around as an explicit dependency of the session
/// manager; there are no ambient globals.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<GroupId, Arc<Mutex<Session>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an existing session.
    pub async fn get(&self, group_id: GroupId) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(&group_id).cloned()
    }

    /// Look up or lazily create the session for `group_id`.
    pub async fn get_or_create(&self, group_id: GroupId) -> Arc<Mutex<Session>> {
        if let Some(session) = self.sessions.read().await.get(&group_id) {
            return session.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(group_id)
            .or_insert_with(|| {
                debug!("Creating session for group {}", group_id);
                Arc::new(Mutex::new(Session::new(group_id)))
            })
            .clone()
    }

    /// Remove the session on teardown.
    pub async fn remove(&self, group_id: GroupId) -> Option<Arc<Mutex<Session>>> {
        self.sessions.write().await.remove(&group_id)
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
