//! Public session operations
//!
//! The entry points callers use: enqueue a track, skip the current one,
//! stop and tear down, inspect status. Each takes the target session's lock
//! for the duration of its mutation; media resolution happens before the
//! lock so slow network I/O never blocks the session.

use super::SessionManager;
use crate::error::{Error, Result};
use crate::events::{CloseReason, SessionEvent};
use crate::sink::VoiceTarget;
use crate::track::Track;
use crate::GroupId;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Point-in-time view of one session for status queries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionStatus {
    /// Track currently streaming, if any
    pub current: Option<Track>,

    /// Pending tracks, capped at the configured display limit
    pub queue: Vec<Track>,

    /// Total pending count (not capped)
    pub queue_len: usize,
}

impl SessionManager {
    /// Resolve `query`, connect or relocate the sink to the requester's
    /// target, and append the resolved track to the group's queue. Starts
    /// playback when the sink was idle.
    ///
    /// Returns the enqueued track for confirmation messaging.
    pub async fn enqueue(
        self: &Arc<Self>,
        group_id: GroupId,
        target: Option<VoiceTarget>,
        query: &str,
    ) -> Result<Track> {
        let Some(target) = target else {
            debug!(
                "Enqueue for group {} rejected: requester not in a voice channel",
                group_id
            );
            return Err(Error::NotConnected);
        };

        // Resolution may block on network I/O for seconds; it runs before
        // the session lock is taken so it never stalls skip/stop/status.
        let track = self.resolver.resolve(query).await?;
        info!(
            "Resolved '{}' -> '{}' ({}s) for group {}",
            query, track.title, track.duration_secs, group_id
        );

        loop {
            let session = self.registry.get_or_create(group_id).await;
            let mut s = session.lock().await;
            if s.closed {
                // Torn down while we waited on the lock; start over with a
                // fresh session.
                continue;
            }

            // The watchdog is defused only once the sink is secured; a
            // failed connect or relocation leaves any armed countdown
            // running so an idle session still gets torn down.
            let sink = match s.sink.clone() {
                Some(sink) if sink.is_connected() => {
                    if sink.target() != Some(target) {
                        sink.move_to(target).await?;
                    }
                    sink
                }
                _ => match self.connector.connect(group_id, target).await {
                    Ok(sink) => {
                        s.sink = Some(sink.clone());
                        sink
                    }
                    Err(e) => {
                        if s.current.is_none() && s.queue.is_empty() {
                            // Session minted (or emptied) just for this
                            // call: don't leave a sinkless husk behind.
                            s.cancel_watchdog();
                            s.closed = true;
                            drop(s);
                            self.registry.remove(group_id).await;
                        }
                        return Err(e);
                    }
                },
            };
            s.cancel_watchdog();

            s.queue.append(track.clone());
            info!(
                "Enqueued '{}' for group {} (queue length {})",
                track.title,
                group_id,
                s.queue.len()
            );
            self.broadcast_event(SessionEvent::TrackEnqueued {
                group_id,
                track_id: track.track_id,
                title: track.title.clone(),
                timestamp: Utc::now(),
            });

            if s.current.is_none() && !sink.is_streaming() {
                self.advance_locked(&mut s).await;
            }
            return Ok(track);
        }
    }

    /// Force the current track to end, which advances the queue.
    ///
    /// Returns the skipped track; [`Error::NothingPlaying`] when the session
    /// is idle or absent.
    pub async fn skip(&self, group_id: GroupId) -> Result<Track> {
        let Some(session) = self.registry.get(group_id).await else {
            return Err(Error::NothingPlaying);
        };
        let mut s = session.lock().await;
        let (Some(current), Some(sink)) = (s.current.clone(), s.sink.clone()) else {
            return Err(Error::NothingPlaying);
        };

        s.cancel_watchdog();
        info!("Skipping '{}' in group {}", current.title, group_id);
        // Forcing the sink to stop delivers the stream's completion
        // callback, and the completion worker advances from there.
        sink.stop().await;
        Ok(current)
    }

    /// Tear down the group's session: cancel the watchdog, drop the queue,
    /// stop and disconnect the sink, destroy session state.
    ///
    /// A no-op on an already-stopped or unknown group; never errors.
    pub async fn stop(&self, group_id: GroupId) -> Result<()> {
        let Some(session) = self.registry.get(group_id).await else {
            debug!("Stop for group {}: no active session", group_id);
            return Ok(());
        };
        let mut s = session.lock().await;
        if s.closed {
            return Ok(());
        }

        s.cancel_watchdog();
        s.queue.clear();
        s.current = None;
        // Invalidate any in-flight completion callback so the forced stop
        // below cannot trigger a spurious advance.
        s.stream_seq += 1;

        if let Some(sink) = s.sink.take() {
            if sink.is_streaming() {
                sink.stop().await;
            }
            sink.disconnect().await;
        }
        s.closed = true;
        drop(s);

        self.registry.remove(group_id).await;
        self.broadcast_event(SessionEvent::SessionClosed {
            group_id,
            reason: CloseReason::Stopped,
            timestamp: Utc::now(),
        });
        info!("Stopped and destroyed session for group {}", group_id);
        Ok(())
    }

    /// Read-only snapshot of the group's session; safe to call concurrently
    /// with mutation. An unknown group yields an empty status.
    pub async fn status(&self, group_id: GroupId) -> SessionStatus {
        let Some(session) = self.registry.get(group_id).await else {
            return SessionStatus::default();
        };
        let s = session.lock().await;
        SessionStatus {
            current: s.current.clone(),
            queue: s.queue.snapshot(self.config.queue_display_limit),
            queue_len: s.queue.len(),
        }
    }
}
