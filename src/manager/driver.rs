//! Playback driver, completion worker, and watchdog firing
//!
//! The driver (`advance_locked`) is the state machine that starts the next
//! queued track, skips failed starts, and arms the idle watchdog when the
//! queue drains. Sink completion callbacks post [`Completion`] messages that
//! a single worker task drains, re-acquiring the session lock before it
//! touches any state.

use super::{Completion, SessionManager};
use crate::events::{CloseReason, SessionEvent};
use crate::session::{watchdog, Session};
use crate::sink::CompletionCallback;
use crate::GroupId;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, warn};

impl SessionManager {
    pub(super) fn spawn_completion_worker(
        self: &Arc<Self>,
        mut completion_rx: mpsc::UnboundedReceiver<Completion>,
    ) {
        let manager = Arc::downgrade(self);
        tokio::spawn(async move {
            while let Some(completion) = completion_rx.recv().await {
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                manager.on_stream_complete(completion).await;
            }
            debug!("Completion worker exited");
        });
    }

    /// Handle one stream-complete signal from a sink.
    async fn on_stream_complete(self: &Arc<Self>, completion: Completion) {
        let Completion {
            group_id,
            stream_seq,
            error,
        } = completion;

        let Some(session) = self.registry.get(group_id).await else {
            debug!("Completion for group {} ignored: session gone", group_id);
            return;
        };
        let mut s = session.lock().await;
        if s.closed || s.stream_seq != stream_seq {
            // A newer stream started (or the session was stopped) before
            // this callback landed; advancing now would double-skip.
            debug!(
                "Stale completion for group {} (seq {}, current {})",
                group_id, stream_seq, s.stream_seq
            );
            return;
        }

        if let Some(track) = s.current.take() {
            if let Some(e) = &error {
                warn!(
                    "Playback of '{}' in group {} ended with error: {}",
                    track.title, group_id, e
                );
                self.post_notification(
                    group_id,
                    format!("❌ Error reproduciendo **{}**.", track.title),
                );
            } else {
                debug!("Finished '{}' in group {}", track.title, group_id);
            }
            self.broadcast_event(SessionEvent::TrackFinished {
                group_id,
                track_id: track.track_id,
                completed: error.is_none(),
                timestamp: Utc::now(),
            });
        }

        self.advance_locked(&mut s).await;
    }

    /// Playback driver: start the next queued track, or arm the idle
    /// watchdog when the queue is empty.
    ///
    /// Idempotent and re-entrant; always invoked with the session lock held.
    /// A track whose stream fails to start is reported and skipped, never
    /// retried.
    pub(crate) async fn advance_locked(self: &Arc<Self>, s: &mut Session) {
        // Entering or continuing playback always suppresses a pending
        // watchdog.
        s.cancel_watchdog();

        let Some(sink) = s.sink.clone() else {
            return;
        };
        if !sink.is_connected() {
            debug!("Advance for group {} aborted: sink not connected", s.group_id);
            return;
        }

        loop {
            let Some(track) = s.queue.pop_front() else {
                s.current = None;
                info!(
                    "Queue for group {} has drained; arming idle watchdog",
                    s.group_id
                );
                self.post_notification(
                    s.group_id,
                    "✅ La cola de reproducción ha terminado.".to_string(),
                );
                self.broadcast_event(SessionEvent::QueueDrained {
                    group_id: s.group_id,
                    timestamp: Utc::now(),
                });
                self.arm_watchdog_locked(s);
                return;
            };

            s.stream_seq += 1;
            let callback = self.completion_callback(s.group_id, s.stream_seq);
            match sink.stream(&track.stream_uri, callback).await {
                Ok(()) => {
                    info!(
                        "Now playing '{}' ({}) in group {}",
                        track.title, track.uploader, s.group_id
                    );
                    self.post_notification(
                        s.group_id,
                        format!(
                            "🎵 Ahora suena: **{}**\npor *{}*",
                            track.title, track.uploader
                        ),
                    );
                    self.broadcast_event(SessionEvent::TrackStarted {
                        group_id: s.group_id,
                        track_id: track.track_id,
                        title: track.title.clone(),
                        timestamp: Utc::now(),
                    });
                    s.current = Some(track);
                    return;
                }
                Err(e) => {
                    // Skip-on-error: report and fall through to the next
                    // queued track.
                    warn!(
                        "Failed to start '{}' in group {}: {}",
                        track.title, s.group_id, e
                    );
                    self.post_notification(
                        s.group_id,
                        format!("❌ No se pudo reproducir **{}**, saltando.", track.title),
                    );
                    self.broadcast_event(SessionEvent::TrackFinished {
                        group_id: s.group_id,
                        track_id: track.track_id,
                        completed: false,
                        timestamp: Utc::now(),
                    });
                }
            }
        }
    }

    /// One-shot completion callback handed to the sink.
    ///
    /// Runs on whatever thread the sink's runtime delivers it on, so it only
    /// posts a message for the completion worker.
    fn completion_callback(self: &Arc<Self>, group_id: GroupId, stream_seq: u64) -> CompletionCallback {
        let completion_tx = self.completion_tx.clone();
        Box::new(move |error| {
            let _ = completion_tx.send(Completion {
                group_id,
                stream_seq,
                error,
            });
        })
    }

    fn arm_watchdog_locked(self: &Arc<Self>, s: &mut Session) {
        // Exactly one watchdog alive per session: replace any prior instance.
        s.cancel_watchdog();
        s.watchdog_seq += 1;
        let handle = watchdog::arm(
            Arc::downgrade(self),
            s.group_id,
            s.watchdog_seq,
            self.config.idle_delay(),
        );
        s.watchdog = Some(handle);
    }

    /// FIRING body, invoked by an armed watchdog whose countdown expired
    /// uninterrupted.
    ///
    /// Validates under the session lock that the session is still idle, then
    /// plays the ambient clip *without* holding the lock so enqueue, stop,
    /// and status stay responsive during the clip. Teardown at the end
    /// re-checks for activity that arrived while the clip played.
    pub(crate) async fn fire_idle_timeout(self: &Arc<Self>, group_id: GroupId, watchdog_seq: u64) {
        let Some(session) = self.registry.get(group_id).await else {
            return;
        };

        let sink = {
            let mut s = session.lock().await;
            if s.watchdog.as_ref().map(|h| h.seq()) != Some(watchdog_seq) {
                debug!("Watchdog for group {} superseded before firing", group_id);
                return;
            }
            s.watchdog = None;

            let Some(sink) = s.sink.clone() else {
                return;
            };
            // Playback may have resumed between arming and firing; the
            // queue check also covers an enqueue that has appended but not
            // yet started streaming.
            if !sink.is_connected()
                || sink.is_streaming()
                || s.current.is_some()
                || !s.queue.is_empty()
            {
                debug!("Watchdog for group {} aborted: activity resumed", group_id);
                return;
            }
            sink
        };

        info!(
            "Idle timeout for group {}; playing ambient clip before disconnect",
            group_id
        );
        self.notifier
            .post(group_id, "👋 Me retiro por inactividad. ¡Hasta la próxima!")
            .await;

        if let Some(clip) = self.ambient.pick() {
            let clip_uri = clip.display().to_string();
            self.broadcast_event(SessionEvent::AmbientStarted {
                group_id,
                clip: clip_uri.clone(),
                timestamp: Utc::now(),
            });

            let (done_tx, done_rx) = oneshot::channel();
            let callback: CompletionCallback = Box::new(move |error| {
                let _ = done_tx.send(error);
            });
            match sink.stream(&clip_uri, callback).await {
                Ok(()) => {
                    // Wait for natural completion, bounded by the hard
                    // ceiling.
                    if timeout(self.config.ambient_ceiling(), done_rx).await.is_err() {
                        warn!(
                            "Ambient clip for group {} hit the {}ms ceiling; forcing stop",
                            group_id, self.config.ambient_ceiling_ms
                        );
                        sink.stop().await;
                    }
                }
                Err(e) => {
                    warn!("Ambient clip for group {} failed to start: {}", group_id, e);
                }
            }
        } else {
            debug!(
                "No ambient clips available for group {}; disconnecting directly",
                group_id
            );
        }

        // Teardown, unless the session saw new activity while the clip
        // played.
        let mut s = session.lock().await;
        if s.closed {
            // An explicit stop won the race and already tore down.
            return;
        }
        if s.current.is_some() {
            // An enqueue won the race and a track is already streaming; the
            // driver owns the session again. Advancing here would clear or
            // talk over the live track.
            debug!(
                "Group {} resumed playback during the ambient clip; leaving it be",
                group_id
            );
            return;
        }
        if !s.queue.is_empty() {
            debug!(
                "Group {} became active during the ambient clip; resuming playback",
                group_id
            );
            self.advance_locked(&mut s).await;
            return;
        }

        if let Some(sink) = s.sink.take() {
            sink.disconnect().await;
        }
        s.closed = true;
        drop(s);

        self.registry.remove(group_id).await;
        self.broadcast_event(SessionEvent::SessionClosed {
            group_id,
            reason: CloseReason::IdleTimeout,
            timestamp: Utc::now(),
        });
        info!("Session for group {} closed after idle timeout", group_id);
    }
}
