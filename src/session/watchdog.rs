//! Idle watchdog: cancellable countdown that triggers the ambient action
//!
//! State machine per session: INACTIVE → ARMED (`arm`) → FIRING (countdown
//! expiry) → INACTIVE. ARMED → INACTIVE via [`WatchdogHandle::cancel`].
//! Cancellation is cooperative: it interrupts the countdown sleep but never
//! an action that has already entered the FIRING phase. The FIRING body
//! itself lives in the session manager (`fire_idle_timeout`), which
//! re-validates that the session is still idle before doing anything.

use crate::manager::SessionManager;
use crate::GroupId;
use std::sync::Weak;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

/// Handle to one armed watchdog.
///
/// At most one watchdog is alive per session: the session stores the handle,
/// and arming a new one cancels the previous handle first. Dropping the
/// handle cancels the countdown the same way `cancel` does.
pub struct WatchdogHandle {
    seq: u64,
    cancel_tx: Option<oneshot::Sender<()>>,
}

impl WatchdogHandle {
    /// Monotonic id, used by the FIRING phase to detect that it has been
    /// superseded by a newer arm.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// ARMED → INACTIVE. No-op if the countdown already expired; a FIRING
    /// action is never interrupted.
    pub fn cancel(mut self) {
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Arm a countdown of `delay` for `group_id`.
///
/// On uninterrupted expiry the task calls back into the manager, which
/// re-validates idleness, plays one ambient clip, and tears the session
/// down. The manager is held weakly so a dropped orchestrator silently
/// retires pending watchdogs.
pub fn arm(
    manager: Weak<SessionManager>,
    group_id: GroupId,
    seq: u64,
    delay: Duration,
) -> WatchdogHandle {
    let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = &mut cancel_rx => {
                debug!("Watchdog for group {} cancelled before expiry", group_id);
                return;
            }
        }

        // FIRING: past this point cancellation no longer applies
        let Some(manager) = manager.upgrade() else {
            return;
        };
        manager.fire_idle_timeout(group_id, seq).await;
    });

    WatchdogHandle {
        seq,
        cancel_tx: Some(cancel_tx),
    }
}
