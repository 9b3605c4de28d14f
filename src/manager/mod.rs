//! Session manager: public entry points and orchestration
//!
//! Split across files by concern: `commands.rs` carries the public surface
//! (enqueue, skip, stop, status) and `driver.rs` the playback driver, the
//! completion worker, and the watchdog firing body.

mod commands;
mod driver;

pub use commands::SessionStatus;

use crate::ambient::AmbientLibrary;
use crate::config::OrchestratorConfig;
use crate::error::Error;
use crate::events::SessionEvent;
use crate::notify::Notifier;
use crate::resolve::MediaResolver;
use crate::session::SessionRegistry;
use crate::sink::SinkConnector;
use crate::GroupId;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::info;

/// Completion signal posted by sink callbacks and drained by the manager's
/// worker task. Callbacks run on the sink's delivery thread, so this is the
/// only thing they do.
pub(crate) struct Completion {
    pub(crate) group_id: GroupId,
    pub(crate) stream_seq: u64,
    pub(crate) error: Option<Error>,
}

/// Orchestrates all playback sessions.
///
/// Owns the session registry and the boundary collaborators; every mutating
/// operation on a session happens under that session's mutex, entered either
/// directly by a public command or by the completion worker.
pub struct SessionManager {
    pub(crate) registry: SessionRegistry,
    pub(crate) resolver: Arc<dyn MediaResolver>,
    pub(crate) connector: Arc<dyn SinkConnector>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) ambient: AmbientLibrary,
    pub(crate) config: OrchestratorConfig,
    pub(crate) completion_tx: mpsc::UnboundedSender<Completion>,
    pub(crate) event_tx: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    /// Create the manager and spawn its completion worker.
    pub fn new(
        config: OrchestratorConfig,
        resolver: Arc<dyn MediaResolver>,
        connector: Arc<dyn SinkConnector>,
        notifier: Arc<dyn Notifier>,
    ) -> Arc<Self> {
        let ambient = match &config.ambient_dir {
            Some(dir) => AmbientLibrary::scan(dir),
            None => AmbientLibrary::empty(),
        };
        info!(
            "Creating session manager (idle delay {}ms, {} ambient clips)",
            config.idle_delay_ms,
            ambient.len()
        );

        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (event_tx, _) = broadcast::channel(100); // Buffer up to 100 events

        let manager = Arc::new(Self {
            registry: SessionRegistry::new(),
            resolver,
            connector,
            notifier,
            ambient,
            config,
            completion_tx,
            event_tx,
        });
        manager.spawn_completion_worker(completion_rx);
        manager
    }

    /// Subscribe to the session event stream.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Number of live sessions, for diagnostics.
    pub async fn session_count(&self) -> usize {
        self.registry.len().await
    }

    pub(crate) fn broadcast_event(&self, event: SessionEvent) {
        // No receivers is OK
        let _ = self.event_tx.send(event);
    }

    /// Post user-facing status text on its own task.
    ///
    /// Notification is fire-and-forget; several call sites hold a session
    /// lock, and a slow notifier must not stall them.
    pub(crate) fn post_notification(&self, group_id: GroupId, text: String) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            notifier.post(group_id, &text).await;
        });
    }
}
