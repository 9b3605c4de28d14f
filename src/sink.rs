//! Audio sink boundary
//!
//! A sink is one live streaming connection that plays one source at a time
//! and reports completion through a one-shot callback. The orchestrator
//! never touches codecs or transports; it only drives this contract.

use crate::error::{Error, Result};
use crate::GroupId;
use async_trait::async_trait;
use std::sync::Arc;

/// Voice-capable target a sink can connect to (a channel within a group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceTarget(pub u64);

/// One-shot completion callback registered with [`AudioSink::stream`].
///
/// Invoked exactly once per `stream` call, asynchronously, from whatever
/// thread the sink's runtime delivers it on. `None` means the stream ended
/// normally; `Some` carries the playback error. Implementations must not
/// block and must not assume a tokio context.
pub type CompletionCallback = Box<dyn FnOnce(Option<Error>) + Send + 'static>;

/// Live audio connection capable of streaming one source at a time.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Whether the underlying connection is still live.
    fn is_connected(&self) -> bool;

    /// True while a stream started via [`stream`](AudioSink::stream) is
    /// still producing audio.
    fn is_streaming(&self) -> bool;

    /// Target this sink is currently connected to.
    fn target(&self) -> Option<VoiceTarget>;

    /// Start streaming `uri`; returns as soon as playback has started.
    ///
    /// `on_complete` fires exactly once when the stream ends, whether
    /// naturally, by error, or through [`stop`](AudioSink::stop).
    async fn stream(&self, uri: &str, on_complete: CompletionCallback) -> Result<()>;

    /// Force-stop the active stream. Triggers the pending completion
    /// callback; no-op when nothing is streaming.
    async fn stop(&self);

    /// Tear down the connection.
    async fn disconnect(&self);

    /// Relocate the connection to a different target within the same group.
    async fn move_to(&self, target: VoiceTarget) -> Result<()>;
}

/// Establishes sink connections on behalf of the session manager.
#[async_trait]
pub trait SinkConnector: Send + Sync {
    /// Connect to `target` and hand back the live sink.
    async fn connect(&self, group_id: GroupId, target: VoiceTarget) -> Result<Arc<dyn AudioSink>>;
}
