//! Media resolver boundary

use crate::error::Result;
use crate::track::Track;
use async_trait::async_trait;

/// Resolves a search query or URL into a streamable track descriptor.
///
/// Implementations typically shell out to a downloader over the network and
/// may take seconds. The session manager always calls this off the session
/// serialization path, so a slow resolve never stalls skip/stop/status.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Resolve `query` to a playable track.
    ///
    /// Returns [`Error::ResolutionFailed`](crate::Error::ResolutionFailed)
    /// when no stream can be produced; the query is not retried.
    async fn resolve(&self, query: &str) -> Result<Track>;
}
