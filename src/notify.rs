//! Notification channel boundary

use crate::GroupId;
use async_trait::async_trait;

/// Posts status text to a group's notification channel.
///
/// Fire-and-forget, best-effort: implementations log delivery failures and
/// never propagate them to the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post(&self, group_id: GroupId, text: &str);
}
