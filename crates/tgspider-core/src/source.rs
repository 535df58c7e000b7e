use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    domain::{ChannelId, RawMessage},
    Result,
};

/// History backend port.
///
/// The Telegram preview adapter is the first implementation; the shape leaves
/// room for other backends (an MTProto client, an export file) behind the
/// same interface.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Open a history cursor over `channel`, anchored at `anchor`.
    ///
    /// The cursor yields messages newest-first, starting at or adjacent to
    /// the anchor day and walking backward in time. Consumers may drop it at
    /// any point; implementations must not require the sequence to be
    /// drained and must release any backing resources on drop.
    async fn open_history(
        &self,
        channel: &ChannelId,
        anchor: NaiveDate,
    ) -> Result<Box<dyn HistoryCursor>>;
}

/// Lazily-produced, potentially unbounded message sequence over one channel.
#[async_trait]
pub trait HistoryCursor: Send {
    /// Next message, or `None` once the history is exhausted.
    async fn next(&mut self) -> Result<Option<RawMessage>>;
}
