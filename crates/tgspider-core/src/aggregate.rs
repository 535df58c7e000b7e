//! Fans the per-channel scan out over every configured group.

use regex::Regex;
use tokio_util::sync::CancellationToken;

use crate::{
    config::{ChannelGroup, DateWindow},
    domain::{ChannelId, GroupedResults},
    logging::{DiagLevel, Diagnostics},
    scan::ChannelScanner,
    source::MessageSource,
};

/// Drives one scan per channel and merges matches into per-group buckets.
pub struct GroupAggregator<'a> {
    source: &'a dyn MessageSource,
    diag: &'a dyn Diagnostics,
}

impl<'a> GroupAggregator<'a> {
    pub fn new(source: &'a dyn MessageSource, diag: &'a dyn Diagnostics) -> Self {
        Self { source, diag }
    }

    /// Scan every channel of every group, sequentially and in configured
    /// order.
    ///
    /// Buckets for all groups exist before scanning starts, so a group with
    /// zero channels or zero matches still appears in the results. A failing
    /// channel is reported through the diagnostics sink and skipped without
    /// touching what its group has accumulated so far. Cancellation is
    /// observed between channels; once cancelled, the results collected so
    /// far are returned.
    pub async fn run(
        &self,
        groups: &[ChannelGroup],
        window: DateWindow,
        keywords: &[Regex],
        cancel: &CancellationToken,
    ) -> GroupedResults {
        let mut results = GroupedResults::with_groups(groups.iter().map(|g| g.name.as_str()));
        let scanner = ChannelScanner::new(self.source);

        'groups: for (idx, group) in groups.iter().enumerate() {
            self.diag
                .emit(DiagLevel::Info, &format!("processing group: {}", group.name));

            for channel in &group.channels {
                if cancel.is_cancelled() {
                    self.diag.emit(
                        DiagLevel::Warn,
                        "scan cancelled, reporting what was collected so far",
                    );
                    break 'groups;
                }

                let channel = ChannelId(channel.clone());
                self.diag.emit(
                    DiagLevel::Info,
                    &format!("fetching messages from channel: {channel}"),
                );

                match scanner.scan(&channel, window, keywords).await {
                    Ok(entries) => results.extend(idx, entries),
                    Err(e) => self.diag.emit(
                        DiagLevel::Error,
                        &format!("failed to fetch messages from channel {channel}: {e}"),
                    ),
                }
            }
        }

        results
    }
}
