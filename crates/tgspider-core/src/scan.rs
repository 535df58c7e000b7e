//! Per-channel history scan: date bounding + keyword selection.

use regex::Regex;

use crate::{
    config::DateWindow,
    domain::{ChannelId, MatchedEntry, RawMessage},
    source::MessageSource,
    Result,
};

/// Timestamp format carried on each matched entry.
pub const ENTRY_DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Walks one channel's history and produces matched entries.
pub struct ChannelScanner<'a> {
    source: &'a dyn MessageSource,
}

impl<'a> ChannelScanner<'a> {
    pub fn new(source: &'a dyn MessageSource) -> Self {
        Self { source }
    }

    /// Scan `channel` over `window`.
    ///
    /// The cursor is anchored at `window.end` and walks backward in time.
    /// Messages dated (calendar day) after the window are skipped; the walk
    /// stops at the first message dated before `window.start`, since
    /// everything behind it is older still. Collected matches are reversed so
    /// the returned sequence ascends in time.
    pub async fn scan(
        &self,
        channel: &ChannelId,
        window: DateWindow,
        keywords: &[Regex],
    ) -> Result<Vec<MatchedEntry>> {
        let mut cursor = self.source.open_history(channel, window.end).await?;

        let mut matches = Vec::new();
        while let Some(message) = cursor.next().await? {
            let day = message.date.date_naive();
            if day > window.end {
                continue;
            }
            if day < window.start {
                break;
            }
            if let Some(entry) = match_message(&message, keywords) {
                matches.push(entry);
            }
        }

        matches.reverse();
        Ok(matches)
    }
}

/// Apply keyword selection to a single message.
///
/// A message matches at most once: the first matching pattern wins and the
/// remaining patterns are not evaluated. Messages without text never match.
fn match_message(message: &RawMessage, keywords: &[Regex]) -> Option<MatchedEntry> {
    let text = message.text.as_deref()?;
    if text.is_empty() {
        return None;
    }
    keywords.iter().find(|pattern| pattern.is_match(text))?;

    let mut lines = text.lines();
    let title = lines.next().unwrap_or("").to_string();
    let content = lines.collect::<Vec<_>>().join("\n");

    Some(MatchedEntry {
        channel: message.channel.clone(),
        id: message.id,
        title,
        content,
        date: message.date.format(ENTRY_DATE_FORMAT).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{at, compile, msg, window, FakeSource};

    fn scripted(messages: Vec<RawMessage>) -> FakeSource {
        FakeSource::new().channel("chX", messages)
    }

    async fn scan(source: &FakeSource, patterns: &[&str]) -> Vec<MatchedEntry> {
        ChannelScanner::new(source)
            .scan(
                &ChannelId("chX".to_string()),
                window("01.01.2025", "02.01.2025"),
                &compile(patterns),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn includes_start_boundary_and_excludes_day_before() {
        let source = scripted(vec![
            msg("chX", 1, at(2024, 12, 31, 10, 0), Some("release before window")),
            msg("chX", 2, at(2025, 1, 1, 0, 0), Some("release on start day")),
            msg("chX", 3, at(2025, 1, 2, 23, 59), Some("release on end day")),
        ]);
        let entries = scan(&source, &["release"]).await;
        let titles: Vec<_> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["release on start day", "release on end day"]);
    }

    #[tokio::test]
    async fn skips_messages_after_the_window_end() {
        // A coarse anchor may still deliver messages newer than the window.
        let source = scripted(vec![
            msg("chX", 1, at(2025, 1, 1, 9, 0), Some("New release out")),
            msg("chX", 2, at(2025, 1, 3, 9, 0), Some("release notes")),
        ]);
        let entries = scan(&source, &["release"]).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "New release out");
        assert_eq!(entries[0].date, "01.01.2025 09:00");
    }

    #[tokio::test]
    async fn stops_consuming_once_past_the_window_start() {
        let source = scripted(vec![
            msg("chX", 1, at(2024, 12, 20, 8, 0), Some("ancient release")),
            msg("chX", 2, at(2024, 12, 21, 8, 0), Some("old release")),
            msg("chX", 3, at(2024, 12, 30, 8, 0), Some("release just before")),
            msg("chX", 4, at(2025, 1, 2, 8, 0), Some("release inside")),
        ]);
        let entries = scan(&source, &["release"]).await;
        assert_eq!(entries.len(), 1);
        // Newest-first walk: the in-window message, then the first too-old
        // message terminates the scan before the rest of the history.
        assert_eq!(source.pulled(), 2);
    }

    #[tokio::test]
    async fn excludes_messages_with_empty_or_absent_text() {
        let source = scripted(vec![
            msg("chX", 1, at(2025, 1, 1, 10, 0), Some("")),
            msg("chX", 2, at(2025, 1, 1, 11, 0), None),
        ]);
        // ".*" matches an empty string, so only the text guard excludes these.
        let entries = scan(&source, &[".*"]).await;
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn message_matching_several_patterns_yields_one_entry() {
        let source = scripted(vec![msg(
            "chX",
            1,
            at(2025, 1, 1, 10, 0),
            Some("New release launch"),
        )]);
        let entries = scan(&source, &["release", "launch"]).await;
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn matching_is_case_insensitive_anywhere_in_the_body() {
        let source = scripted(vec![msg(
            "chX",
            1,
            at(2025, 1, 1, 10, 0),
            Some("headline\nthe RELEASE is buried here"),
        )]);
        let entries = scan(&source, &["release"]).await;
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn title_is_first_line_and_content_is_the_rest() {
        let source = scripted(vec![
            msg(
                "chX",
                1,
                at(2025, 1, 1, 10, 0),
                Some("Release headline\nfirst paragraph\nsecond paragraph"),
            ),
            msg("chX", 2, at(2025, 1, 1, 11, 0), Some("release one-liner")),
        ]);
        let entries = scan(&source, &["release"]).await;
        assert_eq!(entries[0].title, "Release headline");
        assert_eq!(entries[0].content, "first paragraph\nsecond paragraph");
        assert_eq!(entries[1].title, "release one-liner");
        assert_eq!(entries[1].content, "");
    }

    #[tokio::test]
    async fn entries_come_back_in_ascending_time_order() {
        let source = scripted(vec![
            msg("chX", 1, at(2025, 1, 1, 9, 0), Some("release early")),
            msg("chX", 2, at(2025, 1, 2, 9, 0), Some("release late")),
        ]);
        let entries = scan(&source, &["release"]).await;
        let titles: Vec<_> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["release early", "release late"]);
    }
}
