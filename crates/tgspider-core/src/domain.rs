use chrono::{DateTime, Utc};

/// Public channel handle (the `t.me/<handle>` name).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Message id, unique and increasing with time within a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub i64);

/// A raw channel message as produced by a history source.
///
/// `text: None` marks service or media-only messages; those never match.
#[derive(Clone, Debug)]
pub struct RawMessage {
    pub channel: ChannelId,
    pub id: MessageId,
    pub date: DateTime<Utc>,
    pub text: Option<String>,
}

/// A message that passed both the date-window and keyword filters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchedEntry {
    pub channel: ChannelId,
    pub id: MessageId,
    pub title: String,
    pub content: String,
    pub date: String,
}

/// Per-group accumulation of matched entries.
///
/// One bucket per configured group, created up front, so the set of groups is
/// fixed by configuration rather than by which channels happened to match.
/// Bucket order is configuration order; entry order within a bucket is scan
/// order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupedResults {
    buckets: Vec<GroupBucket>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct GroupBucket {
    name: String,
    entries: Vec<MatchedEntry>,
}

impl GroupedResults {
    /// One empty bucket per configured group, in configured order.
    pub fn with_groups<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            buckets: names
                .into_iter()
                .map(|name| GroupBucket {
                    name: name.to_string(),
                    entries: Vec::new(),
                })
                .collect(),
        }
    }

    /// Append entries to the bucket at `group_idx`, preserving their order.
    pub fn extend(&mut self, group_idx: usize, entries: impl IntoIterator<Item = MatchedEntry>) {
        self.buckets[group_idx].entries.extend(entries);
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &[MatchedEntry])> {
        self.buckets
            .iter()
            .map(|b| (b.name.as_str(), b.entries.as_slice()))
    }

    pub fn get(&self, name: &str) -> Option<&[MatchedEntry]> {
        self.buckets
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.entries.as_slice())
    }

    pub fn group_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn total_entries(&self) -> usize {
        self.buckets.iter().map(|b| b.entries.len()).sum()
    }
}
