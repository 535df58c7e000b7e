//! Renderer-agnostic report model and its builder.

use crate::domain::{ChannelId, GroupedResults, MessageId};

/// The logical structure of the final document: sections in group order,
/// entries in scan order. Built once, consumed once by a renderer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportModel {
    pub sections: Vec<ReportSection>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportSection {
    pub name: String,
    pub entries: Vec<ReportEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportEntry {
    pub source_url: String,
    pub title: String,
    pub body: String,
    pub date: String,
}

/// Build the report model from grouped scan results.
///
/// Empty groups produce empty sections; the renderer decides how to present
/// them.
pub fn build(results: &GroupedResults) -> ReportModel {
    let sections = results
        .groups()
        .map(|(name, entries)| ReportSection {
            name: name.to_string(),
            entries: entries
                .iter()
                .map(|entry| ReportEntry {
                    source_url: source_url(&entry.channel, entry.id),
                    title: entry.title.clone(),
                    body: entry.content.clone(),
                    date: entry.date.clone(),
                })
                .collect(),
        })
        .collect();

    ReportModel { sections }
}

/// Canonical public link to a channel message.
pub fn source_url(channel: &ChannelId, id: MessageId) -> String {
    format!("https://t.me/{channel}/{}", id.0)
}

/// Default output name derived from the configured date window: a single-date
/// label when the window is one day, a range label otherwise. Callers may
/// override it with an explicit output target.
pub fn default_file_name(start_date: &str, end_date: &str, extension: &str) -> String {
    if start_date == end_date {
        format!("report_{start_date}.{extension}")
    } else {
        format!("report_{start_date}-{end_date}.{extension}")
    }
}
