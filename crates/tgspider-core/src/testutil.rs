//! In-memory fakes and fixture helpers shared by the pipeline tests.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use regex::{Regex, RegexBuilder};

use crate::{
    config::{ChannelGroup, DateWindow, DATE_FORMAT},
    domain::{ChannelId, MessageId, RawMessage},
    errors::Error,
    logging::{DiagLevel, Diagnostics},
    render::ReportRenderer,
    report::ReportModel,
    source::{HistoryCursor, MessageSource},
    Result,
};

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
}

pub fn msg(channel: &str, id: i64, date: DateTime<Utc>, text: Option<&str>) -> RawMessage {
    RawMessage {
        channel: ChannelId(channel.to_string()),
        id: MessageId(id),
        date,
        text: text.map(|s| s.to_string()),
    }
}

pub fn window(start: &str, end: &str) -> DateWindow {
    DateWindow {
        start: NaiveDate::parse_from_str(start, DATE_FORMAT).unwrap(),
        end: NaiveDate::parse_from_str(end, DATE_FORMAT).unwrap(),
    }
}

pub fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .unwrap()
        })
        .collect()
}

pub fn groups(defs: &[(&str, &[&str])]) -> Vec<ChannelGroup> {
    defs.iter()
        .map(|(name, channels)| ChannelGroup {
            name: name.to_string(),
            channels: channels.iter().map(|c| c.to_string()).collect(),
        })
        .collect()
}

/// Scripted history source.
///
/// Serves each channel's scripted messages newest-first like the real
/// backend, but ignores the anchor on purpose: the scanner's own window
/// bounding is what the pipeline tests exercise. Counts opened cursors and
/// pulled messages so tests can assert on early termination.
#[derive(Default)]
pub struct FakeSource {
    channels: HashMap<String, Vec<RawMessage>>,
    failing: HashSet<String>,
    opened: AtomicUsize,
    pulled: Arc<AtomicUsize>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(mut self, name: &str, messages: Vec<RawMessage>) -> Self {
        self.channels.insert(name.to_string(), messages);
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageSource for FakeSource {
    async fn open_history(
        &self,
        channel: &ChannelId,
        _anchor: NaiveDate,
    ) -> Result<Box<dyn HistoryCursor>> {
        self.opened.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(channel.as_str()) {
            return Err(Error::ChannelFetch {
                channel: channel.0.clone(),
                reason: "scripted failure".to_string(),
            });
        }

        let mut messages = self
            .channels
            .get(channel.as_str())
            .cloned()
            .unwrap_or_default();
        messages.sort_by(|a, b| b.id.cmp(&a.id));

        Ok(Box::new(FakeCursor {
            queue: messages.into(),
            pulled: Arc::clone(&self.pulled),
        }))
    }
}

struct FakeCursor {
    queue: VecDeque<RawMessage>,
    pulled: Arc<AtomicUsize>,
}

#[async_trait]
impl HistoryCursor for FakeCursor {
    async fn next(&mut self) -> Result<Option<RawMessage>> {
        let message = self.queue.pop_front();
        if message.is_some() {
            self.pulled.fetch_add(1, Ordering::SeqCst);
        }
        Ok(message)
    }
}

/// Capturing diagnostics sink.
#[derive(Default)]
pub struct CaptureDiagnostics {
    events: Mutex<Vec<(DiagLevel, String)>>,
}

impl CaptureDiagnostics {
    pub fn contains(&self, level: DiagLevel, needle: &str) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}

impl Diagnostics for CaptureDiagnostics {
    fn emit(&self, level: DiagLevel, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

/// Renderer that records every model it receives instead of writing files.
#[derive(Default)]
pub struct FakeRenderer {
    rendered: Mutex<Vec<(ReportModel, PathBuf)>>,
    fail: bool,
}

impl FakeRenderer {
    pub fn failing() -> Self {
        Self {
            rendered: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn rendered(&self) -> Vec<(ReportModel, PathBuf)> {
        self.rendered.lock().unwrap().clone()
    }
}

impl ReportRenderer for FakeRenderer {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn render(&self, model: &ReportModel, path: &Path) -> Result<()> {
        if self.fail {
            return Err(Error::Render("scripted render failure".to_string()));
        }
        self.rendered
            .lock()
            .unwrap()
            .push((model.clone(), path.to_path_buf()));
        Ok(())
    }
}
