//! Telegram adapter (public channel preview).
//!
//! Implements the `tgspider-core` MessageSource over the `t.me/s/<channel>`
//! web preview: public channels expose their history there without
//! credentials, roughly twenty messages per page, paginated backward with
//! `?before=<id>`.

use std::{collections::VecDeque, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use reqwest::{header, StatusCode};
use tokio::time::sleep;

use tgspider_core::{
    domain::{ChannelId, MessageId, RawMessage},
    errors::Error,
    source::{HistoryCursor, MessageSource},
    Result,
};

const PREVIEW_BASE: &str = "https://t.me/s";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_DELAY: Duration = Duration::from_secs(3);
const MAX_RETRIES: usize = 1;

/// History source backed by the public channel preview pages.
///
/// Holds no session state; a failed channel leaves the client reusable for
/// the next one.
#[derive(Clone, Default)]
pub struct TelegramPreviewSource {
    http: reqwest::Client,
}

impl TelegramPreviewSource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn fetch_page(&self, channel: &ChannelId, before: Option<MessageId>) -> Result<String> {
        let mut url = format!("{PREVIEW_BASE}/{channel}");
        if let Some(MessageId(id)) = before {
            url = format!("{url}?before={id}");
        }

        let mut attempts = 0usize;
        loop {
            let response = self
                .http
                .get(&url)
                .header(header::USER_AGENT, USER_AGENT)
                .timeout(FETCH_TIMEOUT)
                .send()
                .await
                .map_err(|e| fetch_error(channel, &e.to_string()))?;

            // Telegram soft-limits anonymous preview traffic with 429s.
            if response.status() == StatusCode::TOO_MANY_REQUESTS && attempts < MAX_RETRIES {
                attempts += 1;
                sleep(RETRY_DELAY).await;
                continue;
            }

            let response = response
                .error_for_status()
                .map_err(|e| fetch_error(channel, &e.to_string()))?;
            return response
                .text()
                .await
                .map_err(|e| fetch_error(channel, &e.to_string()));
        }
    }
}

#[async_trait]
impl MessageSource for TelegramPreviewSource {
    async fn open_history(
        &self,
        channel: &ChannelId,
        anchor: NaiveDate,
    ) -> Result<Box<dyn HistoryCursor>> {
        Ok(Box::new(PreviewCursor {
            source: self.clone(),
            channel: channel.clone(),
            anchor,
            buffer: VecDeque::new(),
            before: None,
            exhausted: false,
        }))
    }
}

/// Backward walk over the preview pages, newest message first.
///
/// Pages newer than the anchor day are consumed internally and never reach
/// the caller, so the first yielded message is at or adjacent to the anchor.
struct PreviewCursor {
    source: TelegramPreviewSource,
    channel: ChannelId,
    anchor: NaiveDate,
    buffer: VecDeque<RawMessage>,
    before: Option<MessageId>,
    exhausted: bool,
}

#[async_trait]
impl HistoryCursor for PreviewCursor {
    async fn next(&mut self) -> Result<Option<RawMessage>> {
        loop {
            if let Some(message) = self.buffer.pop_front() {
                if message.date.date_naive() > self.anchor {
                    continue;
                }
                return Ok(Some(message));
            }
            if self.exhausted {
                return Ok(None);
            }

            let html = self.source.fetch_page(&self.channel, self.before).await?;
            let mut page = parse_history_page(&self.channel, &html);

            let Some(lowest) = page.iter().map(|m| m.id).min() else {
                self.exhausted = true;
                continue;
            };
            // A page that fails to move the cursor ends the walk.
            if self.before.is_some_and(|b| lowest >= b) {
                self.exhausted = true;
                continue;
            }
            self.before = Some(lowest);

            // Pages come oldest-first; the cursor serves newest-first.
            page.reverse();
            self.buffer.extend(page);
        }
    }
}

fn fetch_error(channel: &ChannelId, reason: &str) -> Error {
    Error::ChannelFetch {
        channel: channel.0.clone(),
        reason: reason.to_string(),
    }
}

/// Extract messages from one preview page, in DOM (ascending) order.
///
/// Each message block carries `data-post="<channel>/<id>"`, a `<time
/// datetime>` stamp and, for text posts, a message-text div. Blocks without
/// a timestamp are not messages and are dropped; blocks without a text div
/// (media-only posts) yield `text: None`.
fn parse_history_page(channel: &ChannelId, html: &str) -> Vec<RawMessage> {
    let post_re = Regex::new(r#"data-post="[^"/]+/(\d+)""#).expect("valid regex");
    let time_re = Regex::new(r#"<time[^>]*datetime="([^"]+)""#).expect("valid regex");
    let text_re =
        Regex::new(r#"(?s)<div class="tgme_widget_message_text[^"]*"[^>]*>(.*?)</div>"#)
            .expect("valid regex");

    let marks: Vec<(usize, i64)> = post_re
        .captures_iter(html)
        .filter_map(|caps| {
            let start = caps.get(0)?.start();
            let id = caps.get(1)?.as_str().parse().ok()?;
            Some((start, id))
        })
        .collect();

    let mut messages: Vec<RawMessage> = Vec::with_capacity(marks.len());
    for (idx, (start, id)) in marks.iter().enumerate() {
        if messages.last().map(|m| m.id) == Some(MessageId(*id)) {
            continue;
        }

        let end = marks.get(idx + 1).map(|(s, _)| *s).unwrap_or(html.len());
        let block = &html[*start..end];

        let Some(date) = time_re
            .captures(block)
            .and_then(|caps| caps.get(1))
            .and_then(|m| DateTime::parse_from_rfc3339(m.as_str()).ok())
        else {
            continue;
        };

        let text = text_re
            .captures(block)
            .and_then(|caps| caps.get(1))
            .map(|m| html_to_text(m.as_str()));

        messages.push(RawMessage {
            channel: channel.clone(),
            id: MessageId(*id),
            date: date.with_timezone(&Utc),
            text,
        });
    }
    messages
}

/// Flatten a message-text fragment to plain text: `<br>` becomes a newline,
/// every other tag is stripped, entities are decoded.
fn html_to_text(fragment: &str) -> String {
    let br_re = Regex::new(r"(?i)<br\s*/?>").expect("valid regex");
    let tag_re = Regex::new(r"(?s)<[^>]+>").expect("valid regex");

    let with_breaks = br_re.replace_all(fragment, "\n");
    let stripped = tag_re.replace_all(&with_breaks, "");
    decode_entities(stripped.trim())
}

fn decode_entities(text: &str) -> String {
    // `&amp;` last, so `&amp;lt;` decodes to the literal `&lt;`.
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
