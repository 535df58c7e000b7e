//! Typed configuration for the spider.
//!
//! Example `config.json`:
//!
//! ```json
//! {
//!   "channels": [
//!     {"Industry news": ["channel1", "channel2"]},
//!     {"Regional": ["channel3", "channel4"]}
//!   ],
//!   "start_date": "02.04.2025",
//!   "end_date": "02.04.2025",
//!   "keywords": ["regex1", "regex2"]
//! }
//! ```
//!
//! Unknown top-level keys are tolerated so the file can be shared with other
//! tooling (e.g. credential blocks the spider itself does not use).

use std::{collections::HashMap, fs, path::Path};

use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer};

use crate::{errors::Error, Result};

/// Calendar-day format used for the scan window, `dd.mm.yyyy`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Named channel groups, in report order.
    #[serde(rename = "channels", deserialize_with = "de_groups")]
    pub groups: Vec<ChannelGroup>,

    /// Inclusive window bounds as `dd.mm.yyyy` strings.
    pub start_date: String,
    pub end_date: String,

    /// Keyword patterns (regular expressions, matched case-insensitively).
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A named, ordered list of channels; used purely for report sectioning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelGroup {
    pub name: String,
    pub channels: Vec<String>,
}

/// Inclusive calendar-day scan window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Parse the configured window bounds.
    ///
    /// Called once, before any scanning: no scan can proceed without a valid
    /// window, so a parse failure is fatal for the whole run.
    pub fn window(&self) -> Result<DateWindow> {
        let start = parse_date(&self.start_date)?;
        let end = parse_date(&self.end_date)?;
        if start > end {
            return Err(Error::Config(format!(
                "start_date {} is after end_date {}",
                self.start_date, self.end_date
            )));
        }
        Ok(DateWindow { start, end })
    }

    /// Compile all keyword patterns, case-insensitively.
    ///
    /// Compiled once up front so a malformed pattern aborts the run instead of
    /// surfacing as a fetch failure on every channel.
    pub fn compile_keywords(&self) -> Result<Vec<Regex>> {
        self.keywords
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| Error::Config(format!("invalid keyword pattern {pattern:?}: {e}")))
            })
            .collect()
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| Error::Config(format!("invalid date {s:?} (expected dd.mm.yyyy): {e}")))
}

/// The `channels` key is a list of single-entry objects, which keeps group
/// order explicit in the file. Multi-key objects have no defined order after
/// deserialization and are rejected.
fn de_groups<'de, D>(deserializer: D) -> std::result::Result<Vec<ChannelGroup>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    let raw: Vec<HashMap<String, Vec<String>>> = Vec::deserialize(deserializer)?;
    let mut groups = Vec::with_capacity(raw.len());
    for (idx, map) in raw.into_iter().enumerate() {
        let mut entries = map.into_iter();
        let Some((name, channels)) = entries.next() else {
            return Err(D::Error::custom(format!(
                "channels[{idx}] must name exactly one group, found none"
            )));
        };
        if entries.next().is_some() {
            return Err(D::Error::custom(format!(
                "channels[{idx}] must name exactly one group, found several"
            )));
        }
        groups.push(ChannelGroup { name, channels });
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Config {
        serde_json::from_str(json).unwrap()
    }

    const SAMPLE: &str = r#"{
      "api_id": 123456,
      "api_hash": "ignored-by-the-spider",
      "channels": [
        {"Industry news": ["channel1", "channel2"]},
        {"Regional": ["channel3"]}
      ],
      "start_date": "01.01.2025",
      "end_date": "02.01.2025",
      "keywords": ["release", "launch"]
    }"#;

    #[test]
    fn parses_groups_in_file_order_and_ignores_unknown_keys() {
        let config = parse(SAMPLE);
        assert_eq!(config.groups.len(), 2);
        assert_eq!(config.groups[0].name, "Industry news");
        assert_eq!(config.groups[0].channels, ["channel1", "channel2"]);
        assert_eq!(config.groups[1].name, "Regional");
        assert_eq!(config.keywords, ["release", "launch"]);
    }

    #[test]
    fn rejects_multi_key_group_objects() {
        let json = r#"{
          "channels": [{"A": ["x"], "B": ["y"]}],
          "start_date": "01.01.2025",
          "end_date": "01.01.2025"
        }"#;
        let err = serde_json::from_str::<Config>(json).unwrap_err();
        assert!(err.to_string().contains("exactly one group"));
    }

    #[test]
    fn window_parses_inclusive_bounds() {
        let config = parse(SAMPLE);
        let window = config.window().unwrap();
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
    }

    #[test]
    fn window_rejects_malformed_dates() {
        let mut config = parse(SAMPLE);
        config.start_date = "2025-01-01".to_string();
        let err = config.window().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("dd.mm.yyyy"));
    }

    #[test]
    fn window_rejects_inverted_range() {
        let mut config = parse(SAMPLE);
        config.start_date = "03.01.2025".to_string();
        let err = config.window().unwrap_err();
        assert!(err.to_string().contains("after end_date"));
    }

    #[test]
    fn keywords_compile_case_insensitively() {
        let config = parse(SAMPLE);
        let patterns = config.compile_keywords().unwrap();
        assert_eq!(patterns.len(), 2);
        assert!(patterns[0].is_match("New RELEASE out"));
    }

    #[test]
    fn invalid_keyword_pattern_is_a_config_error() {
        let mut config = parse(SAMPLE);
        config.keywords = vec!["(unclosed".to_string()];
        let err = config.compile_keywords().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("invalid keyword pattern"));
    }
}
