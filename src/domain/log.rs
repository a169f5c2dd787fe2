use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One line of the hub's audit trail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub r#type: LogKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<u64>,
}

impl LogEntry {
    pub fn new(kind: LogKind, message: impl Into<String>) -> Self {
        LogEntry {
            timestamp: Utc::now(),
            r#type: kind,
            message: message.into(),
            node_id: None,
        }
    }

    pub fn for_node(kind: LogKind, node_id: u64, message: impl Into<String>) -> Self {
        LogEntry {
            timestamp: Utc::now(),
            r#type: kind,
            message: message.into(),
            node_id: Some(node_id),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Pairing,
    Command,
    System,
    Error,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Pairing => "pairing",
            LogKind::Command => "command",
            LogKind::System => "system",
            LogKind::Error => "error",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter for querying the audit trail. All fields are optional; `limit`
/// keeps the most recent matching entries.
#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub log_types: Option<Vec<LogKind>>,
    pub limit: Option<usize>,
}

impl LogQuery {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if self.start_time.is_some_and(|start| entry.timestamp < start) {
            return false;
        }
        if self.end_time.is_some_and(|end| entry.timestamp > end) {
            return false;
        }
        match &self.log_types {
            Some(types) => types.contains(&entry.r#type),
            None => true,
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct LogPage {
    pub count: usize,
    pub entries: Vec<LogEntry>,
}

impl LogPage {
    pub fn from_entries(entries: Vec<LogEntry>) -> Self {
        LogPage {
            count: entries.len(),
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn entry_at(hour: u32, kind: LogKind) -> LogEntry {
        LogEntry {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap(),
            r#type: kind,
            message: "message".to_string(),
            node_id: None,
        }
    }

    #[rstest]
    #[case(None, None, true)]
    #[case(Some(9), None, true)]
    #[case(Some(11), None, false)]
    #[case(None, Some(11), true)]
    #[case(None, Some(9), false)]
    #[case(Some(9), Some(11), true)]
    fn matches_applies_the_time_range(#[case] start: Option<u32>, #[case] end: Option<u32>, #[case] expected: bool) {
        let query = LogQuery {
            start_time: start.map(|h| Utc.with_ymd_and_hms(2026, 3, 14, h, 0, 0).unwrap()),
            end_time: end.map(|h| Utc.with_ymd_and_hms(2026, 3, 14, h, 0, 0).unwrap()),
            ..LogQuery::default()
        };

        assert_eq!(query.matches(&entry_at(10, LogKind::System)), expected);
    }

    #[test]
    fn matches_applies_the_type_filter() {
        let query = LogQuery {
            log_types: Some(vec![LogKind::Pairing, LogKind::Error]),
            ..LogQuery::default()
        };

        assert!(query.matches(&entry_at(10, LogKind::Pairing)));
        assert!(!query.matches(&entry_at(10, LogKind::Command)));
    }
}
