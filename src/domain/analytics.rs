use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A domain event recorded for analytics, one per hub operation outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub timestamp: DateTime<Utc>,
    pub r#type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<u64>,
    pub detail: String,
}

impl AnalyticsEvent {
    pub fn new(kind: EventType, node_id: Option<u64>, detail: impl Into<String>) -> Self {
        AnalyticsEvent {
            timestamp: Utc::now(),
            r#type: kind,
            node_id,
            detail: detail.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    DevicePaired,
    PairFailed,
    DeviceToggled,
    BindingCreated,
    CommandFailed,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::DevicePaired => "device_paired",
            EventType::PairFailed => "pair_failed",
            EventType::DeviceToggled => "device_toggled",
            EventType::BindingCreated => "binding_created",
            EventType::CommandFailed => "command_failed",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub event_types: Option<Vec<EventType>>,
}

impl AnalyticsQuery {
    pub fn matches(&self, event: &AnalyticsEvent) -> bool {
        if self.start_time.is_some_and(|start| event.timestamp < start) {
            return false;
        }
        if self.end_time.is_some_and(|end| event.timestamp > end) {
            return false;
        }
        match &self.event_types {
            Some(types) => types.contains(&event.r#type),
            None => true,
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub count: usize,
    pub by_type: BTreeMap<String, usize>,
    pub events: Vec<AnalyticsEvent>,
}

impl AnalyticsReport {
    pub fn from_events(events: Vec<AnalyticsEvent>) -> Self {
        let mut by_type = BTreeMap::new();
        for event in &events {
            *by_type.entry(event.r#type.to_string()).or_insert(0) += 1;
        }

        AnalyticsReport {
            count: events.len(),
            by_type,
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn from_events_counts_per_event_type() {
        let events = vec![
            AnalyticsEvent::new(EventType::DevicePaired, Some(1), "paired"),
            AnalyticsEvent::new(EventType::DevicePaired, Some(2), "paired"),
            AnalyticsEvent::new(EventType::PairFailed, Some(3), "bridge unreachable"),
        ];

        let report = AnalyticsReport::from_events(events);

        assert_eq!(report.count, 3);
        assert_eq!(report.by_type.get("device_paired"), Some(&2));
        assert_eq!(report.by_type.get("pair_failed"), Some(&1));
    }

    #[test]
    fn matches_applies_the_event_type_filter() {
        let query = AnalyticsQuery {
            event_types: Some(vec![EventType::DeviceToggled]),
            ..AnalyticsQuery::default()
        };

        assert!(query.matches(&AnalyticsEvent::new(EventType::DeviceToggled, Some(1), "toggled")));
        assert!(!query.matches(&AnalyticsEvent::new(EventType::DevicePaired, Some(1), "paired")));
    }
}
