use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A commissioned Matter node as known to the hub. The record is persisted
/// as a credential document and mirrored in the in-memory store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: u64,
    pub name: String,
    pub r#type: DeviceType,
    pub paired_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Light,
    Switch,
    Sensor,
    Unknown,
}
