use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, PartialEq, Serialize)]
pub struct HubInfo {
    pub status: HubStatus,
    pub version: String,
    pub device_count: usize,
    pub chip_tool_server: ChipToolServer,
    pub started_at: DateTime<Utc>,
    pub storage_path: String,
}

/// `Degraded` means the hub itself is serving but the chip-tool bridge did
/// not answer the last reachability probe, so commissioning and device
/// commands will fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HubStatus {
    Online,
    Degraded,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ChipToolServer {
    pub url: String,
    pub reachable: bool,
}
