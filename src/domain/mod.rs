pub mod analytics;
pub mod device;
pub mod hub;
pub mod log;
pub mod pairing;

pub use analytics::{AnalyticsEvent, AnalyticsQuery, AnalyticsReport, EventType};
pub use device::{Device, DeviceType};
pub use hub::{ChipToolServer, HubInfo, HubStatus};
pub use log::{LogEntry, LogKind, LogPage, LogQuery};
pub use pairing::{PairRequest, PairingCode, PairingCodeError};
