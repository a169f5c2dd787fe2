pub mod bridge;
pub mod client;

pub use bridge::{BridgeError, ChipToolBridge, CommissioningBridge};
