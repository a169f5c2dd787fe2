use crate::store::DeviceMap;
use tokio::sync::watch::Receiver;
use tracing::{info, instrument};

#[instrument(skip_all)]
pub async fn store_listener(mut rx: Receiver<DeviceMap>) {
    while rx.changed().await.is_ok() {
        let devices = rx.borrow().clone();
        let count = devices.read().await.len();
        info!("🔵 Device registry changed, tracking {} device(s)", count);
    }
}
