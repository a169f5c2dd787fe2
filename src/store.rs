use crate::domain::Device;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch::{Receiver as WatchReceiver, Sender as WatchSender};
use tokio::sync::{RwLock, watch};
use tracing::{info, instrument};

pub type DeviceMap = Arc<RwLock<HashMap<u64, Device>>>;

/// In-memory registry of commissioned devices. Seeded from the credential
/// store at boot; interested tasks observe changes through the notifier.
#[derive(Debug)]
pub struct DeviceStore {
    devices: DeviceMap,
    notifier_tx: WatchSender<DeviceMap>,
    notifier_rx: WatchReceiver<DeviceMap>,
}

impl DeviceStore {
    pub fn new() -> Self {
        let devices = Arc::new(RwLock::new(HashMap::new()));
        let (notifier_tx, notifier_rx) = watch::channel::<DeviceMap>(devices.clone());

        DeviceStore {
            devices,
            notifier_tx,
            notifier_rx,
        }
    }

    pub fn notifier(&self) -> WatchReceiver<DeviceMap> {
        self.notifier_rx.clone()
    }

    #[instrument(skip_all)]
    pub async fn seed(&self, devices: Vec<Device>) {
        let num_devices = devices.len();
        let mut write_guard = self.devices.write().await;
        write_guard.extend(devices.into_iter().map(|device| (device.id, device)));
        drop(write_guard);

        info!("🔵 Seeded the device registry with {} device(s)", num_devices);
        self.notifier_tx.send(self.devices.clone()).unwrap_or_default();
    }

    pub async fn register(&self, device: Device) {
        info!("🔵 Registering device '{}' (node {})...", device.name, device.id);
        self.devices.write().await.insert(device.id, device);
        self.notifier_tx.send(self.devices.clone()).unwrap_or_default();
    }

    pub async fn contains(&self, node_id: u64) -> bool {
        self.devices.read().await.contains_key(&node_id)
    }

    pub async fn devices(&self) -> Vec<Device> {
        let mut devices: Vec<Device> = self.devices.read().await.values().cloned().collect();
        devices.sort_by_key(|device| device.id);
        devices
    }

    pub async fn len(&self) -> usize {
        self.devices.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.devices.read().await.is_empty()
    }
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DeviceType;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn device(id: u64, name: &str) -> Device {
        Device {
            id,
            name: name.to_string(),
            r#type: DeviceType::Unknown,
            paired_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn devices_returns_registered_devices_sorted_by_node_id() {
        let store = DeviceStore::new();
        store.register(device(7, "Hallway")).await;
        store.register(device(2, "Kitchen")).await;

        let devices = store.devices().await;

        let ids: Vec<u64> = devices.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![2, 7]);
    }

    #[tokio::test]
    async fn register_notifies_observers() {
        let store = DeviceStore::new();
        let mut notifier = store.notifier();

        store.register(device(1, "Kitchen")).await;

        assert!(notifier.changed().await.is_ok());
        let map = notifier.borrow().clone();
        assert_eq!(map.read().await.len(), 1);
    }

    #[tokio::test]
    async fn seed_registers_every_device() {
        let store = DeviceStore::new();
        store.seed(vec![device(1, "Kitchen"), device(2, "Hallway")]).await;

        assert_eq!(store.len().await, 2);
        assert!(store.contains(2).await);
    }
}
