use crate::chip::{BridgeError, CommissioningBridge};
use crate::domain::{
    AnalyticsEvent, AnalyticsQuery, AnalyticsReport, ChipToolServer, Device, DeviceType, EventType, HubInfo, HubStatus, LogEntry,
    LogKind, LogPage, LogQuery, PairRequest, PairingCode, PairingCodeError,
};
use crate::storage::{AnalyticsStore, CredentialStore, CredentialStoreError, JournalError, LogStore};
use crate::store::{DeviceMap, DeviceStore};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tokio::sync::watch::Receiver as WatchReceiver;
use tracing::{info, instrument, warn};

/// The hub core: owns the device registry and the on-disk state, and
/// delegates every Matter operation to the commissioning bridge.
#[derive(Debug)]
pub struct MatterController {
    bridge: Arc<dyn CommissioningBridge>,
    store: DeviceStore,
    credentials: CredentialStore,
    logs: LogStore,
    analytics: AnalyticsStore,
    storage_path: PathBuf,
    started_at: DateTime<Utc>,
}

impl MatterController {
    /// Creates the `credentials/` and `logs/` directories beneath the
    /// storage path and seeds the registry from previously commissioned
    /// nodes.
    #[instrument(skip_all, fields(storage = %storage_path.display()))]
    pub async fn new(storage_path: &Path, bridge: Arc<dyn CommissioningBridge>) -> Result<Self, ControllerError> {
        let credentials_dir = storage_path.join("credentials");
        let logs_dir = storage_path.join("logs");
        fs::create_dir_all(&credentials_dir).await?;
        fs::create_dir_all(&logs_dir).await?;

        let credentials = CredentialStore::new(credentials_dir);
        let store = DeviceStore::new();
        store.seed(credentials.load_all().await?).await;

        Ok(MatterController {
            bridge,
            store,
            credentials,
            logs: LogStore::new(&logs_dir),
            analytics: AnalyticsStore::new(&logs_dir),
            storage_path: storage_path.to_path_buf(),
            started_at: Utc::now(),
        })
    }

    pub fn notifier(&self) -> WatchReceiver<DeviceMap> {
        self.store.notifier()
    }

    pub async fn get_devices(&self) -> Vec<Device> {
        self.store.devices().await
    }

    pub async fn get_hub_info(&self) -> HubInfo {
        let reachable = self.bridge.is_reachable().await;

        HubInfo {
            status: if reachable { HubStatus::Online } else { HubStatus::Degraded },
            version: env!("CARGO_PKG_VERSION").to_string(),
            device_count: self.store.len().await,
            chip_tool_server: ChipToolServer {
                url: self.bridge.url().to_string(),
                reachable,
            },
            started_at: self.started_at,
            storage_path: self.storage_path.display().to_string(),
        }
    }

    pub async fn get_analytics(&self, query: &AnalyticsQuery) -> Result<AnalyticsReport, ControllerError> {
        Ok(self.analytics.query(query).await?)
    }

    pub async fn get_logs(&self, query: &LogQuery) -> Result<LogPage, ControllerError> {
        Ok(self.logs.query(query).await?)
    }

    /// Commissions a node through the bridge. On success the credential is
    /// persisted before the device becomes visible in the registry.
    #[instrument(skip(self, request), fields(node_id = request.node_id))]
    pub async fn pair(&self, request: PairRequest) -> Result<Device, ControllerError> {
        let code: PairingCode = request.code.parse()?;
        if self.store.contains(request.node_id).await {
            return Err(ControllerError::AlreadyPaired { node_id: request.node_id });
        }

        info!("🔗 Pairing node {}...", request.node_id);
        match self.bridge.pair(request.node_id, &code).await {
            Ok(output) => {
                let device = Device {
                    id: request.node_id,
                    name: request.name.unwrap_or_else(|| format!("Node {}", request.node_id)),
                    r#type: DeviceType::Unknown,
                    paired_at: Utc::now(),
                };

                self.credentials.save(&device).await?;
                self.store.register(device.clone()).await;
                self.record(AnalyticsEvent::new(EventType::DevicePaired, Some(device.id), output)).await;
                self.log(LogEntry::for_node(LogKind::Pairing, device.id, format!("Paired device '{}'", device.name)))
                    .await;

                info!("🔗 Pairing node {}... OK", device.id);
                Ok(device)
            }
            Err(e) => {
                warn!("⚠️ Pairing node {}... failed: {}", request.node_id, e);
                self.record(AnalyticsEvent::new(EventType::PairFailed, Some(request.node_id), e.to_string())).await;
                self.log(LogEntry::for_node(LogKind::Error, request.node_id, format!("Pairing failed: {e}"))).await;
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn toggle(&self, node_id: u64, endpoint: u16) -> Result<(), ControllerError> {
        if !self.store.contains(node_id).await {
            return Err(ControllerError::UnknownDevice { node_id });
        }

        match self.bridge.toggle(node_id, endpoint).await {
            Ok(_) => {
                self.record(AnalyticsEvent::new(EventType::DeviceToggled, Some(node_id), format!("endpoint {endpoint}")))
                    .await;
                self.log(LogEntry::for_node(LogKind::Command, node_id, format!("Toggled endpoint {endpoint}"))).await;
                Ok(())
            }
            Err(e) => {
                warn!("⚠️ Toggling node {}... failed: {}", node_id, e);
                self.record(AnalyticsEvent::new(EventType::CommandFailed, Some(node_id), e.to_string())).await;
                self.log(LogEntry::for_node(LogKind::Error, node_id, format!("Toggle failed: {e}"))).await;
                Err(e.into())
            }
        }
    }

    /// Writes a binding table entry so `switch_node` can control
    /// `light_node` directly.
    #[instrument(skip(self))]
    pub async fn bind(&self, switch_node: u64, light_node: u64, endpoint: u16, cluster: u32) -> Result<(), ControllerError> {
        for node_id in [switch_node, light_node] {
            if !self.store.contains(node_id).await {
                return Err(ControllerError::UnknownDevice { node_id });
            }
        }

        match self.bridge.bind(switch_node, light_node, endpoint, cluster).await {
            Ok(_) => {
                self.record(AnalyticsEvent::new(
                    EventType::BindingCreated,
                    Some(switch_node),
                    format!("bound to node {light_node}, cluster {cluster}"),
                ))
                .await;
                self.log(LogEntry::for_node(
                    LogKind::Command,
                    switch_node,
                    format!("Bound to node {light_node} on cluster {cluster}"),
                ))
                .await;
                Ok(())
            }
            Err(e) => {
                warn!("⚠️ Binding node {} to node {}... failed: {}", switch_node, light_node, e);
                self.record(AnalyticsEvent::new(EventType::CommandFailed, Some(switch_node), e.to_string())).await;
                self.log(LogEntry::for_node(LogKind::Error, switch_node, format!("Bind failed: {e}"))).await;
                Err(e.into())
            }
        }
    }

    // Audit writes never mask the outcome of the operation they describe.
    async fn record(&self, event: AnalyticsEvent) {
        if let Err(e) = self.analytics.record(&event).await {
            warn!("⚠️ Could not record analytics event: {}", e);
        }
    }

    async fn log(&self, entry: LogEntry) {
        if let Err(e) = self.logs.append(&entry).await {
            warn!("⚠️ Could not append audit log entry: {}", e);
        }
    }
}

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("invalid setup code: {0}")]
    InvalidCode(#[from] PairingCodeError),
    #[error("node {node_id} is already paired")]
    AlreadyPaired { node_id: u64 },
    #[error("node {node_id} is not paired to this hub")]
    UnknownDevice { node_id: u64 },
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error("credential storage error: {0}")]
    Credentials(#[from] CredentialStoreError),
    #[error("journal storage error: {0}")]
    Journal(#[from] JournalError),
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}
