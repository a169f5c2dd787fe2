use matterhub::api::auth::TokenRegistry;
use matterhub::api::{AppState, build_router};
use matterhub::app_config::AppConfig;
use matterhub::chip::{self, ChipToolBridge, CommissioningBridge};
use matterhub::controller::MatterController;
use matterhub::store_listener::store_listener;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load();
    info!("✅  Loaded configuration");

    let client = chip::client::new_client(config.chip().request_timeout())?;
    let bridge: Arc<dyn CommissioningBridge> = Arc::new(ChipToolBridge::new(client, config.chip().server_url()));
    chip::bridge::probe(bridge.as_ref(), config.chip()).await;

    let controller = Arc::new(MatterController::new(config.storage().base_path(), bridge).await?);
    info!("✅  Initialized controller");

    let notifier_rx = controller.notifier();
    task::spawn(async move {
        store_listener(notifier_rx).await;
    });
    info!("✅  Initialized store listener");

    let state = AppState {
        controller,
        tokens: TokenRegistry::new(config.auth().token_ttl()),
    };
    let router = build_router(state);

    let address = SocketAddr::new(config.core().bind_address(), config.core().port());
    let listener = TcpListener::bind(address).await?;
    info!("🔥 {} is up and listening on http://{}", env!("CARGO_PKG_NAME"), address);

    axum::serve(listener, router).await?;

    Ok(())
}
