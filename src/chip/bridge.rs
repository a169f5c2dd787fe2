use crate::app_config::Chip;
use crate::domain::PairingCode;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, instrument, warn};

/// The hub's seam towards whatever executes chip-tool. The production
/// implementation talks to the external bridge server; the Matter protocol
/// itself lives entirely behind this trait.
#[async_trait]
pub trait CommissioningBridge: Debug + Send + Sync {
    fn url(&self) -> &str;

    async fn pair(&self, node_id: u64, code: &PairingCode) -> Result<String, BridgeError>;

    async fn toggle(&self, node_id: u64, endpoint: u16) -> Result<String, BridgeError>;

    async fn bind(&self, switch_node: u64, light_node: u64, endpoint: u16, cluster: u32) -> Result<String, BridgeError>;

    /// Any HTTP answer counts, even an error status: it proves a server is
    /// listening on the other side.
    async fn is_reachable(&self) -> bool;
}

#[derive(Debug)]
pub struct ChipToolBridge {
    client: Client,
    base_url: String,
}

impl ChipToolBridge {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        ChipToolBridge {
            client,
            base_url: base_url.into(),
        }
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<String, BridgeError> {
        let response = self.client.post(format!("{}{}", self.base_url, path)).json(body).send().await?;

        let status = response.status();
        let bridge_response = response.json::<BridgeResponse>().await.unwrap_or_default();
        if !status.is_success() || bridge_response.status != "ok" {
            return Err(BridgeError::Command(
                bridge_response.stderr.or(bridge_response.output).unwrap_or_else(|| format!("bridge returned {status}")),
            ));
        }

        Ok(bridge_response.output.unwrap_or_default())
    }
}

#[async_trait]
impl CommissioningBridge for ChipToolBridge {
    fn url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self, code))]
    async fn pair(&self, node_id: u64, code: &PairingCode) -> Result<String, BridgeError> {
        self.post("/pair", &PairBody { node_id, code: code.as_str() }).await
    }

    #[instrument(skip(self))]
    async fn toggle(&self, node_id: u64, endpoint: u16) -> Result<String, BridgeError> {
        self.post("/toggle", &ToggleBody { node_id, endpoint }).await
    }

    #[instrument(skip(self))]
    async fn bind(&self, switch_node: u64, light_node: u64, endpoint: u16, cluster: u32) -> Result<String, BridgeError> {
        self.post(
            "/bind",
            &BindBody {
                switch_node,
                light_node,
                endpoint,
                cluster,
            },
        )
        .await
    }

    async fn is_reachable(&self) -> bool {
        self.client.get(format!("{}/", self.base_url)).send().await.is_ok()
    }
}

/// Probes the bridge a limited number of times before letting the hub come
/// up degraded. Commissioning stays unavailable until the bridge answers.
#[instrument(skip_all)]
pub async fn probe(bridge: &dyn CommissioningBridge, config: &Chip) -> bool {
    let strategy = ExponentialBackoff::from_millis(config.probe_retry_ms())
        .factor(2)
        .max_delay(config.probe_max_delay_ms())
        .map(jitter)
        .take(config.probe_attempts());

    info!("Probing chip-tool bridge {}...", bridge.url());
    let reachable = Retry::spawn(strategy, || async {
        if bridge.is_reachable().await { Ok(()) } else { Err("no answer") }
    })
    .await
    .is_ok();

    if reachable {
        info!("Probing chip-tool bridge {}... OK", bridge.url());
    } else {
        warn!("⚠️ Probing chip-tool bridge {}... no answer, starting degraded", bridge.url());
    }

    reachable
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PairBody<'a> {
    node_id: u64,
    code: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToggleBody {
    node_id: u64,
    endpoint: u16,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BindBody {
    switch_node: u64,
    light_node: u64,
    endpoint: u16,
    cluster: u32,
}

#[derive(Debug, Default, Deserialize)]
struct BridgeResponse {
    #[serde(default)]
    status: String,
    output: Option<String>,
    stderr: Option<String>,
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("chip-tool bridge is unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("chip-tool command failed: {0}")]
    Command(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfigBuilder;
    use mockito::Matcher;
    use pretty_assertions::assert_eq;

    fn bridge_for(url: String) -> ChipToolBridge {
        ChipToolBridge::new(Client::new(), url)
    }

    #[tokio::test]
    async fn pair_posts_the_node_id_and_code() -> Result<(), BridgeError> {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/pair")
            .match_body(Matcher::Json(serde_json::json!({
                "nodeId": 17,
                "code": "MT:Y.K90SO527JA0648G00",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": "ok", "output": "Device commissioning completed with success"}"#)
            .create_async()
            .await;

        let code = "MT:Y.K90SO527JA0648G00".parse::<PairingCode>().unwrap();
        let output = bridge_for(server.url()).pair(17, &code).await?;

        mock.assert();
        assert_eq!(output, "Device commissioning completed with success");

        Ok(())
    }

    #[tokio::test]
    async fn toggle_posts_the_node_id_and_endpoint() -> Result<(), BridgeError> {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/toggle")
            .match_body(Matcher::Json(serde_json::json!({"nodeId": 3, "endpoint": 1})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": "ok", "output": ""}"#)
            .create_async()
            .await;

        bridge_for(server.url()).toggle(3, 1).await?;

        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn bind_surfaces_the_stderr_of_a_failed_command() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("POST", "/bind")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status": "error", "stderr": "CHIP Error 0x00000032: Timeout"}"#)
            .create_async()
            .await;

        let result = bridge_for(server.url()).bind(3, 5, 1, 6).await;

        match result {
            Err(BridgeError::Command(stderr)) => assert_eq!(stderr, "CHIP Error 0x00000032: Timeout"),
            other => panic!("expected a command error, found {other:?}"),
        }
    }

    #[tokio::test]
    async fn pair_reports_an_unreachable_bridge() {
        let code = "34970112332".parse::<PairingCode>().unwrap();

        let result = bridge_for("http://127.0.0.1:1".to_string()).pair(1, &code).await;

        assert!(matches!(result, Err(BridgeError::Unreachable(_))));
    }

    #[tokio::test]
    async fn is_reachable_accepts_any_http_answer() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/").with_status(404).create_async().await;

        assert!(bridge_for(server.url()).is_reachable().await);
        assert!(!bridge_for("http://127.0.0.1:1".to_string()).is_reachable().await);
    }

    #[tokio::test]
    async fn probe_succeeds_when_the_bridge_answers() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/").with_status(200).create_async().await;
        let config = AppConfigBuilder::new().chip_server_url(server.url()).build();

        let bridge = bridge_for(config.chip().server_url().to_string());

        assert!(probe(&bridge, config.chip()).await);
    }

    #[tokio::test]
    async fn probe_gives_up_after_the_configured_attempts() {
        let config = AppConfigBuilder::new().chip_server_url("http://127.0.0.1:1".to_string()).build();

        let bridge = bridge_for(config.chip().server_url().to_string());

        assert!(!probe(&bridge, config.chip()).await);
    }
}
