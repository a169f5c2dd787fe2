//! Smoke tests for a Matter hub deployment. Every check prints a status
//! line and the run continues regardless of failures; the process always
//! exits 0 so it can run in environments where the hub is only half up.

use clap::{Parser, Subcommand};
use matterhub::chip::{self, ChipToolBridge, CommissioningBridge};
use matterhub::controller::MatterController;
use matterhub::domain::{AnalyticsQuery, LogQuery};
use reqwest::Client;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "smoke", about = "Smoke tests for a Matter hub deployment")]
struct SmokeArgs {
    #[command(subcommand)]
    command: SmokeCommand,
}

#[derive(Subcommand)]
enum SmokeCommand {
    /// Exercise the HTTP API of a running hub
    Api {
        #[arg(long, default_value = "http://localhost:8099")]
        base_url: String,
    },
    /// Exercise the controller core against a disposable storage directory
    Controller {
        #[arg(long)]
        storage: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    match SmokeArgs::parse().command {
        SmokeCommand::Api { base_url } => api_smoke(&base_url).await,
        SmokeCommand::Controller { storage } => controller_smoke(storage).await,
    }
}

async fn api_smoke(base_url: &str) {
    println!("🧪 Testing the Matter hub API...");

    let client = match Client::builder().timeout(Duration::from_secs(10)).build() {
        Ok(client) => client,
        Err(e) => {
            println!("❌ Could not build an HTTP client: {e}");
            return;
        }
    };

    // Root endpoint. A connection error here means nothing is listening, so
    // the remaining checks would only repeat the same failure.
    match client.get(format!("{base_url}/")).send().await {
        Ok(response) if response.status().is_success() => println!("✅ Root endpoint working"),
        Ok(response) => println!("❌ Root endpoint failed: {}", response.status()),
        Err(e) => {
            println!("❌ Error accessing root endpoint: {e}");
            return;
        }
    }

    // Token creation
    let token_body = json!({"client_id": "smoke_client", "client_name": "Smoke Client"});
    let token = match client.post(format!("{base_url}/api/token")).json(&token_body).send().await {
        Ok(response) if response.status().is_success() => match response.json::<Value>().await {
            Ok(body) => {
                let token = body["access_token"].as_str().unwrap_or("").to_string();
                let preview: String = token.chars().take(20).collect();
                println!("✅ Token created: {preview}...");
                (!token.is_empty()).then_some(token)
            }
            Err(e) => {
                println!("❌ Error reading the token response: {e}");
                None
            }
        },
        Ok(response) => {
            println!("❌ Token creation failed: {}", response.status());
            None
        }
        Err(e) => {
            println!("❌ Error creating token: {e}");
            None
        }
    };

    let with_auth = |builder: reqwest::RequestBuilder| match &token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    };

    // Devices endpoint
    match with_auth(client.get(format!("{base_url}/api/devices"))).send().await {
        Ok(response) if response.status().is_success() => {
            let count = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.as_array().map(Vec::len))
                .unwrap_or(0);
            println!("✅ Devices endpoint working: {count} devices");
        }
        Ok(response) => println!("❌ Devices endpoint failed: {}", response.status()),
        Err(e) => println!("❌ Error getting devices: {e}"),
    }

    // Hub info endpoint
    match with_auth(client.get(format!("{base_url}/api/hub"))).send().await {
        Ok(response) if response.status().is_success() => {
            let status = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body["status"].as_str().map(String::from))
                .unwrap_or_else(|| "unknown".to_string());
            println!("✅ Hub info endpoint working: {status}");
        }
        Ok(response) => println!("❌ Hub info endpoint failed: {}", response.status()),
        Err(e) => println!("❌ Error getting hub info: {e}"),
    }

    // Analytics endpoint
    let analytics_body = json!({"start_time": null, "end_time": null, "event_types": null});
    match with_auth(client.post(format!("{base_url}/api/analytics")).json(&analytics_body)).send().await {
        Ok(response) if response.status().is_success() => {
            let count = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body["count"].as_u64())
                .unwrap_or(0);
            println!("✅ Analytics endpoint working: {count} events");
        }
        Ok(response) => println!("❌ Analytics endpoint failed: {}", response.status()),
        Err(e) => println!("❌ Error getting analytics: {e}"),
    }

    // Logs endpoint
    let logs_body = json!({"start_time": null, "end_time": null, "log_types": null, "limit": 10});
    match with_auth(client.post(format!("{base_url}/api/logs")).json(&logs_body)).send().await {
        Ok(response) if response.status().is_success() => {
            let count = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body["count"].as_u64())
                .unwrap_or(0);
            println!("✅ Logs endpoint working: {count} entries");
        }
        Ok(response) => println!("❌ Logs endpoint failed: {}", response.status()),
        Err(e) => println!("❌ Error getting logs: {e}"),
    }

    // Pair endpoint. Without a live chip-tool bridge behind the hub this is
    // expected to fail; the check verifies the error shape, not success.
    let pair_body = json!({"node_id": 1, "code": "MT:Y.K90SO527JA0648G00"});
    match client.post(format!("{base_url}/pair")).json(&pair_body).send().await {
        Ok(response) if response.status().is_success() => {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body["message"].as_str().map(String::from))
                .unwrap_or_else(|| "success".to_string());
            println!("✅ Pair endpoint working: {message}");
        }
        Ok(response) => {
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body["detail"].as_str().map(String::from))
                .unwrap_or_else(|| "Unknown error".to_string());
            println!("⚠️  Pair endpoint failed (expected): {detail}");
        }
        Err(e) => println!("⚠️  Error testing pair endpoint (expected): {e}"),
    }

    println!("🎉 API test completed!");
}

async fn controller_smoke(storage: Option<PathBuf>) {
    println!("🧪 Testing the Matter controller...");

    let storage_path = storage.unwrap_or_else(|| std::env::temp_dir().join("matterhub-smoke"));
    let server_url = std::env::var("CHIP_TOOL_SERVER_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());

    let client = match chip::client::new_client(Duration::from_secs(10)) {
        Ok(client) => client,
        Err(e) => {
            println!("❌ Could not build an HTTP client: {e}");
            return;
        }
    };
    let bridge: Arc<dyn CommissioningBridge> = Arc::new(ChipToolBridge::new(client, server_url));

    let controller = match MatterController::new(&storage_path, bridge).await {
        Ok(controller) => controller,
        Err(e) => {
            println!("❌ Error initializing controller: {e}");
            return;
        }
    };
    println!("✅ Controller initialized");

    let devices = controller.get_devices().await;
    println!("📱 Found {} devices", devices.len());
    for device in &devices {
        println!("  - {} (ID: {})", device.name, device.id);
    }

    let hub_info = controller.get_hub_info().await;
    match serde_json::to_string_pretty(&hub_info) {
        Ok(rendered) => println!("🏠 Hub info: {rendered}"),
        Err(e) => println!("❌ Error rendering hub info: {e}"),
    }

    match controller.get_analytics(&AnalyticsQuery::default()).await {
        Ok(report) => println!("📊 Analytics: {} events", report.count),
        Err(e) => println!("❌ Error getting analytics: {e}"),
    }

    let query = LogQuery {
        limit: Some(5),
        ..LogQuery::default()
    };
    match controller.get_logs(&query).await {
        Ok(page) => {
            println!("📝 Recent logs: {} entries", page.count);
            for entry in page.entries.iter().take(3) {
                println!("  - {}: {}", entry.r#type, entry.message);
            }
        }
        Err(e) => println!("❌ Error getting logs: {e}"),
    }

    println!("🎉 Controller test completed!");
}
