use config::Config;
use serde::Deserialize;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    core: Core,
    chip: Chip,
    storage: Storage,
    auth: Auth,
}

impl AppConfig {
    pub fn load() -> Self {
        let mut config: AppConfig = Config::builder()
            .add_source(config::File::with_name("config").required(true))
            .add_source(config::File::with_name("config_local").required(false))
            .add_source(config::Environment::default())
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        // CHIP_TOOL_SERVER_URL takes precedence over any file-based value
        if let Ok(url) = std::env::var("CHIP_TOOL_SERVER_URL") {
            config.chip.server_url = url;
        }

        config
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn chip(&self) -> &Chip {
        &self.chip
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }
}

#[derive(Debug, Deserialize)]
pub struct Core {
    bind_address: IpAddr,
    port: u16,
}

impl Core {
    pub fn bind_address(&self) -> IpAddr {
        self.bind_address
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

#[derive(Debug, Deserialize)]
pub struct Chip {
    server_url: String,
    #[serde(with = "humantime_serde")]
    request_timeout: Duration,
    probe_retry_ms: u64,
    probe_max_delay_ms: u64,
    probe_attempts: usize,
}

impl Chip {
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn probe_retry_ms(&self) -> u64 {
        self.probe_retry_ms
    }

    pub fn probe_max_delay_ms(&self) -> Duration {
        Duration::from_millis(self.probe_max_delay_ms)
    }

    pub fn probe_attempts(&self) -> usize {
        self.probe_attempts
    }
}

#[derive(Debug, Deserialize)]
pub struct Storage {
    base_path: PathBuf,
}

impl Storage {
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    #[serde(with = "humantime_serde")]
    token_ttl: Duration,
}

impl Auth {
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                core: Core {
                    bind_address: "127.0.0.1".parse().unwrap(),
                    port: 8099,
                },
                chip: Chip {
                    server_url: "http://chip.url".to_string(),
                    request_timeout: Duration::from_millis(500),
                    probe_retry_ms: 10,
                    probe_max_delay_ms: 20,
                    probe_attempts: 2,
                },
                storage: Storage {
                    base_path: PathBuf::from("data"),
                },
                auth: Auth {
                    token_ttl: Duration::from_secs(3600),
                },
            },
        }
    }

    pub fn chip_server_url(mut self, url: String) -> Self {
        self.config.chip.server_url = url;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
