use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    /// Optional CSV drip-feeder standing in for the upstream producer.
    #[serde(default)]
    pub seed: Option<SeedConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enabled: true,
        }
    }
}

/// Feed-client side: where the relay lives and how hard to try getting back
/// to it after a disconnect.
#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,
}

fn default_base_url() -> String {
    "http://127.0.0.1:3001".to_string()
}

fn default_ws_url() -> String {
    "ws://127.0.0.1:3001/ws".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    1000
}

fn default_reconnect_attempts() -> u32 {
    5
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: default_ws_url(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            reconnect_attempts: default_reconnect_attempts(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    pub csv_path: String,
    #[serde(default = "default_seed_interval_ms")]
    pub interval_ms: u64,
}

fn default_seed_interval_ms() -> u64 {
    1000
}

impl Config {
    pub fn load(path: &str) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read config file '{}': {}", path, e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| eyre::eyre!("Failed to parse config file '{}': {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        if self.database.url.is_empty() {
            return Err(eyre::eyre!("database.url must not be empty"));
        }
        if self.api.enabled && self.api.port == 0 {
            return Err(eyre::eyre!("api.port must be non-zero"));
        }
        if self.feed.base_url.is_empty() || self.feed.ws_url.is_empty() {
            return Err(eyre::eyre!("feed.base_url and feed.ws_url must not be empty"));
        }
        if let Some(seed) = &self.seed {
            if seed.csv_path.is_empty() {
                return Err(eyre::eyre!("seed.csv_path must not be empty"));
            }
        }
        Ok(())
    }
}
