use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub hardware: HardwareConfig,
    pub publishing: PublishingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub connections_interval_ms: u64,
    pub stats_interval_ms: u64,
    pub traffic_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HardwareConfig {
    pub cpu_interval_ms: u64,
    pub disk_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Records buffered per stream between a monitor task and its consumer.
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// How often the binary logs per-stream counters at INFO level.
    #[serde(default = "default_summary_interval_secs")]
    pub summary_interval_secs: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            summary_interval_secs: default_summary_interval_secs(),
        }
    }
}

fn default_summary_interval_secs() -> u64 {
    60
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {}", path.display(), e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let intervals = [
            (
                "network.connections_interval_ms",
                self.network.connections_interval_ms,
            ),
            ("network.stats_interval_ms", self.network.stats_interval_ms),
            ("network.traffic_interval_ms", self.network.traffic_interval_ms),
            ("hardware.cpu_interval_ms", self.hardware.cpu_interval_ms),
            ("hardware.disk_interval_ms", self.hardware.disk_interval_ms),
            (
                "logging.summary_interval_secs",
                self.logging.summary_interval_secs,
            ),
        ];
        for (key, value) in intervals {
            anyhow::ensure!(value > 0, "{} must be > 0, got {}", key, value);
        }
        anyhow::ensure!(
            self.publishing.channel_capacity > 0,
            "publishing.channel_capacity must be > 0, got {}",
            self.publishing.channel_capacity
        );
        Ok(())
    }
}
