use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the atelier engine.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AtelierConfig {
    /// Revival campaign settings
    pub campaign: CampaignConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CampaignConfig {
    /// Minimum contact age before a prospect counts as stale
    pub staleness_days: u32,
    /// Pause between consecutive sends in one batch run
    pub inter_item_delay_ms: u64,
    /// Provider rate ceiling the dispatcher must stay under
    pub sends_per_second: u32,
    /// Burst capacity for the rate limiter
    pub burst_capacity: u32,
    /// Per-send timeout
    pub send_timeout_seconds: u64,
    /// Cap for the rate-limit backoff ramp
    pub max_backoff_ms: u64,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            staleness_days: 7,
            inter_item_delay_ms: 600,
            sends_per_second: 2,
            burst_capacity: 2,
            send_timeout_seconds: 10,
            max_backoff_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level when RUST_LOG is not set
    pub log_level: String,
    /// Emit structured JSON instead of human-readable lines
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl CampaignConfig {
    pub fn staleness(&self) -> chrono::Duration {
        chrono::Duration::days(self.staleness_days as i64)
    }
}

impl AtelierConfig {
    /// Load from `atelier.toml` (optional) layered under `ATELIER_*`
    /// environment variables, e.g. `ATELIER_CAMPAIGN__STALENESS_DAYS=14`.
    pub fn load() -> Result<Self> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
        }

        let settings = Config::builder()
            .add_source(File::with_name("atelier").required(false))
            .add_source(
                Environment::with_prefix("ATELIER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix("ATELIER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Write the configuration as TOML, used by `atelier init`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let rendered = toml::to_string_pretty(self)?;
        std::fs::write(path, rendered)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_tunables() {
        let config = AtelierConfig::default();
        assert_eq!(config.campaign.staleness_days, 7);
        assert_eq!(config.campaign.inter_item_delay_ms, 600);
        assert_eq!(config.campaign.sends_per_second, 2);
        assert_eq!(config.observability.log_level, "info");
        assert!(!config.observability.json_logs);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = AtelierConfig::default();
        config.campaign.staleness_days = 14;

        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: AtelierConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.campaign.staleness_days, 14);
        assert_eq!(parsed.campaign.inter_item_delay_ms, 600);
    }

    #[test]
    fn staleness_helper_converts_days() {
        let config = CampaignConfig::default();
        assert_eq!(config.staleness(), chrono::Duration::days(7));
    }
}
