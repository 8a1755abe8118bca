//! Layered configuration: compiled-in defaults, optional YAML file, `P2P_`-prefixed env overrides.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    #[serde(rename = "listen-addr")]
    pub listen_addr: String,
    #[serde(rename = "read-timeout", with = "humantime_serde")]
    pub read_timeout: Duration,
    #[serde(rename = "max-peers")]
    pub max_peers: u32,
    #[serde(rename = "default-peer")]
    pub default_peer: Option<String>,
    pub magic: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: ":8080".to_string(),
            read_timeout: Duration::from_secs(1),
            max_peers: 10,
            default_peer: Some("relays-new.cardano-testnet.iohkdev.io:3001".to_string()),
            magic: 1_097_911_063,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientSettings {
    pub enabled: bool,
    pub endpoint: String,
    #[serde(rename = "period-seconds", with = "humantime_serde")]
    pub period_seconds: Duration,
    #[serde(rename = "fetch-maximum")]
    pub fetch_maximum: usize,
    #[serde(rename = "probe-timeout", with = "humantime_serde")]
    pub probe_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "ws://localhost:1337".to_string(),
            period_seconds: Duration::from_secs(60),
            fetch_maximum: 2000,
            probe_timeout: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub client: ClientSettings,
    pub debug: bool,
}

impl Settings {
    /// Load settings from compiled-in defaults, an optional YAML file, then
    /// `P2P_`-prefixed environment overrides (double-underscore nesting).
    pub fn load(config_file: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?);

        if let Some(path) = config_file {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("P2P")
                .separator("__")
                .try_parsing(true),
        );

        Self::warn_on_legacy_schema();

        builder.build()?.try_deserialize()
    }

    /// The historical dual-network (`testnet`/`mainnet`) config schema predates
    /// the single-network `server`/`client` layout implemented here. We don't
    /// deserialize it; we only warn operators who might still carry it.
    fn warn_on_legacy_schema() {
        if std::env::var("P2P_TESTNET__MAGIC").is_ok() || std::env::var("P2P_MAINNET__MAGIC").is_ok() {
            tracing::warn!(
                "detected legacy dual-network (testnet/mainnet) configuration variables; \
                 this build uses the single-network server/client schema and will ignore them"
            );
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.server.listen_addr, ":8080");
        assert_eq!(s.server.magic, 1_097_911_063);
        assert_eq!(s.server.max_peers, 10);
        assert_eq!(s.client.fetch_maximum, 2000);
        assert!(s.client.enabled);
        assert!(!s.debug);
    }

    #[test]
    fn loads_with_no_file_and_no_env() {
        let s = Settings::load(None).expect("defaults alone must build");
        assert_eq!(s.server.magic, 1_097_911_063);
    }
}
