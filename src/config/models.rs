//! Configuration data structures for the explorer server.
//!
//! These types map directly to TOML (also JSON / YAML) configuration files.
//! Every field has a default so an empty file is a valid configuration.
use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::core::RenderOptions;

fn default_listen_addr() -> String {
    "127.0.0.1:8888".to_string()
}

fn default_restart_interval_ms() -> u64 {
    1000
}

fn default_acl_refresh_interval_ms() -> u64 {
    5555
}

fn default_drain_timeout_ms() -> u64 {
    5000
}

fn default_upstream_timeout_secs() -> u64 {
    30
}

/// Amount formatting
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AmountConfig {
    /// Base units per coin, as a power of ten
    pub decimal_places: u32,
}

impl Default for AmountConfig {
    fn default() -> Self {
        Self { decimal_places: 8 }
    }
}

/// The chain's native asset, rendered by label instead of as a link
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct NativeAssetConfig {
    pub id: u64,
    pub label: String,
}

impl Default for NativeAssetConfig {
    fn default() -> Self {
        Self {
            id: 0,
            label: "Beam".to_string(),
        }
    }
}

/// Node-side explorer endpoint the relay adapter forwards queries to
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Base URL, e.g. `http://127.0.0.1:10000`
    pub url: String,
    #[serde(default = "default_upstream_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub level: String,
    /// JSON lines instead of the pretty console format
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ExplorerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// File of permitted peer addresses. Absent disables the access list.
    #[serde(default)]
    pub access_list_path: Option<PathBuf>,

    /// Peer IPs accepted at the transport level. Empty accepts everyone.
    #[serde(default)]
    pub whitelist: Vec<String>,

    /// Delay before re-binding after a listen or accept failure
    #[serde(default = "default_restart_interval_ms")]
    pub restart_interval_ms: u64,

    /// Period of the access-list modification check
    #[serde(default = "default_acl_refresh_interval_ms")]
    pub acl_refresh_interval_ms: u64,

    /// How long shutdown waits for open connections to finish
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,

    #[serde(default)]
    pub amount: AmountConfig,

    #[serde(default)]
    pub native_asset: NativeAssetConfig,

    #[serde(default)]
    pub upstream: Option<UpstreamConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            access_list_path: None,
            whitelist: Vec::new(),
            restart_interval_ms: default_restart_interval_ms(),
            acl_refresh_interval_ms: default_acl_refresh_interval_ms(),
            drain_timeout_ms: default_drain_timeout_ms(),
            amount: AmountConfig::default(),
            native_asset: NativeAssetConfig::default(),
            upstream: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl ExplorerConfig {
    pub fn restart_interval(&self) -> Duration {
        Duration::from_millis(self.restart_interval_ms)
    }

    pub fn acl_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.acl_refresh_interval_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            decimal_places: self.amount.decimal_places,
            native_asset_id: self.native_asset.id,
            native_asset_label: self.native_asset.label.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: ExplorerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ExplorerConfig::default());
        assert_eq!(config.restart_interval(), Duration::from_secs(1));
        assert_eq!(config.acl_refresh_interval(), Duration::from_millis(5555));
        assert_eq!(config.drain_timeout(), Duration::from_secs(5));
        assert_eq!(config.render_options(), RenderOptions::default());
    }

    #[test]
    fn test_upstream_timeout_default() {
        let config: ExplorerConfig =
            serde_json::from_str(r#"{"upstream": {"url": "http://127.0.0.1:10000"}}"#).unwrap();
        let upstream = config.upstream.unwrap();
        assert_eq!(upstream.timeout_secs, 30);
    }
}
