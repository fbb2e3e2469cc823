//! Engine configuration
//!
//! Serde-backed configuration for the station and access-point roles plus
//! the bounded association-polling policy. Defaults carry the constants the
//! reference scenarios run with. Configuration can be loaded from and saved
//! to JSON or TOML files, selected by extension.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::{AirframeError, Result};

/// Station-side connection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// Network name to associate with.
    pub ssid: String,
    /// WPA2-PSK passphrase.
    pub password: String,
    /// Channel to scan; 0 finds the channel dynamically.
    pub channel: u8,
    /// Pin the association to a specific BSSID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bssid: Option<[u8; 6]>,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            ssid: "esp32SSID".to_string(),
            password: "esp32test".to_string(),
            channel: 0,
            bssid: None,
        }
    }
}

/// Access-point-side parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessPointConfig {
    /// Network name to broadcast.
    pub ssid: String,
    /// WPA2-PSK passphrase.
    pub password: String,
    /// Primary channel.
    pub channel: u8,
    /// Largest number of associated stations accepted.
    pub max_connections: u8,
    /// Beacon interval in milliseconds.
    pub beacon_interval_ms: u16,
    /// Do not broadcast the SSID.
    pub hidden: bool,
}

impl Default for AccessPointConfig {
    fn default() -> Self {
        Self {
            ssid: "esp32SSID".to_string(),
            password: "esp32test".to_string(),
            channel: 6,
            max_connections: 4,
            beacon_interval_ms: 300,
            hidden: false,
        }
    }
}

/// Bounded association-polling policy.
///
/// Association is expected to resolve within a short fixed window or not at
/// all, so the poll is capped and non-exponential. This is the only retry
/// loop in the library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationPolicy {
    /// Number of association-status polls before giving up.
    pub max_attempts: u32,
    /// Fixed delay between polls.
    pub poll_interval: Duration,
}

impl Default for AssociationPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Bundle of everything the engine is configured with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub station: StationConfig,
    pub access_point: AccessPointConfig,
    pub association: AssociationPolicy,
}

impl EngineConfig {
    /// Load configuration from a JSON or TOML file, selected by extension.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| AirframeError::Config(format!("invalid JSON config: {e}"))),
            Some("toml") => toml::from_str(&content)
                .map_err(|e| AirframeError::Config(format!("invalid TOML config: {e}"))),
            other => Err(AirframeError::Config(format!(
                "unsupported config extension: {other:?}"
            ))),
        }
    }

    /// Save configuration to a JSON or TOML file, selected by extension.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)
                .map_err(|e| AirframeError::Config(format!("cannot encode JSON config: {e}")))?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| AirframeError::Config(format!("cannot encode TOML config: {e}")))?,
            other => {
                return Err(AirframeError::Config(format!(
                    "unsupported config extension: {other:?}"
                )))
            }
        };
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_scenario() {
        let ap = AccessPointConfig::default();
        assert_eq!(ap.channel, 6);
        assert_eq!(ap.max_connections, 4);
        assert_eq!(ap.beacon_interval_ms, 300);
        assert!(!ap.hidden);

        let sta = StationConfig::default();
        assert_eq!(sta.channel, 0);
        assert!(sta.bssid.is_none());

        let policy = AssociationPolicy::default();
        assert_eq!(policy.max_attempts, 20);
        assert_eq!(policy.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");

        let mut config = EngineConfig::default();
        config.station.ssid = "lab-net".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.station.ssid, "lab-net");
        assert_eq!(loaded.access_point.channel, 6);
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");

        let mut config = EngineConfig::default();
        config.association.max_attempts = 5;
        config.save_to_file(&path).unwrap();

        let loaded = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.association.max_attempts, 5);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let err = EngineConfig::load_from_file("engine.yaml").unwrap_err();
        assert!(matches!(err, AirframeError::Config(_) | AirframeError::Io(_)));
    }
}
