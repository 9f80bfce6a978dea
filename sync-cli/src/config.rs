//! Configuration for scratch-sync.
//!
//! Loaded from a TOML file (default: `<config dir>/scratch-sync/config.toml`).
//! Every section and field is optional.

use scratch_sync_client::daemon::DEFAULT_API_URL;
use scratch_sync_client::{Prerequisites, DEFAULT_CONCURRENCY, DEFAULT_PROBE_TIMEOUT_SECS};
use scratch_sync_listener::ListenerConfig;
use scratch_sync_types::{GUI_PORT, MANAGED_FOLDER_PREFIX};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the daemon's API key.
pub const API_KEY_ENV: &str = "SCRATCH_SYNC_API_KEY";

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Peer probing.
    #[serde(default)]
    pub probe: ProbeConfig,
    /// Local sync daemon.
    #[serde(default)]
    pub daemon: DaemonSection,
    /// Overlay client.
    #[serde(default)]
    pub overlay: OverlayConfig,
    /// Discovery listener.
    #[serde(default)]
    pub listener: ListenerConfig,
    /// Managed folders.
    #[serde(default)]
    pub folders: FoldersConfig,
}

/// Peer probing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Per-probe timeout in seconds (default: 3).
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: f64,
    /// Daemon GUI port on peers (default: 8384).
    #[serde(default = "default_probe_port")]
    pub port: u16,
    /// Probes in flight (default: 8).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

/// Local daemon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonSection {
    /// Daemon binary (default: search `PATH` and common locations).
    pub binary: Option<PathBuf>,
    /// REST API base URL (default: http://localhost:8384).
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// REST API key (default: `SCRATCH_SYNC_API_KEY`, then ask the daemon).
    pub api_key: Option<String>,
    /// Bound on each daemon or overlay command in seconds (default: 30).
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

/// Overlay client configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverlayConfig {
    /// Overlay client binary (default: search).
    pub binary: Option<PathBuf>,
}

/// Managed folder configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FoldersConfig {
    /// Folder id prefix (default: `scratch-`).
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_probe_timeout() -> f64 {
    DEFAULT_PROBE_TIMEOUT_SECS as f64
}

fn default_probe_port() -> u16 {
    GUI_PORT
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_command_timeout() -> u64 {
    30
}

fn default_prefix() -> String {
    MANAGED_FOLDER_PREFIX.to_string()
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_probe_timeout(),
            port: default_probe_port(),
            concurrency: default_concurrency(),
        }
    }
}

impl Default for DaemonSection {
    fn default() -> Self {
        Self {
            binary: None,
            api_url: default_api_url(),
            api_key: None,
            command_timeout_secs: default_command_timeout(),
        }
    }
}

impl Default for FoldersConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load `explicit`, or the default file if it exists, or defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Timeout for external commands.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.daemon.command_timeout_secs)
    }

    /// Binary locations for prerequisite checks.
    pub fn prerequisites(&self) -> Prerequisites {
        Prerequisites {
            syncthing: self.daemon.binary.clone(),
            tailscale: self.overlay.binary.clone(),
            command_timeout: self.command_timeout(),
        }
    }
}

/// Default config file location.
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "scratch-sync")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.probe.timeout_secs, 3.0);
        assert_eq!(config.probe.port, 8384);
        assert_eq!(config.probe.concurrency, 8);
        assert_eq!(config.daemon.api_url, "http://localhost:8384");
        assert_eq!(config.daemon.command_timeout_secs, 30);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8385");
        assert!(config.listener.enabled_during_pair);
        assert_eq!(config.folders.prefix, "scratch-");
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
[probe]
timeout_secs = 1.5
concurrency = 2

[daemon]
binary = "/opt/syncthing/syncthing"
api_key = "secret"

[overlay]
binary = "/usr/bin/tailscale"

[listener]
enabled_during_pair = false

[folders]
prefix = "tmp-"
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.probe.timeout_secs, 1.5);
        assert_eq!(config.probe.concurrency, 2);
        assert_eq!(config.probe.port, 8384);
        assert_eq!(
            config.daemon.binary,
            Some(PathBuf::from("/opt/syncthing/syncthing"))
        );
        assert_eq!(config.daemon.api_key.as_deref(), Some("secret"));
        assert_eq!(config.overlay.binary, Some(PathBuf::from("/usr/bin/tailscale")));
        assert!(!config.listener.enabled_during_pair);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8385");
        assert_eq!(config.folders.prefix, "tmp-");
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.probe.concurrency, 8);
        assert!(config.daemon.binary.is_none());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[probe\n").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn prerequisites_follow_config() {
        let mut config = Config::default();
        config.daemon.binary = Some(PathBuf::from("/x/syncthing"));
        config.daemon.command_timeout_secs = 5;
        let prereqs = config.prerequisites();
        assert_eq!(prereqs.syncthing, Some(PathBuf::from("/x/syncthing")));
        assert_eq!(prereqs.command_timeout, Duration::from_secs(5));
    }
}
