//! TOML-based configuration for the controller.
//!
//! Reads `AppConfig` from a TOML file, by default `coupler.toml` in the
//! working directory (a different path can be given as the first CLI
//! argument). The file is optional: a missing file yields the defaults,
//! which match the protocol constants in `coupler-core`.
//!
//! ```toml
//! [network]
//! port = 2224
//! bind_address = "0.0.0.0"
//!
//! [session]
//! run_config = "run.json"
//! protocol_version = 2
//!
//! [forcing]
//! co2 = 288.0
//! landuse = 0.001
//! ```
//!
//! # Serde default values (for beginners)
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return
//! value of `some_fn()` when the field is absent from the TOML file.
//! This allows the controller to run correctly on first start (before a
//! config file exists) and with partial files that only override one or
//! two settings. The `[forcing]` section is a free-form table mapping
//! channel names from the input table to constant values.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use coupler_core::{DEFAULT_PORT, PROTOCOL_VERSION};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// Constant forcing values by channel name, e.g. `co2 = 288.0`.
    #[serde(default)]
    pub forcing: BTreeMap<String, f32>,
}

/// Listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// TCP port the controller listens on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// IP address to bind to. `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

/// Session-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Path to the JSON run configuration emitted by the external tool.
    /// Absent means: offer every known channel, no cell cross-check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_config: Option<PathBuf>,
    /// Protocol version to require from the model. The default is the
    /// compiled-in constant; overriding it is for lab testing only.
    #[serde(default = "default_protocol_version")]
    pub protocol_version: i32,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_protocol_version() -> i32 {
    PROTOCOL_VERSION
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            session: SessionConfig::default(),
            forcing: BTreeMap::new(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            run_config: None,
            protocol_version: default_protocol_version(),
        }
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

/// Default config file location: `coupler.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("coupler.toml")
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if
/// the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not
/// found", and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_default_config_matches_protocol_constants() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.network.port, 2224);
        assert_eq!(cfg.network.bind_address, "0.0.0.0");
        assert_eq!(cfg.session.protocol_version, PROTOCOL_VERSION);
        assert_eq!(cfg.session.run_config, None);
        assert!(cfg.forcing.is_empty());
    }

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");

        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_deserialize_partial_network_overrides_defaults() {
        let toml_str = r#"
[network]
port = 9999
"#;

        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        assert_eq!(cfg.network.port, 9999);
        // Unspecified fields keep their defaults
        assert_eq!(cfg.network.bind_address, "0.0.0.0");
        assert_eq!(cfg.session.protocol_version, PROTOCOL_VERSION);
    }

    #[test]
    fn test_deserialize_forcing_table() {
        let toml_str = r#"
[forcing]
co2 = 400.0
landuse = 0.002
"#;

        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize forcing");

        assert_eq!(cfg.forcing.get("co2"), Some(&400.0));
        assert_eq!(cfg.forcing.get("landuse"), Some(&0.002));
    }

    #[test]
    fn test_deserialize_session_section() {
        let toml_str = r#"
[session]
run_config = "run.json"
protocol_version = 3
"#;

        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize session");

        assert_eq!(cfg.session.run_config, Some(PathBuf::from("run.json")));
        assert_eq!(cfg.session.protocol_version, 3);
    }

    #[test]
    fn test_deserialize_invalid_toml_returns_parse_error() {
        let bad_toml = "[[[ not valid toml";

        let result: Result<AppConfig, toml::de::Error> = toml::from_str(bad_toml);

        assert!(result.is_err());
    }

    #[test]
    fn test_config_serializes_and_deserializes_round_trip() {
        let mut cfg = AppConfig::default();
        cfg.network.port = 9000;
        cfg.forcing.insert("co2".to_string(), 350.0);

        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        assert_eq!(cfg, restored);
        // None run_config must be omitted from the output entirely.
        assert!(!toml_str.contains("run_config"));
    }

    // ── load_config from disk ────────────────────────────────────────────────

    #[test]
    fn test_load_config_returns_default_when_file_absent() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/coupler.toml");

        let cfg = load_config(&path).expect("absent file must yield defaults");

        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_load_config_reads_file_from_disk() {
        let dir = std::env::temp_dir().join(format!("coupler_cfg_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("coupler.toml");
        std::fs::write(&path, "[network]\nport = 12345\n").expect("write temp config");

        let cfg = load_config(&path).expect("load must succeed");

        assert_eq!(cfg.network.port, 12345);

        std::fs::remove_dir_all(&dir).ok();
    }
}
