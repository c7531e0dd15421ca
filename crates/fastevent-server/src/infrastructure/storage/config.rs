//! Service configuration loading.
//!
//! The configuration file selects the listening port, the transport
//! discipline and the output driver:
//!
//! ```toml
//! port = 11666
//! driver = "leonardo"
//! transport = "tcp"          # or "udp"
//!
//! [options]
//! port = "/dev/ttyACM0"
//! ```
//!
//! # Two file formats (for beginners)
//!
//! New deployments use TOML (`service.toml`).  Older deployments keep a JSON
//! file named `service.cfg`:
//!
//! ```json
//! { "port": 11666, "driver": "uno", "options": { "port": "COM3" } }
//! ```
//!
//! Both are parsed into the same [`ServiceConfig`] through `serde`; only the
//! front-end parser (`toml` or `serde_json`) differs.  The file extension
//! picks the parser.
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` take the value of
//! `some_fn()` when the key is absent.  `port`, `driver` and `options` have
//! no default: a file missing any of them is rejected.

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use fastevent_core::driver::DriverOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::network::TransportKind;

/// File name used when no path is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "service.toml";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed or is missing required keys.
    #[error("failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// The JSON content could not be parsed or is missing required keys.
    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension maps to no known format.
    #[error("unsupported config format for {0} (expected .toml, .json or .cfg)")]
    UnsupportedFormat(PathBuf),
}

// ── Config schema ─────────────────────────────────────────────────────────────

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// Port to listen on, for either transport.
    pub port: u16,
    /// Identifier of the output driver to resolve in the registry.
    pub driver: String,
    #[serde(default)]
    pub transport: TransportKind,
    /// Address to bind.  `0.0.0.0` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,
    /// Log the driver registry and every accept/close.
    #[serde(default = "default_true")]
    pub verbose: bool,
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Options table passed verbatim to the driver factory.
    ///
    /// Kept last so the TOML serializer emits it after the plain keys.
    pub options: DriverOptions,
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

impl ServiceConfig {
    /// Builds a configuration with every optional field at its default.
    pub fn new(port: u16, driver: impl Into<String>, options: DriverOptions) -> Self {
        Self {
            port,
            driver: driver.into(),
            transport: TransportKind::default(),
            bind_address: default_bind_address(),
            verbose: default_true(),
            log_level: default_log_level(),
            options,
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "json" | "cfg" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parses `content` in the given format.
///
/// # Errors
///
/// Returns [`ConfigError::Toml`] or [`ConfigError::Json`] for malformed
/// content or missing required keys.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<ServiceConfig, ConfigError> {
    match format {
        ConfigFormat::Toml => Ok(toml::from_str(content)?),
        ConfigFormat::Json => Ok(serde_json::from_str(content)?),
    }
}

/// Reads and parses the configuration file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::UnsupportedFormat`] for an unknown extension,
/// [`ConfigError::Io`] if the file cannot be read, and a parse error
/// otherwise.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let format =
        ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.into()))?;
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, format)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
