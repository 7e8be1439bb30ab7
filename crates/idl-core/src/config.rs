use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What to do with a download whose size the server does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownSizePolicy {
    /// Charge `unknown_size_reserve_bytes` up front and reconcile after the transfer.
    #[default]
    Reserve,
    /// Do not download files of unknown size.
    Skip,
}

/// What to do when the derived filename already exists in the download directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingFilePolicy {
    #[default]
    Overwrite,
    Skip,
    /// Pick `stem-1.ext`, `stem-2.ext`, ... until a free name is found.
    Rename,
}

/// What to do when the metadata probe fails at the transport level (DNS, refused, timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeFailurePolicy {
    /// Log a warning and move on to the next URL.
    #[default]
    Skip,
    /// Stop the whole run.
    Abort,
}

/// Global configuration loaded from `~/.config/idl/config.toml`.
///
/// Every field may be omitted from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdlConfig {
    /// URL schemes accepted by the validator.
    pub allowed_schemes: Vec<String>,
    pub connect_timeout_secs: u64,
    /// Whole-request timeout for the HEAD / header-only probe.
    pub probe_timeout_secs: u64,
    /// Whole-request timeout for a download (None = no limit besides the low-speed abort).
    pub transfer_timeout_secs: Option<u64>,
    pub max_redirections: u32,
    pub user_agent: String,
    pub unknown_size: UnknownSizePolicy,
    /// Placeholder charged against the disk budget when `Content-Length` is missing.
    pub unknown_size_reserve_bytes: u64,
    pub on_existing: ExistingFilePolicy,
    pub on_probe_error: ProbeFailurePolicy,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Append logs to this file instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for IdlConfig {
    fn default() -> Self {
        Self {
            allowed_schemes: vec!["https".to_string(), "http".to_string()],
            connect_timeout_secs: 15,
            probe_timeout_secs: 30,
            transfer_timeout_secs: Some(600),
            max_redirections: 10,
            user_agent: concat!("idl/", env!("CARGO_PKG_VERSION")).to_string(),
            unknown_size: UnknownSizePolicy::Reserve,
            unknown_size_reserve_bytes: 16 * 1024 * 1024,
            on_existing: ExistingFilePolicy::Overwrite,
            on_probe_error: ProbeFailurePolicy::Skip,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

/// Curl settings shared by the probe and the fetcher.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    pub probe_timeout: Duration,
    pub transfer_timeout: Option<Duration>,
    pub max_redirections: u32,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        IdlConfig::default().http_options()
    }
}

impl IdlConfig {
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            probe_timeout: Duration::from_secs(self.probe_timeout_secs),
            transfer_timeout: self.transfer_timeout_secs.map(Duration::from_secs),
            max_redirections: self.max_redirections,
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Location of the user config file, if one exists.
pub fn config_path() -> Result<Option<PathBuf>> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("idl")?;
    Ok(xdg_dirs.find_config_file("config.toml"))
}

/// Load configuration from `path`.
pub fn load_from_path(path: &Path) -> Result<IdlConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: IdlConfig = toml::from_str(&data)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(cfg)
}

/// Load the explicit config file, else the XDG one, else built-in defaults.
/// Never creates a file.
pub fn load(explicit: Option<&Path>) -> Result<IdlConfig> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }
    match config_path() {
        Ok(Some(path)) => load_from_path(&path),
        Ok(None) => Ok(IdlConfig::default()),
        Err(e) => {
            tracing::debug!("no XDG config directory: {:#}", e);
            Ok(IdlConfig::default())
        }
    }
}
