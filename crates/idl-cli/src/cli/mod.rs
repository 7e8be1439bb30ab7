//! CLI for the IDL image list downloader.

mod run;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use idl_core::config::{self, ExistingFilePolicy, IdlConfig, ProbeFailurePolicy, UnknownSizePolicy};
use std::path::PathBuf;

pub use run::run_from_args;

/// Process exit codes.
pub const EXIT_OK: i32 = 0;
/// Missing argument, bad flag, or unusable config.
pub const EXIT_USAGE: i32 = 1;
/// URL list missing or unreadable.
pub const EXIT_INPUT: i32 = 2;
/// Run aborted (probe failure under `--on-probe-error abort`, free-space query failed).
pub const EXIT_RUN: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnExisting {
    Overwrite,
    Skip,
    Rename,
}

impl From<OnExisting> for ExistingFilePolicy {
    fn from(v: OnExisting) -> Self {
        match v {
            OnExisting::Overwrite => ExistingFilePolicy::Overwrite,
            OnExisting::Skip => ExistingFilePolicy::Skip,
            OnExisting::Rename => ExistingFilePolicy::Rename,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnknownSize {
    Reserve,
    Skip,
}

impl From<UnknownSize> for UnknownSizePolicy {
    fn from(v: UnknownSize) -> Self {
        match v {
            UnknownSize::Reserve => UnknownSizePolicy::Reserve,
            UnknownSize::Skip => UnknownSizePolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnProbeError {
    Skip,
    Abort,
}

impl From<OnProbeError> for ProbeFailurePolicy {
    fn from(v: OnProbeError) -> Self {
        match v {
            OnProbeError::Skip => ProbeFailurePolicy::Skip,
            OnProbeError::Abort => ProbeFailurePolicy::Abort,
        }
    }
}

/// Top-level CLI for the IDL image list downloader.
#[derive(Debug, Parser)]
#[command(name = "idl", version)]
#[command(
    about = "IDL: download every image listed in a text file into the current directory",
    long_about = None
)]
pub struct Cli {
    /// Text file with one image URL per line.
    pub url_list: Option<PathBuf>,

    /// Config file (default: ~/.config/idl/config.toml if it exists).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "idl_core=trace". RUST_LOG takes precedence.
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Accepted URL scheme; repeat to allow several (default: https, http).
    #[arg(long = "scheme", value_name = "SCHEME")]
    pub schemes: Vec<String>,

    /// Whole-request timeout in seconds for probes and downloads.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// What to do when the target file already exists.
    #[arg(long, value_enum)]
    pub on_existing: Option<OnExisting>,

    /// What to do when the server does not declare the image size.
    #[arg(long, value_enum)]
    pub unknown_size: Option<UnknownSize>,

    /// What to do when a URL cannot be probed (DNS failure, refused, timeout).
    #[arg(long, value_enum)]
    pub on_probe_error: Option<OnProbeError>,
}

impl Cli {
    /// Load the config file and apply command-line overrides.
    pub fn load_config(&self) -> Result<IdlConfig> {
        let mut cfg = config::load(self.config.as_deref())?;
        self.apply_overrides(&mut cfg);
        Ok(cfg)
    }

    pub fn apply_overrides(&self, cfg: &mut IdlConfig) {
        if let Some(level) = &self.log_level {
            cfg.log_level = level.clone();
        }
        if !self.schemes.is_empty() {
            cfg.allowed_schemes = self.schemes.iter().map(|s| s.to_ascii_lowercase()).collect();
        }
        if let Some(secs) = self.timeout {
            cfg.probe_timeout_secs = secs;
            cfg.transfer_timeout_secs = Some(secs);
        }
        if let Some(v) = self.on_existing {
            cfg.on_existing = v.into();
        }
        if let Some(v) = self.unknown_size {
            cfg.unknown_size = v.into();
        }
        if let Some(v) = self.on_probe_error {
            cfg.on_probe_error = v.into();
        }
    }
}
