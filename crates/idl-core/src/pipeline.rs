//! Download pipeline: validate → probe → budget → fetch, one URL at a time.
//!
//! All run state (disk budget, download counter, outcome tallies) lives in
//! [`RunState`], owned by the [`Pipeline`] driving the run.

use crate::budget::DiskBudget;
use crate::config::{
    ExistingFilePolicy, HttpOptions, IdlConfig, ProbeFailurePolicy, UnknownSizePolicy,
};
use crate::fetch::{self, FetchError};
use crate::fetch_head::{self, ProbeError};
use crate::input::{InputError, UrlLine, UrlList};
use crate::size::SizeEstimate;
use crate::storage;
use crate::url_model;
use crate::validate;
use std::io;
use std::path::{Path, PathBuf};

/// Fatal errors that end a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("failed to query free space of {}", .dir.display())]
    FreeSpace {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("probe failed for {url}")]
    Probe {
        url: String,
        #[source]
        source: ProbeError,
    },
}

/// What happened to a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Downloaded { path: PathBuf, bytes: u64 },
    /// Failed the syntactic check.
    Invalid,
    /// The server answered with a 4xx/5xx status.
    Unreachable { status: u32 },
    /// Transport failure during the probe, skipped by policy.
    ProbeFailed,
    /// Target file exists and the policy says not to touch it.
    SkippedExisting { path: PathBuf },
    /// No `Content-Length` and the policy refuses unknown sizes.
    UnknownSize,
    NoSpace,
    FetchFailed,
}

/// Per-run tallies; `downloaded` doubles as the download counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub downloaded: u64,
    /// Invalid, unreachable, or failed probe.
    pub invalid: u64,
    pub no_space: u64,
    pub failed: u64,
    /// Existing file kept, or unknown size refused.
    pub skipped: u64,
}

/// Mutable state threaded through a run.
#[derive(Debug, Clone)]
pub struct RunState {
    pub budget: DiskBudget,
    pub summary: RunSummary,
}

impl RunState {
    pub fn new(free_bytes: u64) -> Self {
        Self {
            budget: DiskBudget::new(free_bytes),
            summary: RunSummary::default(),
        }
    }

    /// Number of successful downloads so far.
    pub fn downloaded(&self) -> u64 {
        self.summary.downloaded
    }
}

/// Sequential download driver for one directory.
pub struct Pipeline {
    cfg: IdlConfig,
    http: HttpOptions,
    download_dir: PathBuf,
    state: RunState,
}

impl Pipeline {
    /// Create a pipeline whose budget starts at the current free space of `download_dir`.
    pub fn new(cfg: IdlConfig, download_dir: &Path) -> Result<Self, RunError> {
        let free = storage::free_space(download_dir).map_err(|source| RunError::FreeSpace {
            dir: download_dir.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            dir = %download_dir.display(),
            free_bytes = free,
            "disk budget initialized"
        );
        Ok(Self::with_free_space(cfg, download_dir, free))
    }

    /// Create a pipeline with an explicit starting budget.
    pub fn with_free_space(cfg: IdlConfig, download_dir: &Path, free_bytes: u64) -> Self {
        let http = cfg.http_options();
        Self {
            cfg,
            http,
            download_dir: download_dir.to_path_buf(),
            state: RunState::new(free_bytes),
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Process every line, then report the total.
    ///
    /// Per-URL failures are logged and counted; only input errors and probe
    /// failures under [`ProbeFailurePolicy::Abort`] end the run early.
    pub fn run<I>(&mut self, lines: I) -> Result<RunSummary, RunError>
    where
        I: IntoIterator<Item = Result<UrlLine, InputError>>,
    {
        for item in lines {
            let line = item?;
            tracing::debug!(line = line.line, url = %line.url, "processing url");
            self.process_url(&line.url)?;
        }
        let summary = self.state.summary.clone();
        tracing::info!(
            "Downloaded {} files to {}",
            summary.downloaded,
            self.download_dir.display()
        );
        Ok(summary)
    }

    /// Run the whole pipeline for one URL.
    pub fn process_url(&mut self, url: &str) -> Result<Outcome, RunError> {
        let url = url.trim();
        let summary = &mut self.state.summary;

        if !validate::is_valid_syntax(url, self.cfg.allowed_schemes.as_slice()) {
            tracing::warn!("URL {} is invalid or inaccessible, skipping", url);
            summary.invalid += 1;
            return Ok(Outcome::Invalid);
        }

        let head = match fetch_head::probe(url, &self.http) {
            Ok(head) => head,
            Err(source) => match self.cfg.on_probe_error {
                ProbeFailurePolicy::Skip => {
                    tracing::warn!(
                        error = %source,
                        "URL {} is invalid or inaccessible, skipping",
                        url
                    );
                    summary.invalid += 1;
                    return Ok(Outcome::ProbeFailed);
                }
                ProbeFailurePolicy::Abort => {
                    return Err(RunError::Probe {
                        url: url.to_string(),
                        source,
                    })
                }
            },
        };
        if !validate::is_reachable(&head) {
            tracing::warn!(
                status = head.status,
                "URL {} is invalid or inaccessible, skipping",
                url
            );
            summary.invalid += 1;
            return Ok(Outcome::Unreachable {
                status: head.status,
            });
        }

        let dest = match self.destination(url) {
            Ok(dest) => dest,
            Err(existing) => {
                tracing::warn!("{} already exists, not downloading {}", existing.display(), url);
                self.state.summary.skipped += 1;
                return Ok(Outcome::SkippedExisting { path: existing });
            }
        };

        let charge = match SizeEstimate::from_head(&head) {
            SizeEstimate::Known(n) => n,
            SizeEstimate::Unknown => match self.cfg.unknown_size {
                UnknownSizePolicy::Reserve => {
                    tracing::debug!(
                        url = %url,
                        placeholder = self.cfg.unknown_size_reserve_bytes,
                        "no Content-Length, reserving placeholder"
                    );
                    self.cfg.unknown_size_reserve_bytes
                }
                UnknownSizePolicy::Skip => {
                    tracing::warn!("size of {} is unknown, skipping", url);
                    self.state.summary.skipped += 1;
                    return Ok(Outcome::UnknownSize);
                }
            },
        };

        let Some(reservation) = self.state.budget.try_reserve(charge) else {
            tracing::error!(
                needed = charge,
                remaining = self.state.budget.remaining(),
                "Not enough space on the disk."
            );
            tracing::error!("Couldn't download {}", url);
            self.state.summary.no_space += 1;
            return Ok(Outcome::NoSpace);
        };

        match fetch::fetch(url, &dest, Some(reservation.max_bytes()), &self.http) {
            Ok(bytes) => {
                self.state.budget.settle(reservation, bytes);
                self.state.summary.downloaded += 1;
                tracing::info!(bytes, "downloaded {} to {}", url, dest.display());
                Ok(Outcome::Downloaded { path: dest, bytes })
            }
            Err(FetchError::TooLarge { limit }) => {
                self.state.budget.release(reservation);
                tracing::error!(limit, "Not enough space on the disk.");
                tracing::error!("Couldn't download {}", url);
                self.state.summary.no_space += 1;
                Ok(Outcome::NoSpace)
            }
            Err(e) => {
                self.state.budget.release(reservation);
                tracing::warn!(error = %e, "Download failed for the url {}", url);
                self.state.summary.failed += 1;
                Ok(Outcome::FetchFailed)
            }
        }
    }

    /// Target path for `url`, applying the existing-file policy.
    /// `Err(path)` means the file exists and must be left alone.
    fn destination(&self, url: &str) -> Result<PathBuf, PathBuf> {
        let name = url_model::derive_filename(url, self.state.downloaded());
        let path = self.download_dir.join(&name);
        if !path.exists() {
            return Ok(path);
        }
        match self.cfg.on_existing {
            ExistingFilePolicy::Overwrite => {
                tracing::debug!(path = %path.display(), "overwriting existing file");
                Ok(path)
            }
            ExistingFilePolicy::Skip => Err(path),
            ExistingFilePolicy::Rename => {
                let renamed = url_model::unique_filename(&self.download_dir, &name);
                tracing::info!("{} exists, saving as {}", name, renamed);
                Ok(self.download_dir.join(renamed))
            }
        }
    }
}

/// Open `list_path` and download every URL in it into `download_dir`.
pub fn run_list(
    cfg: IdlConfig,
    list_path: &Path,
    download_dir: &Path,
) -> Result<RunSummary, RunError> {
    let list = UrlList::open(list_path)?;
    let mut pipeline = Pipeline::new(cfg, download_dir)?;
    pipeline.run(list)
}
