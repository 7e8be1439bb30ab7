//! Sequential temp-file writer with a byte cap.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Why a chunk was refused.
#[derive(Debug)]
pub enum WriteFailure {
    /// Writing the chunk would exceed the cap.
    LimitExceeded { limit: u64 },
    Io(io::Error),
}

/// Writes a download body to its temp file, refusing to grow past `max_bytes`.
pub struct CappedWriter {
    out: BufWriter<File>,
    temp_path: PathBuf,
    written: u64,
    max_bytes: Option<u64>,
}

impl CappedWriter {
    /// Create (or truncate) the temp file at `temp_path`.
    pub fn create(temp_path: &Path, max_bytes: Option<u64>) -> io::Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)?;
        Ok(Self {
            out: BufWriter::new(file),
            temp_path: temp_path.to_path_buf(),
            written: 0,
            max_bytes,
        })
    }

    /// Append a chunk. Nothing is written if the chunk would cross the cap.
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<(), WriteFailure> {
        let next = self.written + data.len() as u64;
        if let Some(limit) = self.max_bytes {
            if next > limit {
                return Err(WriteFailure::LimitExceeded { limit });
            }
        }
        self.out.write_all(data).map_err(WriteFailure::Io)?;
        self.written = next;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush, close and rename the temp file onto `final_path`, replacing any
    /// existing file. Returns the number of bytes written.
    ///
    /// On failure the temp file is removed.
    pub fn finalize(self, final_path: &Path) -> io::Result<u64> {
        let written = self.written;
        let temp_path = self.temp_path;
        let result = self
            .out
            .into_inner()
            .map_err(|e| e.into_error())
            .and_then(|file| file.sync_all())
            .and_then(|()| std::fs::rename(&temp_path, final_path));
        if let Err(e) = result {
            remove_temp(&temp_path);
            return Err(e);
        }
        Ok(written)
    }

    /// Close and delete the temp file.
    pub fn discard(self) {
        drop(self.out);
        remove_temp(&self.temp_path);
    }
}

fn remove_temp(temp_path: &Path) {
    if let Err(e) = std::fs::remove_file(temp_path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!("could not remove {}: {}", temp_path.display(), e);
        }
    }
}
