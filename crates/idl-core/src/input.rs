//! URL list reader.
//!
//! Opens the list file after checking it is a readable regular file and yields
//! one trimmed, non-empty line at a time. Blank lines and lines that are not
//! valid UTF-8 are logged and skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("file not found or not accessible: {}", .path.display())]
    NotAccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("not a regular file: {}", .path.display())]
    NotAFile { path: PathBuf },
    #[error("failed to read {} at line {line}", .path.display())]
    Read {
        path: PathBuf,
        line: usize,
        #[source]
        source: io::Error,
    },
}

/// One candidate URL from the list, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlLine {
    pub line: usize,
    pub url: String,
}

/// Lazily reads a URL list file.
pub struct UrlList {
    path: PathBuf,
    lines: io::Lines<BufReader<File>>,
    line_no: usize,
}

impl UrlList {
    /// Resolve and open `path`. Fails if it does not exist, is not a regular
    /// file, or cannot be opened for reading.
    pub fn open(path: &Path) -> Result<Self, InputError> {
        let resolved = path
            .canonicalize()
            .map_err(|source| InputError::NotAccessible {
                path: path.to_path_buf(),
                source,
            })?;
        if !resolved.is_file() {
            return Err(InputError::NotAFile { path: resolved });
        }
        let file = File::open(&resolved).map_err(|source| InputError::NotAccessible {
            path: resolved.clone(),
            source,
        })?;
        tracing::debug!(path = %resolved.display(), "opened url list");
        Ok(Self {
            path: resolved,
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }
}

impl Iterator for UrlList {
    type Item = Result<UrlLine, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = self.lines.next()?;
            self.line_no += 1;
            let line = match raw {
                Ok(line) => line,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    tracing::warn!(line = self.line_no, "line is not valid UTF-8, skipping");
                    continue;
                }
                Err(source) => {
                    return Some(Err(InputError::Read {
                        path: self.path.clone(),
                        line: self.line_no,
                        source,
                    }))
                }
            };
            let url = line.trim();
            if url.is_empty() {
                tracing::warn!(line = self.line_no, "blank line, skipping");
                continue;
            }
            return Some(Ok(UrlLine {
                line: self.line_no,
                url: url.to_string(),
            }));
        }
    }
}
