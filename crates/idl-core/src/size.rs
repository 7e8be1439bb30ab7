//! Remote size estimation from `Content-Length`.

use crate::config::HttpOptions;
use crate::fetch_head::{self, HeadResult, ProbeError};

/// What the server told us about the payload size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeEstimate {
    Known(u64),
    /// No `Content-Length`; the real size is only known after the transfer.
    Unknown,
}

impl SizeEstimate {
    pub fn from_head(head: &HeadResult) -> Self {
        match head.content_length {
            Some(n) => SizeEstimate::Known(n),
            None => SizeEstimate::Unknown,
        }
    }

    /// Bytes, with `Unknown` reported as 0.
    pub fn bytes_or_zero(self) -> u64 {
        match self {
            SizeEstimate::Known(n) => n,
            SizeEstimate::Unknown => 0,
        }
    }
}

/// Queries the remote size of `url`; 0 when the server declares none.
///
/// An HTTP error status is an error here, unlike in validation, since there is
/// nothing meaningful to size.
pub fn get_size(url: &str, http: &HttpOptions) -> Result<u64, ProbeError> {
    let head = fetch_head::probe(url, http)?;
    if head.is_error_status() {
        return Err(ProbeError::Http(head.status));
    }
    Ok(SizeEstimate::from_head(&head).bytes_or_zero())
}
