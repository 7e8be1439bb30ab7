//! Single-stream HTTP GET into the download directory.
//!
//! The body goes to `<dest>.part` and is renamed onto `dest` only after a
//! complete, non-error response. Any failure removes the temp file.

use crate::config::HttpOptions;
use crate::storage::{self, CappedWriter, WriteFailure};
use std::io;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("GET request failed: {0}")]
    Curl(#[from] curl::Error),
    #[error("server returned HTTP {0}")]
    Http(u32),
    #[error("body larger than the remaining disk budget ({limit} bytes)")]
    TooLarge { limit: u64 },
    #[error("storage: {0}")]
    Io(#[from] io::Error),
}

/// Downloads `url` to `dest`, overwriting it. Returns the number of bytes written.
///
/// With `max_bytes`, the transfer is aborted as soon as the body would grow
/// past that many bytes.
pub fn fetch(
    url: &str,
    dest: &Path,
    max_bytes: Option<u64>,
    http: &HttpOptions,
) -> Result<u64, FetchError> {
    let temp = storage::temp_path(dest);
    let mut writer = CappedWriter::create(&temp, max_bytes)?;
    match transfer(url, &mut writer, http) {
        Ok(()) => {
            let written = writer.finalize(dest)?;
            tracing::debug!(url = %url, path = %dest.display(), bytes = written, "fetched");
            Ok(written)
        }
        Err(e) => {
            writer.discard();
            Err(e)
        }
    }
}

fn transfer(url: &str, writer: &mut CappedWriter, http: &HttpOptions) -> Result<(), FetchError> {
    let mut refused: Option<WriteFailure> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.fail_on_error(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(http.max_redirections)?;
    easy.connect_timeout(http.connect_timeout)?;
    if let Some(t) = http.transfer_timeout {
        easy.timeout(t)?;
    }
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;
    easy.useragent(&http.user_agent)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match writer.write_chunk(data) {
            Ok(()) => Ok(data.len()),
            Err(failure) => {
                refused = Some(failure);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Err(e) = performed {
        return Err(match refused.take() {
            Some(WriteFailure::LimitExceeded { limit }) => FetchError::TooLarge { limit },
            Some(WriteFailure::Io(io)) => FetchError::Io(io),
            None if e.is_http_returned_error() => FetchError::Http(easy.response_code()?),
            None => FetchError::Curl(e),
        });
    }

    let code = easy.response_code()?;
    if code >= 400 {
        return Err(FetchError::Http(code));
    }
    Ok(())
}
