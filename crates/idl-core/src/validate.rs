//! URL validation.
//!
//! Split into a pure syntactic check and a reachability verdict on a probe
//! result, so callers decide whether and when to touch the network.

use crate::config::HttpOptions;
use crate::fetch_head::{self, HeadResult, ProbeError};

/// Anything shorter cannot be a usable image URL.
pub const MIN_URL_LEN: usize = 10;

/// Syntactic check only; never performs I/O.
///
/// Rejects empty or too-short input, schemes outside `allowed_schemes`, and
/// URLs without a host or without a path beyond the bare root.
pub fn is_valid_syntax<S: AsRef<str>>(url: &str, allowed_schemes: &[S]) -> bool {
    if url.is_empty() || url.chars().count() < MIN_URL_LEN {
        return false;
    }
    let parsed = match url::Url::parse(url) {
        Ok(u) => u,
        Err(_) => return false,
    };
    if !allowed_schemes
        .iter()
        .any(|s| s.as_ref().eq_ignore_ascii_case(parsed.scheme()))
    {
        return false;
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return false;
    }
    // `url` normalizes "https://host" to path "/", so a bare root slash counts
    // as no path at all, with or without the trailing slash.
    let path = parsed.path();
    !(path.is_empty() || path == "/")
}

/// Reachability verdict for a probe: any 4xx/5xx means the resource is gone.
pub fn is_reachable(head: &HeadResult) -> bool {
    !head.is_error_status()
}

/// Syntactic check followed by a live probe.
///
/// Returns `Ok(false)` for malformed URLs (no network call) and for HTTP error
/// responses. Transport failures are returned as `Err` so the caller can
/// choose between skipping and aborting.
pub fn is_valid<S: AsRef<str>>(
    url: &str,
    allowed_schemes: &[S],
    http: &HttpOptions,
) -> Result<bool, ProbeError> {
    if !is_valid_syntax(url, allowed_schemes) {
        return Ok(false);
    }
    let head = fetch_head::probe(url, http)?;
    Ok(is_reachable(&head))
}
