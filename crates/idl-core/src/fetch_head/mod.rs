//! HTTP metadata probing.
//!
//! Uses the curl crate (libcurl) to learn whether a URL answers with a
//! non-error status and whether it declares a `Content-Length`. A HEAD that
//! answers with an error status is retried as a GET that is cut off as soon
//! as the headers arrive: some servers answer HEAD with 405, or with 403/404
//! for signed GET-only URLs, and still serve GET.

mod parse;

use crate::config::HttpOptions;
use std::str;

pub(crate) use parse::parse_headers;

/// Status and size metadata of the final response (after redirects).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadResult {
    /// HTTP status code of the last response.
    pub status: u32,
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
}

impl HeadResult {
    /// True for 4xx and 5xx responses.
    pub fn is_error_status(&self) -> bool {
        self.status >= 400
    }
}

/// Transport failure or HTTP error while probing a URL.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("probe request failed: {0}")]
    Curl(#[from] curl::Error),
    #[error("server returned HTTP {0}")]
    Http(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Head,
    HeadersOnlyGet,
}

/// Performs a HEAD request (GET fallback on any 4xx/5xx) and returns the parsed metadata.
///
/// HTTP error statuses are returned in `HeadResult::status`, not as errors;
/// only transport failures (DNS, refused, timeout, TLS) are `Err`.
pub fn probe(url: &str, http: &HttpOptions) -> Result<HeadResult, ProbeError> {
    let head = request_headers(url, http, Method::Head)?;
    if head.is_error_status() {
        tracing::debug!(url = %url, status = head.status, "HEAD failed, probing with GET");
        return request_headers(url, http, Method::HeadersOnlyGet);
    }
    Ok(head)
}

fn request_headers(
    url: &str,
    http: &HttpOptions,
    method: Method,
) -> Result<HeadResult, ProbeError> {
    let mut lines: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    match method {
        Method::Head => easy.nobody(true)?,
        Method::HeadersOnlyGet => easy.get(true)?,
    }
    easy.follow_location(true)?;
    easy.max_redirections(http.max_redirections)?;
    easy.connect_timeout(http.connect_timeout)?;
    easy.timeout(http.probe_timeout)?;
    easy.useragent(&http.user_agent)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                lines.push(s.trim_end().to_string());
            }
            true
        })?;
        if method == Method::HeadersOnlyGet {
            // Refusing the first body chunk aborts the transfer.
            transfer.write_function(|_| Ok(0))?;
        }
        transfer.perform()
    };
    match performed {
        Ok(()) => {}
        Err(e) if method == Method::HeadersOnlyGet && e.is_write_error() => {}
        Err(e) => return Err(ProbeError::Curl(e)),
    }

    let status = easy.response_code()?;
    let head = parse_headers(status, &lines);
    tracing::debug!(
        url = %url,
        status = head.status,
        content_length = ?head.content_length,
        "probed"
    );
    Ok(head)
}
