//! Parse HTTP response header lines into HeadResult.

use super::HeadResult;

/// Parse collected header lines into HeadResult.
///
/// libcurl reports the headers of every response in a redirect chain; a status
/// line starts a new response, so only the last response's headers count.
pub(crate) fn parse_headers(status: u32, lines: &[String]) -> HeadResult {
    let mut content_length = None;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            content_length = None;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse::<u64>().ok();
            }
        }
    }

    HeadResult {
        status,
        content_length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_headers_content_length() {
        let r = parse_headers(
            200,
            &lines(&["HTTP/1.1 200 OK", "Content-Type: image/jpeg", "Content-Length: 12345"]),
        );
        assert_eq!(r.status, 200);
        assert_eq!(r.content_length, Some(12345));
        assert!(!r.is_error_status());
    }

    #[test]
    fn parse_headers_case_insensitive() {
        let r = parse_headers(200, &lines(&["content-length:  77 "]));
        assert_eq!(r.content_length, Some(77));
    }

    #[test]
    fn parse_headers_missing_length() {
        let r = parse_headers(200, &lines(&["HTTP/1.1 200 OK", "Transfer-Encoding: chunked"]));
        assert_eq!(r.content_length, None);
    }

    #[test]
    fn parse_headers_garbage_length_ignored() {
        let r = parse_headers(200, &lines(&["Content-Length: lots"]));
        assert_eq!(r.content_length, None);
    }

    #[test]
    fn parse_headers_redirect_chain_uses_last_response() {
        let r = parse_headers(
            200,
            &lines(&[
                "HTTP/1.1 301 Moved Permanently",
                "Location: /real.png",
                "Content-Length: 162",
                "",
                "HTTP/1.1 200 OK",
                "Content-Type: image/png",
            ]),
        );
        assert_eq!(r.content_length, None);
    }

    #[test]
    fn error_status() {
        assert!(parse_headers(404, &[]).is_error_status());
        assert!(parse_headers(503, &[]).is_error_status());
        assert!(!parse_headers(302, &[]).is_error_status());
    }
}
