//! Filename extraction from URL path.

/// Returns the last segment of the URL path, trimmed of whitespace.
///
/// Query and fragment are not part of the path. A trailing slash yields an
/// empty segment, so `https://example.com/dir/` gives `None`.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.last()?.trim();
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal() {
        assert_eq!(
            filename_from_url_path("https://example.com/a/b/photo.jpg").as_deref(),
            Some("photo.jpg")
        );
        assert_eq!(
            filename_from_url_path("https://example.com/single").as_deref(),
            Some("single")
        );
    }

    #[test]
    fn trailing_slash_or_root() {
        assert_eq!(filename_from_url_path("https://example.com/gallery/"), None);
        assert_eq!(filename_from_url_path("https://example.com/"), None);
    }

    #[test]
    fn with_query_and_fragment() {
        assert_eq!(
            filename_from_url_path("https://example.com/cat.png?size=large#top").as_deref(),
            Some("cat.png")
        );
    }

    #[test]
    fn unparseable() {
        assert_eq!(filename_from_url_path("not a url"), None);
    }
}
