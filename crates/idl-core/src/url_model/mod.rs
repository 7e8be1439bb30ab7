//! URL modeling and filename derivation.
//!
//! Derives local filenames from the last URL path segment, sanitized for the
//! filesystem, with a counter-based fallback when the URL yields nothing usable.

mod path;
mod sanitize;

pub use path::filename_from_url_path;
pub use sanitize::sanitize_filename;

use std::path::Path;

/// Prefix of generated names, e.g. `image3`.
const FALLBACK_PREFIX: &str = "image";

/// Name used when the URL has no usable last path segment.
pub fn fallback_filename(counter: u64) -> String {
    format!("{}{}", FALLBACK_PREFIX, counter)
}

/// Derives the local filename for `url`.
///
/// Uses the last path segment; if that is empty (e.g. trailing slash) or
/// sanitizes to nothing, falls back to `image<counter>`. The same URL always
/// maps to the same name unless the fallback is taken.
///
/// # Examples
///
/// - `derive_filename("https://example.com/photo.jpg", 0)` → `"photo.jpg"`
/// - `derive_filename("https://example.com/gallery/", 4)` → `"image4"`
pub fn derive_filename(url: &str, counter: u64) -> String {
    let sanitized = filename_from_url_path(url)
        .map(|raw| sanitize_filename(&raw))
        .filter(|s| !s.is_empty());
    match sanitized {
        Some(name) => name,
        None => {
            tracing::warn!(url = %url, "couldn't extract the file name, using default");
            fallback_filename(counter)
        }
    }
}

/// Returns `name` if nothing by that name exists in `dir`, otherwise the first
/// free `stem-N.ext` (N = 1, 2, ...).
pub fn unique_filename(dir: &Path, name: &str) -> String {
    if !dir.join(name).exists() {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    let mut n: u64 = 1;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{}-{}.{}", stem, n, ext),
            None => format!("{}-{}", stem, n),
        };
        if !dir.join(&candidate).exists() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_filename_from_url_path() {
        assert_eq!(derive_filename("https://example.com/photo.jpg", 0), "photo.jpg");
        assert_eq!(
            derive_filename("https://cdn.example.com/a/b/cat.png?w=200", 7),
            "cat.png"
        );
    }

    #[test]
    fn derive_filename_is_deterministic() {
        let url = "https://example.com/img/sunset.webp";
        assert_eq!(derive_filename(url, 0), derive_filename(url, 9));
    }

    #[test]
    fn derive_filename_fallback_uses_counter() {
        assert_eq!(derive_filename("https://example.com/gallery/", 0), "image0");
        assert_eq!(derive_filename("https://example.com/gallery/", 3), "image3");
    }

    #[test]
    fn derive_filename_sanitizes_to_fallback() {
        assert_eq!(derive_filename("https://example.com/...", 2), "image2");
    }

    #[test]
    fn unique_filename_free_name_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(unique_filename(dir.path(), "photo.jpg"), "photo.jpg");
    }

    #[test]
    fn unique_filename_appends_counter() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("photo.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("photo-1.jpg"), b"x").unwrap();
        assert_eq!(unique_filename(dir.path(), "photo.jpg"), "photo-2.jpg");

        std::fs::write(dir.path().join("image0"), b"x").unwrap();
        assert_eq!(unique_filename(dir.path(), "image0"), "image0-1");
    }
}
