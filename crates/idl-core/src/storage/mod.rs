//! Disk I/O and file lifecycle.
//!
//! Downloads stream into `<name>.part` next to the final file and are renamed
//! into place once complete; the free-space query for the disk budget lives
//! here too.

mod space;
mod writer;

pub use space::free_space;
pub use writer::{CappedWriter, WriteFailure};

use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path
/// (e.g. `photo.jpg` → `photo.jpg.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("photo.jpg"));
        assert_eq!(p.to_string_lossy(), "photo.jpg.part");
        let p2 = temp_path(Path::new("/tmp/image0"));
        assert_eq!(p2.to_string_lossy(), "/tmp/image0.part");
    }
}
