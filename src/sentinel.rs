//! Marker files for directories created by dirsort.
//!
//! Every destination directory gets an empty `.marking_file` at its root. On
//! later runs any directory holding that file is left alone instead of being
//! sorted into itself.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;

/// Reserved name of the zero-byte marker file.
pub const MARKER_FILE_NAME: &str = ".marking_file";

/// Returns true if `path` is a directory containing the marker file.
pub fn is_system_managed(path: &Path) -> bool {
    path.is_dir() && path.join(MARKER_FILE_NAME).exists()
}

/// Creates the marker file inside `dir`.
///
/// Calling this on an already marked directory truncates the existing marker
/// back to zero bytes and succeeds.
pub fn mark(dir: &Path) -> io::Result<()> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dir.join(MARKER_FILE_NAME))
        .map(|_| ())
}
