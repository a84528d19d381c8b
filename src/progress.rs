//! Progress commentary on a side channel.
//!
//! Progress is reported through the [`ProgressReporter`] trait so the
//! pipeline does not care where notices end up. [`CommentProgress`] writes
//! them as comment lines (each prefixed with a marker, `#` by default) to any
//! writer, normally stderr, keeping them apart from the report stream.
//! [`NoProgress`] discards everything.
//!
//! The text of these notices is for humans and is not a stable format.

use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::scanner::FileRef;

/// Default prefix for progress lines.
pub const DEFAULT_COMMENT_MARKER: &str = "#";

/// Progress callback for the scan pipeline.
///
/// Implement this trait to receive notices while roots are walked and
/// hashed.
pub trait ProgressReporter: Send + Sync {
    /// Called before a root argument is expanded.
    fn on_root_start(&self, root: &Path);

    /// Called for every directory the walker visits, before its children
    /// are queued.
    fn on_directory(&self, dir: &Path);

    /// Called once a root has been fully expanded.
    ///
    /// # Arguments
    ///
    /// * `root` - The root argument
    /// * `count` - Number of regular files found beneath it
    fn on_files_found(&self, root: &Path, count: usize);

    /// Called before the files of a root are hashed.
    fn on_hashing_start(&self, root: &Path, total: usize);

    /// Called after each file has been hashed.
    ///
    /// # Arguments
    ///
    /// * `current` - Position of the file within its root (1-based)
    /// * `file` - The file just hashed
    fn on_file_hashed(&self, _current: usize, _file: &FileRef) {}
}

/// Reporter that drops every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn on_root_start(&self, _root: &Path) {}
    fn on_directory(&self, _dir: &Path) {}
    fn on_files_found(&self, _root: &Path, _count: usize) {}
    fn on_hashing_start(&self, _root: &Path, _total: usize) {}
}

/// Reporter that writes marker-prefixed comment lines.
///
/// # Examples
///
/// ```
/// use dupgroups::progress::{CommentProgress, ProgressReporter};
/// use std::path::Path;
///
/// let progress = CommentProgress::new(Vec::new());
/// progress.on_root_start(Path::new("photos"));
/// let text = String::from_utf8(progress.into_inner()).unwrap();
/// assert_eq!(text, "#Reading arg: photos\n");
/// ```
pub struct CommentProgress<W: Write + Send> {
    out: Mutex<W>,
    marker: String,
}

impl<W: Write + Send> CommentProgress<W> {
    /// Create a reporter using the default `#` marker.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self::with_marker(out, DEFAULT_COMMENT_MARKER)
    }

    /// Create a reporter with a custom line prefix.
    #[must_use]
    pub fn with_marker(out: W, marker: impl Into<String>) -> Self {
        Self {
            out: Mutex::new(out),
            marker: marker.into(),
        }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn comment(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        // A closed progress channel must not fail the scan.
        if let Err(e) = writeln!(out, "{}{}", self.marker, text).and_then(|()| out.flush()) {
            log::debug!("Failed to write progress line: {}", e);
        }
    }
}

impl<W: Write + Send> ProgressReporter for CommentProgress<W> {
    fn on_root_start(&self, root: &Path) {
        self.comment(&format!("Reading arg: {}", root.display()));
    }

    fn on_directory(&self, dir: &Path) {
        self.comment(&format!("- Found directory: {}", dir.display()));
    }

    fn on_files_found(&self, _root: &Path, count: usize) {
        self.comment(&format!("- Files found for arg: {}", count));
    }

    fn on_hashing_start(&self, _root: &Path, _total: usize) {
        self.comment("- Calculating hashes.");
    }
}
