//! Breadth-first directory walker.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for expanding one root path
//! into the regular files beneath it. Traversal is breadth-first over an
//! explicit FIFO worklist, so memory grows with the width of the tree
//! rather than its depth and deep trees cannot overflow the stack.
//!
//! # Behavior
//!
//! - A root that is a regular file yields just that file.
//! - Directory children are queued in the order the OS lists them.
//! - Symlinks are classified by their target.
//! - Special files, broken symlinks and entries whose metadata cannot be
//!   read are skipped.
//! - A directory that cannot be listed contributes no children; the walk
//!   carries on with the rest of the queue.
//!
//! Filesystem access goes through [`EntrySource`] so listing failures can
//! be simulated.
//!
//! # Example
//!
//! ```no_run
//! use dupgroups::progress::NoProgress;
//! use dupgroups::scanner::Walker;
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"));
//! let (files, stats) = walker.walk(&NoProgress);
//! println!("{} files in {} directories", files.len(), stats.directories);
//! ```

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{FileRef, ScanError};
use crate::progress::ProgressReporter;

/// Classification of one filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Anything else (device, socket, fifo, ...)
    Other,
}

/// Filesystem access needed by the walker.
pub trait EntrySource {
    /// Classify `path`, following symlinks.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry's metadata cannot be read.
    fn classify(&self, path: &Path) -> io::Result<EntryKind>;

    /// List the immediate children of `dir`, in listing order.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be opened or any entry of
    /// the listing cannot be read.
    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
}

impl<S: EntrySource + ?Sized> EntrySource for &S {
    fn classify(&self, path: &Path) -> io::Result<EntryKind> {
        (**self).classify(path)
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        (**self).list(dir)
    }
}

/// [`EntrySource`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntrySource;

impl EntrySource for OsEntrySource {
    fn classify(&self, path: &Path) -> io::Result<EntryKind> {
        // One metadata call per entry: the kind can't change between checks.
        let metadata = fs::metadata(path)?;
        Ok(if metadata.is_file() {
            EntryKind::File
        } else if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        })
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }
}

/// Statistics from one walk.
#[derive(Debug, Default)]
pub struct WalkStats {
    /// Regular files found
    pub files: usize,
    /// Directories visited (including the root)
    pub directories: usize,
    /// Directories whose listing failed
    pub unreadable_directories: usize,
    /// Entries skipped because they are neither file nor directory
    pub special_entries: usize,
    /// Entries skipped because their metadata could not be read
    pub unclassifiable_entries: usize,
    /// Recovered errors, in the order they occurred
    pub errors: Vec<ScanError>,
}

/// Breadth-first walker over one root.
#[derive(Debug)]
pub struct Walker<S = OsEntrySource> {
    /// Root path to walk
    root: PathBuf,
    /// Filesystem access
    source: S,
}

impl Walker {
    /// Create a walker over the real filesystem.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupgroups::scanner::Walker;
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."));
    /// ```
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self::with_source(root, OsEntrySource)
    }
}

impl<S: EntrySource> Walker<S> {
    /// Create a walker with a custom [`EntrySource`].
    #[must_use]
    pub fn with_source(root: &Path, source: S) -> Self {
        Self {
            root: root.to_path_buf(),
            source,
        }
    }

    /// Root path of this walker.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Expand the root into its regular files.
    ///
    /// Every visited directory is announced through `progress` before its
    /// children are queued. Failures are recorded in the returned stats and
    /// never stop the walk.
    pub fn walk(&self, progress: &dyn ProgressReporter) -> (Vec<FileRef>, WalkStats) {
        let mut files = Vec::new();
        let mut stats = WalkStats::default();
        let mut queue = VecDeque::from([self.root.clone()]);

        while let Some(path) = queue.pop_front() {
            match self.source.classify(&path) {
                Ok(EntryKind::File) => files.push(FileRef::new(path)),
                Ok(EntryKind::Directory) => {
                    stats.directories += 1;
                    progress.on_directory(&path);
                    match self.source.list(&path) {
                        Ok(children) => queue.extend(children),
                        Err(source) => {
                            log::warn!("Cannot list directory {}: {}", path.display(), source);
                            stats.unreadable_directories += 1;
                            stats.errors.push(ScanError::ListingFailed { path, source });
                        }
                    }
                }
                Ok(EntryKind::Other) => {
                    log::debug!("Skipping special file {}", path.display());
                    stats.special_entries += 1;
                }
                Err(source) => {
                    log::debug!("Skipping {}: {}", path.display(), source);
                    stats.unclassifiable_entries += 1;
                    stats.errors.push(ScanError::Unclassifiable { path, source });
                }
            }
        }

        stats.files = files.len();
        (files, stats)
    }
}
