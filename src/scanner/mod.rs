//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Breadth-first expansion of a root path into its regular files
//! - Streaming SHA-256 content hashing
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Breadth-first traversal and file discovery
//! - [`hasher`]: SHA-256 file hashing (streaming)
//!
//! # Example
//!
//! ```no_run
//! use dupgroups::progress::NoProgress;
//! use dupgroups::scanner::{Hasher, Walker};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."));
//! let (files, _stats) = walker.walk(&NoProgress);
//!
//! let mut hasher = Hasher::new();
//! for file in &files {
//!     let digest = hasher.hash_file(file.path()).unwrap();
//!     println!("{} {}", digest, file);
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::path::{Path, PathBuf};

// Re-export main types
pub use hasher::{Digest, HashAlgorithm, Hasher, DEFAULT_BUFFER_SIZE, DIGEST_LEN};
pub use walker::{EntryKind, EntrySource, OsEntrySource, WalkStats, Walker};

/// Reference to one discovered filesystem entry.
///
/// Carries the path used to open the file and its string form, computed
/// once. Equality, hashing and ordering all use the string form, so two
/// refs that print the same are the same entry.
#[derive(Debug, Clone)]
pub struct FileRef {
    path: PathBuf,
    display: String,
}

impl FileRef {
    /// Create a new FileRef.
    ///
    /// Non-UTF-8 path components are rendered with U+FFFD replacement
    /// characters in the string form; the original path is kept for I/O.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        let display = path.to_string_lossy().into_owned();
        Self { path, display }
    }

    /// Path used to open the entry.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stable string form used for sorting and serialization.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.display
    }
}

impl From<PathBuf> for FileRef {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&Path> for FileRef {
    fn from(path: &Path) -> Self {
        Self::new(path.to_path_buf())
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl PartialEq for FileRef {
    fn eq(&self, other: &Self) -> bool {
        self.display == other.display
    }
}

impl Eq for FileRef {}

impl Hash for FileRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.display.hash(state);
    }
}

impl PartialOrd for FileRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FileRef {
    /// Byte-wise comparison of the string forms.
    fn cmp(&self, other: &Self) -> Ordering {
        self.display.cmp(&other.display)
    }
}

/// Errors that can occur during directory scanning.
///
/// These never abort a walk; the walker logs them and moves on.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The children of a directory could not be enumerated.
    #[error("Cannot list directory {path}: {source}")]
    ListingFailed {
        /// Directory that failed to list
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An entry could not be classified as file or directory.
    #[error("Cannot classify {path}: {source}")]
    Unclassifiable {
        /// Entry that was skipped
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configured digest algorithm is not available.
    #[error("Unknown hash algorithm: '{0}' (supported: sha-256)")]
    UnknownAlgorithm(String),
}

impl HashError {
    /// Classify an I/O error raised while opening or reading `path`.
    pub(crate) fn from_io(path: &Path, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}
