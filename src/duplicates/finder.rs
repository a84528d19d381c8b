//! Scan driver: walk every root, hash every file, group by digest.
//!
//! # Pipeline
//!
//! For each root argument, in order:
//! 1. **Walk** - expand the root breadth-first into regular files
//! 2. **Hash** - stream each file through SHA-256, in walk order
//! 3. **Group** - append the file to the bucket for its digest
//!
//! Each root is finished before the next begins, and each file is closed
//! before the next is opened. A directory that cannot be listed is skipped;
//! a file that cannot be read aborts the whole scan and no buckets are
//! returned.

use std::path::Path;
use std::time::{Duration, Instant};

use super::DigestBuckets;
use crate::progress::ProgressReporter;
use crate::scanner::{
    EntrySource, FileRef, HashAlgorithm, HashError, Hasher, OsEntrySource, ScanError, Walker,
    DEFAULT_BUFFER_SIZE,
};

/// Configuration for the duplicate finder.
#[derive(Debug, Clone)]
pub struct FinderConfig {
    /// Digest algorithm
    pub algorithm: HashAlgorithm,
    /// Size of the reusable hashing buffer in bytes
    pub buffer_size: usize,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Sha256,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl FinderConfig {
    /// Set the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the hashing buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }
}

/// Summary statistics from a completed scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Root arguments processed
    pub roots: usize,
    /// Regular files discovered and hashed
    pub total_files: usize,
    /// Directories visited
    pub directories: usize,
    /// Directories that could not be listed
    pub unreadable_directories: usize,
    /// Entries skipped as special or unclassifiable
    pub skipped_entries: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Distinct content digests
    pub distinct_digests: usize,
    /// Digests shared by two or more files
    pub duplicate_groups: usize,
    /// Files that belong to a group of two or more
    pub duplicate_files: usize,
    /// Wall-clock duration of the scan
    pub scan_duration: Duration,
    /// Recovered traversal errors
    pub scan_errors: Vec<ScanError>,
}

/// Errors that abort a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// A discovered file could not be hashed.
    #[error("Cannot hash file: {0}")]
    Hash(#[from] HashError),
}

/// Duplicate finder that drives walk, hash and grouping over many roots.
///
/// # Example
///
/// ```no_run
/// use dupgroups::duplicates::DuplicateFinder;
/// use dupgroups::progress::NoProgress;
///
/// let finder = DuplicateFinder::with_defaults();
/// let (buckets, summary) = finder.find_in_paths(&["photos", "backup"], &NoProgress).unwrap();
///
/// println!("{} files, {} duplicate groups", summary.total_files, summary.duplicate_groups);
/// assert_eq!(buckets.total_files(), summary.total_files);
/// ```
#[derive(Debug)]
pub struct DuplicateFinder<S = OsEntrySource> {
    config: FinderConfig,
    source: S,
}

impl DuplicateFinder {
    /// Create a finder over the real filesystem.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self::with_source(config, OsEntrySource)
    }

    /// Create a finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }
}

impl<S: EntrySource> DuplicateFinder<S> {
    /// Create a finder that walks through a custom [`EntrySource`].
    #[must_use]
    pub fn with_source(config: FinderConfig, source: S) -> Self {
        Self { config, source }
    }

    /// Finder configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Scan every root in order and group all files by digest.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Hash`] as soon as any file cannot be opened or
    /// read. Nothing gathered so far is returned in that case.
    pub fn find_in_paths<P: AsRef<Path>>(
        &self,
        roots: &[P],
        progress: &dyn ProgressReporter,
    ) -> Result<(DigestBuckets, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut buckets = DigestBuckets::new();
        let mut summary = ScanSummary::default();
        let mut hasher = Hasher::with_buffer_size(self.config.algorithm, self.config.buffer_size);

        for root in roots {
            self.scan_root(root.as_ref(), &mut hasher, &mut buckets, &mut summary, progress)?;
        }

        summary.bytes_hashed = hasher.bytes_hashed();
        summary.distinct_digests = buckets.len();
        summary.duplicate_groups = buckets.duplicate_group_count();
        summary.duplicate_files = buckets
            .iter()
            .map(|(_, files)| files.len())
            .filter(|&n| n > 1)
            .sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scanned {} root(s): {} files, {} distinct digests, {} duplicate groups in {:.2?}",
            summary.roots,
            summary.total_files,
            summary.distinct_digests,
            summary.duplicate_groups,
            summary.scan_duration
        );
        if summary.unreadable_directories > 0 {
            log::warn!(
                "{} director{} could not be listed and were skipped",
                summary.unreadable_directories,
                if summary.unreadable_directories == 1 { "y" } else { "ies" }
            );
        }

        Ok((buckets, summary))
    }

    /// Scan a single root.
    ///
    /// # Errors
    ///
    /// See [`find_in_paths`](Self::find_in_paths).
    pub fn find_in_path(
        &self,
        root: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<(DigestBuckets, ScanSummary), FinderError> {
        self.find_in_paths(&[root], progress)
    }

    fn scan_root(
        &self,
        root: &Path,
        hasher: &mut Hasher,
        buckets: &mut DigestBuckets,
        summary: &mut ScanSummary,
        progress: &dyn ProgressReporter,
    ) -> Result<(), FinderError> {
        progress.on_root_start(root);

        let (files, stats) = Walker::with_source(root, &self.source).walk(progress);
        if files.is_empty() && stats.directories == 0 {
            log::warn!("{} is neither a file nor a directory", root.display());
        }
        log::debug!(
            "Walked {}: {} files in {} directories",
            root.display(),
            files.len(),
            stats.directories
        );

        progress.on_files_found(root, files.len());
        progress.on_hashing_start(root, files.len());
        Self::hash_into(files, hasher, buckets, progress)?;

        summary.roots += 1;
        summary.total_files += stats.files;
        summary.directories += stats.directories;
        summary.unreadable_directories += stats.unreadable_directories;
        summary.skipped_entries += stats.special_entries + stats.unclassifiable_entries;
        summary.scan_errors.extend(stats.errors);
        Ok(())
    }

    fn hash_into(
        files: Vec<FileRef>,
        hasher: &mut Hasher,
        buckets: &mut DigestBuckets,
        progress: &dyn ProgressReporter,
    ) -> Result<(), FinderError> {
        for (idx, file) in files.into_iter().enumerate() {
            let digest = hasher.hash_file(file.path())?;
            log::debug!("{} {}", digest, file);
            progress.on_file_hashed(idx + 1, &file);
            buckets.add(file, digest);
        }
        Ok(())
    }
}
