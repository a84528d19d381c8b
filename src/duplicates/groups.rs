//! Digest-keyed grouping of discovered files.
//!
//! # Overview
//!
//! [`DigestBuckets`] maps each content digest to the files that produced
//! it, in the order they were added. It is pure accumulation: nothing is
//! evicted, re-keyed or re-ordered here. Sorting for output happens in
//! [`sorted_groups`](DigestBuckets::sorted_groups).
//!
//! # Example
//!
//! ```
//! use dupgroups::duplicates::DigestBuckets;
//! use dupgroups::scanner::{FileRef, Hasher};
//! use std::path::PathBuf;
//!
//! let hasher = Hasher::new();
//! let mut buckets = DigestBuckets::new();
//! buckets.add(FileRef::new(PathBuf::from("y/1.txt")), hasher.hash_bytes(b"hi"));
//! buckets.add(FileRef::new(PathBuf::from("x/1.txt")), hasher.hash_bytes(b"hi"));
//! buckets.add(FileRef::new(PathBuf::from("z.txt")), hasher.hash_bytes(b"other"));
//!
//! assert_eq!(buckets.len(), 2);
//! assert_eq!(buckets.total_files(), 3);
//! assert_eq!(buckets.duplicate_group_count(), 1);
//!
//! let groups = buckets.sorted_groups();
//! assert_eq!(groups[0].files[0].as_str(), "x/1.txt");
//! ```

use std::collections::HashMap;

use crate::scanner::{Digest, FileRef};

/// Files sharing one digest, ready for output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestGroup {
    /// Content digest shared by every file
    pub digest: Digest,
    /// Files with this digest
    pub files: Vec<FileRef>,
}

impl DigestGroup {
    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this group holds real duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }
}

/// Accumulator mapping digests to files in discovery order.
#[derive(Debug, Clone, Default)]
pub struct DigestBuckets {
    buckets: HashMap<Digest, Vec<FileRef>>,
    total_files: usize,
}

impl DigestBuckets {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `file` to the bucket for `digest`, creating it if absent.
    ///
    /// The same file may be added more than once; every addition is kept.
    pub fn add(&mut self, file: FileRef, digest: Digest) {
        self.buckets.entry(digest).or_default().push(file);
        self.total_files += 1;
    }

    /// Number of distinct digests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if no file has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of additions across all buckets.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.total_files
    }

    /// Number of buckets with two or more files.
    #[must_use]
    pub fn duplicate_group_count(&self) -> usize {
        self.buckets.values().filter(|files| files.len() > 1).count()
    }

    /// Files recorded for `digest`, in insertion order.
    #[must_use]
    pub fn get(&self, digest: &Digest) -> Option<&[FileRef]> {
        self.buckets.get(digest).map(Vec::as_slice)
    }

    /// Iterate over buckets in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&Digest, &[FileRef])> {
        self.buckets.iter().map(|(d, files)| (d, files.as_slice()))
    }

    /// Consume the accumulator into deterministically ordered groups.
    ///
    /// Empty buckets are dropped. Files within a group are sorted by their
    /// string form; groups are sorted by their first file, then by digest
    /// hex when two groups start with the same path.
    #[must_use]
    pub fn into_sorted_groups(self) -> Vec<DigestGroup> {
        let mut groups: Vec<DigestGroup> = self
            .buckets
            .into_iter()
            .filter(|(_, files)| !files.is_empty())
            .map(|(digest, mut files)| {
                files.sort();
                DigestGroup { digest, files }
            })
            .collect();

        // Digest bytes order the same way as their lowercase hex.
        groups.sort_by(|a, b| {
            a.files[0]
                .cmp(&b.files[0])
                .then_with(|| a.digest.cmp(&b.digest))
        });
        groups
    }

    /// Deterministically ordered copy of the groups.
    ///
    /// See [`into_sorted_groups`](Self::into_sorted_groups).
    #[must_use]
    pub fn sorted_groups(&self) -> Vec<DigestGroup> {
        self.clone().into_sorted_groups()
    }
}
