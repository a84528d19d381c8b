//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Grouping files by content digest in discovery order
//! - Driving the walk/hash/group pipeline over many roots

pub mod finder;
pub mod groups;

// Re-export main types
pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{DigestBuckets, DigestGroup};
