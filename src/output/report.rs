//! Delimited text report of digest groups.
//!
//! One line per group:
//!
//! ```text
//! <hex-digest>|<path_1>|<path_2>|...|<path_n>
//! ```
//!
//! Paths within a line are in ascending byte order; lines are in ascending
//! order of their first path (ties broken by digest). Every field is
//! escaped so that a literal escape marker becomes two markers and a literal
//! delimiter becomes marker + delimiter. Groups holding a single file are
//! written too, so the report partitions every discovered file.
//!
//! # Example
//!
//! ```
//! use dupgroups::duplicates::DigestBuckets;
//! use dupgroups::output::{ReportFormat, ReportOutput};
//! use dupgroups::scanner::{FileRef, Hasher};
//! use std::path::PathBuf;
//!
//! let mut buckets = DigestBuckets::new();
//! buckets.add(FileRef::new(PathBuf::from("a|b.txt")), Hasher::new().hash_bytes(b"hi"));
//!
//! let format = ReportFormat::default();
//! let report = ReportOutput::new(buckets, &format);
//! assert_eq!(
//!     report.render(),
//!     "8f434346648f6b96df89dda901c5176b10a6d83961dd3c1ac88b59b2dc327aa4|a\\|b.txt\n"
//! );
//! ```

use std::io::{self, Write};

use thiserror::Error;

use crate::duplicates::{DigestBuckets, DigestGroup};

/// Default escape marker.
pub const DEFAULT_ESCAPE: &str = "\\";

/// Default field delimiter.
pub const DEFAULT_DELIMITER: &str = "|";

/// Errors from invalid marker configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportFormatError {
    /// A marker is the empty string.
    #[error("The {0} must not be empty")]
    EmptyMarker(&'static str),

    /// A marker contains a line break.
    #[error("The {0} must not contain a line break")]
    LineBreak(&'static str),
}

/// Errors from reading a report line back.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportParseError {
    /// An escape marker is followed by neither marker.
    #[error("Dangling escape marker at byte {0}")]
    DanglingEscape(usize),

    /// The line has a digest but no paths.
    #[error("Line has no path fields")]
    MissingPaths,

    /// The markers overlap, so escaped text cannot be split back reliably.
    #[error("Escape marker '{escape}' and delimiter '{delimiter}' overlap; fields cannot be recovered")]
    AmbiguousMarkers {
        /// Configured escape marker
        escape: String,
        /// Configured delimiter
        delimiter: String,
    },
}

/// Errors that can occur while writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The finished report file could not be moved into place.
    #[error("Failed to save report: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Escape marker and delimiter for report fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFormat {
    escape: String,
    delimiter: String,
}

impl Default for ReportFormat {
    fn default() -> Self {
        Self {
            escape: DEFAULT_ESCAPE.to_string(),
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

impl ReportFormat {
    /// Build a format from the two markers.
    ///
    /// Any pair of non-empty markers without line breaks is accepted.
    /// Pairs that overlap still render, but their output cannot always be
    /// split back; see [`is_reversible`](Self::is_reversible).
    ///
    /// # Errors
    ///
    /// Rejects empty markers and markers containing line breaks.
    pub fn new(
        escape: impl Into<String>,
        delimiter: impl Into<String>,
    ) -> Result<Self, ReportFormatError> {
        let escape = escape.into();
        let delimiter = delimiter.into();

        for (name, marker) in [("escape marker", &escape), ("delimiter", &delimiter)] {
            if marker.is_empty() {
                return Err(ReportFormatError::EmptyMarker(name));
            }
            if marker.contains(|c: char| c == '\n' || c == '\r') {
                return Err(ReportFormatError::LineBreak(name));
            }
        }

        Ok(Self { escape, delimiter })
    }

    /// Whether escaped fields can always be split and unescaped again.
    ///
    /// False when one marker contains the other, or when a proper suffix of
    /// either marker starts either marker (as in `"::"`, or `"ab"` with
    /// `"ba"`).
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        let (e, d) = (self.escape.as_str(), self.delimiter.as_str());
        !(e.contains(d)
            || d.contains(e)
            || suffix_starts(e, e)
            || suffix_starts(e, d)
            || suffix_starts(d, e)
            || suffix_starts(d, d))
    }

    /// Escape marker.
    #[must_use]
    pub fn escape(&self) -> &str {
        &self.escape
    }

    /// Field delimiter.
    #[must_use]
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Escape one field.
    ///
    /// Two literal replace passes: every escape marker becomes two escape
    /// markers, then every delimiter in the result gets an escape marker
    /// in front of it.
    #[must_use]
    pub fn escape_field(&self, field: &str) -> String {
        let doubled = self.escape.repeat(2);
        let prefixed = format!("{}{}", self.escape, self.delimiter);
        field
            .replace(self.escape.as_str(), &doubled)
            .replace(self.delimiter.as_str(), &prefixed)
    }

    /// Reverse [`escape_field`](Self::escape_field) for a single field.
    ///
    /// # Errors
    ///
    /// Returns [`ReportParseError::DanglingEscape`] if an escape marker is
    /// not followed by another escape marker or a delimiter, and
    /// [`ReportParseError::AmbiguousMarkers`] for a format that is not
    /// [reversible](Self::is_reversible).
    pub fn unescape_field(&self, field: &str) -> Result<String, ReportParseError> {
        let mut fields = self.split_fields(field, false)?;
        Ok(fields.pop().unwrap_or_default())
    }

    /// Split a report line into its digest and path fields, unescaped.
    ///
    /// A trailing `\n` (or `\r\n`) is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error on a dangling escape marker, when the line holds
    /// no path field, or when the format is not
    /// [reversible](Self::is_reversible).
    pub fn parse_line(&self, line: &str) -> Result<ReportLine, ReportParseError> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);

        let mut fields = self.split_fields(line, true)?.into_iter();
        let digest = fields.next().unwrap_or_default();
        let paths: Vec<String> = fields.collect();
        if paths.is_empty() {
            return Err(ReportParseError::MissingPaths);
        }
        Ok(ReportLine { digest, paths })
    }

    /// Render one group as a line, including the trailing newline.
    #[must_use]
    pub fn render_group(&self, group: &DigestGroup) -> String {
        let mut line = self.escape_field(&group.digest.to_hex());
        for file in &group.files {
            line.push_str(&self.delimiter);
            line.push_str(&self.escape_field(file.as_str()));
        }
        line.push('\n');
        line
    }

    fn split_fields(&self, text: &str, split: bool) -> Result<Vec<String>, ReportParseError> {
        if !self.is_reversible() {
            return Err(ReportParseError::AmbiguousMarkers {
                escape: self.escape.clone(),
                delimiter: self.delimiter.clone(),
            });
        }

        let mut fields = Vec::new();
        let mut current = String::new();
        let mut rest = text;

        while let Some(c) = rest.chars().next() {
            if let Some(after) = rest.strip_prefix(self.escape.as_str()) {
                if let Some(next) = after.strip_prefix(self.escape.as_str()) {
                    current.push_str(&self.escape);
                    rest = next;
                } else if let Some(next) = after.strip_prefix(self.delimiter.as_str()) {
                    current.push_str(&self.delimiter);
                    rest = next;
                } else {
                    return Err(ReportParseError::DanglingEscape(text.len() - rest.len()));
                }
            } else if split && rest.starts_with(self.delimiter.as_str()) {
                fields.push(std::mem::take(&mut current));
                rest = &rest[self.delimiter.len()..];
            } else {
                current.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }

        fields.push(current);
        Ok(fields)
    }
}

/// True if some non-empty proper suffix of `a` is a prefix of `b`.
fn suffix_starts(a: &str, b: &str) -> bool {
    a.char_indices()
        .skip(1)
        .any(|(i, _)| b.starts_with(&a[i..]))
}

/// One report line read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    /// Digest field (hex)
    pub digest: String,
    /// Path fields in line order
    pub paths: Vec<String>,
}

/// Report over a finished scan.
///
/// Takes ownership of the buckets; groups are sorted once on construction.
pub struct ReportOutput<'a> {
    groups: Vec<DigestGroup>,
    format: &'a ReportFormat,
}

impl<'a> ReportOutput<'a> {
    /// Create a report from the scan's buckets.
    #[must_use]
    pub fn new(buckets: DigestBuckets, format: &'a ReportFormat) -> Self {
        Self {
            groups: buckets.into_sorted_groups(),
            format,
        }
    }

    /// Groups in output order.
    #[must_use]
    pub fn groups(&self) -> &[DigestGroup] {
        &self.groups
    }

    /// Number of lines the report will contain.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.groups.len()
    }

    /// Write the report to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Io` if writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), ReportError> {
        for group in &self.groups {
            writer.write_all(self.format.render_group(group).as_bytes())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Render the whole report as a string.
    #[must_use]
    pub fn render(&self) -> String {
        self.groups
            .iter()
            .map(|group| self.format.render_group(group))
            .collect()
    }
}
