//! Report output.
//!
//! This module renders scan results as the delimited group report and
//! writes it to its sink:
//! - stdout, the default
//! - a file, written to a temporary sibling and renamed into place only
//!   once complete, so a failed run never leaves a partial report behind
//!
//! # Example
//!
//! ```no_run
//! use dupgroups::duplicates::DuplicateFinder;
//! use dupgroups::output::{write_report, ReportFormat, ReportOutput, ReportSink};
//! use dupgroups::progress::NoProgress;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (buckets, _) = finder.find_in_paths(&["."], &NoProgress).unwrap();
//!
//! let format = ReportFormat::default();
//! let report = ReportOutput::new(buckets, &format);
//! write_report(&report, &ReportSink::Stdout).unwrap();
//! ```

pub mod report;

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

// Re-export main types
pub use report::{
    ReportError, ReportFormat, ReportFormatError, ReportLine, ReportOutput, ReportParseError,
    DEFAULT_DELIMITER, DEFAULT_ESCAPE,
};

/// Destination of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSink {
    /// Standard output
    Stdout,
    /// A file, replaced atomically
    File(PathBuf),
}

impl ReportSink {
    /// Sink for an optional output path; `None` and `-` mean stdout.
    #[must_use]
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(p) if p != Path::new("-") => Self::File(p.to_path_buf()),
            _ => Self::Stdout,
        }
    }
}

/// Write a finished report to its sink.
///
/// # Errors
///
/// Returns `ReportError::Io` on write failure, or `ReportError::Persist`
/// if the temporary file cannot be renamed over the target.
pub fn write_report(report: &ReportOutput<'_>, sink: &ReportSink) -> Result<(), ReportError> {
    match sink {
        ReportSink::Stdout => {
            let stdout = io::stdout();
            report.write_to(BufWriter::new(stdout.lock()))
        }
        ReportSink::File(path) => write_report_file(report, path),
    }
}

fn write_report_file(report: &ReportOutput<'_>, path: &Path) -> Result<(), ReportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        report.write_to(&mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path)?;

    log::debug!("Report written to {}", path.display());
    Ok(())
}
