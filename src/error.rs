//! Structured error handling and exit codes.

use serde::Serialize;

use crate::config::ConfigError;
use crate::duplicates::FinderError;
use crate::output::ReportFormatError;
use crate::scanner::HashError;

/// Exit codes for the dupgroups application.
///
/// - 0: Success (report written, whether or not duplicates exist)
/// - 1: General error (unexpected failure, report could not be written)
/// - 2: Invalid configuration (bad markers, unknown algorithm, bad config file)
/// - 3: Unreadable file (a regular file could not be hashed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the report was written.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// Invalid configuration: nothing was scanned.
    InvalidConfig = 2,
    /// Unreadable file: the scan was aborted and no report was produced.
    UnreadableFile = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DG000",
            Self::GeneralError => "DG001",
            Self::InvalidConfig => "DG002",
            Self::UnreadableFile => "DG003",
        }
    }

    /// Pick the exit code for an error returned by [`crate::run_app`].
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        if err.downcast_ref::<FinderError>().is_some() {
            Self::UnreadableFile
        } else if err.downcast_ref::<ConfigError>().is_some()
            || err.downcast_ref::<ReportFormatError>().is_some()
            || err
                .downcast_ref::<HashError>()
                .is_some_and(|e| matches!(e, HashError::UnknownAlgorithm(_)))
        {
            Self::InvalidConfig
        } else {
            Self::GeneralError
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DG003")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
