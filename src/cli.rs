//! Command-line interface definitions for dupgroups.
//!
//! # Example
//!
//! ```bash
//! # Report content groups for two directories
//! dupgroups ~/Downloads ~/Documents
//!
//! # Write the report to a file, progress to the terminal
//! dupgroups ~/Pictures --output groups.txt
//!
//! # Use a different delimiter and escape marker
//! dupgroups --delimiter ',' --escape '~' ~/Music
//!
//! # Verbose mode for debugging
//! dupgroups -vv ~/Downloads
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Group files by content digest.
///
/// Every regular file reachable from the given roots is hashed, and one line
/// per distinct digest is printed: the hex digest followed by every path with
/// that content, separated by the delimiter. Progress comments go to stderr.
#[derive(Debug, Parser)]
#[command(name = "dupgroups")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files or directories to scan (each is an independent root)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Increase verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress comments and all diagnostics except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Read settings from this TOML file instead of the platform default
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Escape marker used in report fields (default: \)
    #[arg(long, value_name = "STR")]
    pub escape: Option<String>,

    /// Delimiter between report fields (default: |)
    #[arg(long, value_name = "STR")]
    pub delimiter: Option<String>,

    /// Read buffer size used while hashing (e.g., 64KiB, 1MB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB
    #[arg(long, value_name = "SIZE", value_parser = parse_buffer_size)]
    pub buffer_size: Option<usize>,

    /// Write the report to FILE instead of stdout ("-" means stdout)
    ///
    /// The file is only replaced once the report is complete.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print progress comments on stdout instead of stderr
    ///
    /// Needs --output so the report and the comments stay apart.
    #[arg(long, requires = "output")]
    pub progress_to_stdout: bool,

    /// Report errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dupgroups::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("64KiB").unwrap(), 65_536);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

/// Parse a hashing buffer size: a non-zero [`parse_size`] that fits in memory.
fn parse_buffer_size(s: &str) -> Result<usize, String> {
    let bytes = parse_size(s)?;
    if bytes == 0 {
        return Err("Buffer size must be greater than zero".to_string());
    }
    usize::try_from(bytes).map_err(|_| format!("Buffer size too large: {bytes}"))
}
