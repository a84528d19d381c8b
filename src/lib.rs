//! dupgroups - group files by content digest
//!
//! Walks one or more roots breadth-first, hashes every regular file with
//! SHA-256 and reports one delimited line per distinct digest listing every
//! path that has that content.
//!
//! The pipeline is split into:
//! - [`scanner`]: traversal and streaming digests
//! - [`duplicates`]: grouping files by digest
//! - [`output`]: the escaped, deterministic report
//! - [`progress`]: human-readable notices on a side channel

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io;

use anyhow::Context;

use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::{write_report, ReportOutput, ReportSink};
use crate::progress::{CommentProgress, NoProgress, ProgressReporter};

/// Run the application for parsed command-line arguments.
///
/// Configuration is validated before any root is touched, so a bad marker or
/// unknown algorithm fails without progress output. The report is only
/// written once every file has been hashed.
///
/// # Errors
///
/// Returns an error on invalid configuration, on the first file that cannot
/// be hashed, or if the report cannot be written.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load_with_cli(&cli)?;
    log::debug!("Effective configuration: {:?}", config);

    let format = config.report_format()?;
    if !format.is_reversible() {
        log::warn!(
            "Escape marker '{}' and delimiter '{}' overlap; the report cannot be split back into fields",
            format.escape(),
            format.delimiter()
        );
    }
    let finder_config = FinderConfig::default()
        .with_algorithm(config.hash_algorithm()?)
        .with_buffer_size(config.buffer_size);
    let finder = DuplicateFinder::new(finder_config);

    let sink = ReportSink::from_path(cli.output.as_deref());
    let progress_to_stdout = match &sink {
        ReportSink::Stdout if cli.progress_to_stdout => {
            log::warn!("Report goes to stdout; keeping progress on stderr");
            false
        }
        _ => cli.progress_to_stdout,
    };

    let progress: Box<dyn ProgressReporter> = if cli.quiet {
        Box::new(NoProgress)
    } else if progress_to_stdout {
        Box::new(CommentProgress::with_marker(io::stdout(), config.comment_marker.clone()))
    } else {
        Box::new(CommentProgress::with_marker(io::stderr(), config.comment_marker.clone()))
    };

    let (buckets, summary) = finder.find_in_paths(&cli.paths, progress.as_ref())?;
    for error in &summary.scan_errors {
        log::debug!("Skipped during scan: {}", error);
    }

    let report = ReportOutput::new(buckets, &format);
    write_report(&report, &sink).context("Failed to write report")?;

    log::info!(
        "Wrote {} line(s); {} duplicate group(s) covering {} files",
        report.line_count(),
        summary.duplicate_groups,
        summary.duplicate_files
    );

    Ok(ExitCode::Success)
}
