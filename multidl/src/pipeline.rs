//! Download pipeline orchestration.
//!
//! Consumes the lazy resolution sequence one download at a time: each
//! filename is printed to stdout, then (outside dry runs) the artefact is
//! fetched and verified before the next item is pulled. The first error of
//! any kind ends the run.

use crate::artefact::download::Download;
use crate::error::{MultidlError, Result};
use crate::fetch::execute;
use crate::output::{ListEntry, success_message, write_list_file, write_stderr_line};
use crate::resolver::IndexError;
use crate::transport::Transport;
use camino::Utf8Path;
use log::debug;
use std::io::Write;

/// Settings for one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions<'a> {
    /// Directory the artefacts are written to.
    pub dest_dir: &'a Utf8Path,
    /// List filenames without fetching anything or touching the disk.
    pub dry_run: bool,
    /// Where to write the JSON list of downloaded files.
    pub list_file: Option<&'a Utf8Path>,
    /// Suppress the summary line on stderr.
    pub quiet: bool,
}

/// What a completed run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// One entry per selected file, in the order printed.
    pub entries: Vec<ListEntry>,
    /// How many fetched files were verified against a digest.
    pub verified: usize,
}

/// Drive resolution and fetching to completion.
///
/// # Errors
///
/// Returns the first resolution, fetch, verification, or output error.
/// Files fetched before the error stay on disk and no list file is written.
pub fn run_downloads<I, T>(
    downloads: I,
    transport: &T,
    options: &RunOptions<'_>,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<RunSummary>
where
    I: IntoIterator<Item = std::result::Result<Download, IndexError>>,
    T: Transport + ?Sized,
{
    if !options.dry_run {
        std::fs::create_dir_all(options.dest_dir).map_err(|source| {
            MultidlError::CreateDestination {
                path: options.dest_dir.to_owned(),
                source,
            }
        })?;
    }

    let mut summary = RunSummary::default();
    for item in downloads {
        let download = item?;
        writeln!(stdout, "{}", download.filename())
            .map_err(|source| MultidlError::WriteFailed { source })?;
        if !options.dry_run {
            let fetched = execute(&download, options.dest_dir, transport)?;
            debug!("{}: {} bytes", fetched.path, fetched.bytes);
            if fetched.verified {
                summary.verified += 1;
            }
        }
        summary.entries.push(ListEntry::from(&download));
    }
    stdout
        .flush()
        .map_err(|source| MultidlError::WriteFailed { source })?;

    if options.dry_run {
        if !options.quiet {
            write_stderr_line(
                stderr,
                format!("Dry run: {} files would be downloaded", summary.entries.len()),
            );
        }
        return Ok(summary);
    }

    if let Some(path) = options.list_file {
        write_list_file(path, &summary.entries).map_err(|source| MultidlError::ListFile {
            path: path.to_owned(),
            source,
        })?;
    }
    if !options.quiet {
        write_stderr_line(
            stderr,
            success_message(summary.entries.len(), summary.verified, options.dest_dir),
        );
    }
    Ok(summary)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
