//! Output formatting for the downloader CLI.
//!
//! Progress lines go to stderr; filenames go to stdout. After a real run the
//! list file records what was downloaded as a JSON array.

use crate::artefact::download::Download;
use camino::Utf8Path;
use pep440_rs::Version;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Write one line to stderr, ignoring failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Format a summary line after a download run.
#[must_use]
pub fn success_message(count: usize, verified: usize, dest_dir: &Utf8Path) -> String {
    let plural = if count == 1 { "file" } else { "files" };
    format!("Downloaded {count} {plural} to {dest_dir} ({verified} verified)")
}

/// One entry of the list file.
///
/// Fields are declared alphabetically so the serialised keys come out
/// sorted.
///
/// # Examples
///
/// ```
/// use pypi_multidl::output::ListEntry;
///
/// let entry = ListEntry {
///     filename: "foo-1.0.tar.gz".to_owned(),
///     name: "foo".to_owned(),
///     version: "1".to_owned(),
/// };
/// let json = serde_json::to_string(&entry).expect("serialisable");
/// assert_eq!(json, r#"{"filename":"foo-1.0.tar.gz","name":"foo","version":"1"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    /// The artefact filename.
    pub filename: String,
    /// Normalised project name.
    pub name: String,
    /// Canonical version (see [`canonicalize_version`]).
    pub version: String,
}

impl From<&Download> for ListEntry {
    fn from(download: &Download) -> Self {
        Self {
            filename: download.filename().to_owned(),
            name: download.project_name().to_owned(),
            version: canonicalize_version(download.version()),
        }
    }
}

/// Render a version in canonical form: normalised, with trailing zero
/// release segments removed (at least one segment is kept).
///
/// # Examples
///
/// ```
/// use pep440_rs::Version;
/// use pypi_multidl::output::canonicalize_version;
/// use std::str::FromStr;
///
/// let version = Version::from_str("1.2.0.0rc1").expect("valid version");
/// assert_eq!(canonicalize_version(&version), "1.2rc1");
/// ```
#[must_use]
pub fn canonicalize_version(version: &Version) -> String {
    let rendered = version.to_string();
    let epoch = if version.epoch() == 0 {
        String::new()
    } else {
        format!("{}!", version.epoch())
    };
    let release = version.release();
    let full_release = join_release(release);
    let kept = release
        .iter()
        .rposition(|segment| *segment != 0)
        .map_or(1, |last| last + 1);
    let trimmed_release = join_release(release.get(..kept).unwrap_or(release));

    rendered
        .strip_prefix(epoch.as_str())
        .and_then(|rest| rest.strip_prefix(full_release.as_str()))
        .map_or(rendered.clone(), |suffix| {
            format!("{epoch}{trimmed_release}{suffix}")
        })
}

fn join_release(segments: &[u64]) -> String {
    segments
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Write the list file: a JSON array with 4-space indentation.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_list_file(path: &Utf8Path, entries: &[ListEntry]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_list(&mut writer, entries)?;
    writer.flush()
}

/// Serialise list entries into `writer`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_list(writer: &mut dyn Write, entries: &[ListEntry]) -> io::Result<()> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    entries.serialize(&mut serializer).map_err(io::Error::from)
}
