//! Artefact selection from a project listing.
//!
//! Walks a project's files in index order and keeps those that are safe to
//! write, not yanked, classifiable, and inside the requested version range.
//! Each rejection is a soft skip, logged at debug level and otherwise silent.

use super::classifier::classify;
use super::download::Download;
use super::hash::negotiate;
use super::project::{ArtifactRecord, ProjectListing};
use log::{debug, warn};
use pep440_rs::{Operator, Version, VersionSpecifiers};
use url::Url;

/// The per-project inputs to [`select`].
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    /// Normalised name of the requested project.
    pub project_name: &'a str,
    /// Version constraint; an empty set accepts every version.
    pub specifier: &'a VersionSpecifiers,
    /// URL of the project page, used to resolve relative file URLs.
    pub project_url: &'a Url,
}

/// Lazily select the downloadable artefacts of a project.
///
/// Emission order is listing order; nothing is re-sorted.
pub fn select<'a>(
    listing: &'a ProjectListing,
    context: SelectionContext<'a>,
) -> impl Iterator<Item = Download> + 'a {
    listing
        .files
        .iter()
        .filter_map(move |record| select_record(record, context))
}

/// Apply the selection rules to one record.
fn select_record(record: &ArtifactRecord, context: SelectionContext<'_>) -> Option<Download> {
    let filename = record.filename.as_str();
    if is_unsafe_filename(filename) {
        debug!("skipping {filename:?}: unsafe filename");
        return None;
    }
    if record.is_yanked() {
        debug!("skipping {filename}: yanked");
        return None;
    }
    let Some(version) = classify(filename).into_version() else {
        debug!("skipping {filename}: version cannot be inferred from filename");
        return None;
    };
    if !satisfies(context.specifier, &version) {
        debug!("skipping {filename}: {version} does not satisfy {}", context.specifier);
        return None;
    }
    let url = match context.project_url.join(&record.url) {
        Ok(url) => url,
        Err(err) => {
            warn!("skipping {filename}: cannot resolve URL {:?}: {err}", record.url);
            return None;
        }
    };
    let hash = negotiate(&record.hashes);
    Some(Download::new(
        context.project_name,
        version,
        filename,
        url,
        hash,
    ))
}

/// Return true for filenames that could escape the destination directory.
///
/// # Examples
///
/// ```
/// use pypi_multidl::artefact::selector::is_unsafe_filename;
///
/// assert!(is_unsafe_filename(".."));
/// assert!(is_unsafe_filename("../foo-1.0.tar.gz"));
/// assert!(!is_unsafe_filename("foo-1.0.tar.gz"));
/// ```
#[must_use]
pub fn is_unsafe_filename(filename: &str) -> bool {
    matches!(filename, "" | "." | "..") || filename.contains(['/', '\\'])
}

/// Test a version against a constraint.
///
/// Pre-releases and development releases only match when a clause of the
/// constraint itself names a pre-release.
#[must_use]
pub fn satisfies(specifier: &VersionSpecifiers, version: &Version) -> bool {
    if is_prerelease(version) && !allows_prereleases(specifier) {
        return false;
    }
    specifier.contains(version)
}

/// Exclusion clauses never opt in, even when they name a pre-release.
fn allows_prereleases(specifier: &VersionSpecifiers) -> bool {
    specifier.iter().any(|clause| {
        !matches!(clause.operator(), Operator::NotEqual | Operator::NotEqualStar)
            && is_prerelease(clause.version())
    })
}

fn is_prerelease(version: &Version) -> bool {
    version.is_pre() || version.is_dev()
}
