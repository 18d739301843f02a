//! Filename-based version inference for index artefacts.
//!
//! A package index lists files, not versions, so the version of each file is
//! recovered from its name. Built distributions (wheels) follow the
//! `{name}-{version}(-{build})?-{python}-{abi}-{platform}.whl` scheme and
//! source distributions follow `{name}-{version}.tar.gz` or
//! `{name}-{version}.zip`. Every other shape, such as Windows installers or
//! eggs, classifies as [`Classification::Unknown`].

use pep440_rs::Version;
use std::str::FromStr;

/// File extension of built distributions.
const WHEEL_EXTENSION: &str = ".whl";

/// Archive extensions accepted for source distributions.
const SDIST_EXTENSIONS: [&str; 2] = [".tar.gz", ".zip"];

/// The outcome of inferring a version from an artefact filename.
///
/// # Examples
///
/// ```
/// use pypi_multidl::artefact::classifier::{Classification, classify};
///
/// let classification = classify("foo-1.2.3-py3-none-any.whl");
/// assert!(matches!(classification, Classification::Wheel(_)));
///
/// assert_eq!(classify("foobar-1.0.win32.exe"), Classification::Unknown);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A built distribution carrying the embedded version.
    Wheel(Version),
    /// A source distribution carrying the embedded version.
    Sdist(Version),
    /// The filename matches neither scheme.
    Unknown,
}

impl Classification {
    /// Return the inferred version, if any.
    #[must_use]
    pub fn version(&self) -> Option<&Version> {
        match self {
            Self::Wheel(version) | Self::Sdist(version) => Some(version),
            Self::Unknown => None,
        }
    }

    /// Consume the classification and return the inferred version, if any.
    #[must_use]
    pub fn into_version(self) -> Option<Version> {
        match self {
            Self::Wheel(version) | Self::Sdist(version) => Some(version),
            Self::Unknown => None,
        }
    }
}

/// Infer the version of an artefact from its filename.
///
/// The wheel scheme is tried first. A `.whl` file that fails wheel validation
/// can never be a source distribution, so it ends up [`Classification::Unknown`].
#[must_use]
pub fn classify(filename: &str) -> Classification {
    if let Some(version) = wheel_version(filename) {
        return Classification::Wheel(version);
    }
    sdist_version(filename).map_or(Classification::Unknown, Classification::Sdist)
}

/// Parse the version out of a wheel filename.
fn wheel_version(filename: &str) -> Option<Version> {
    let stem = filename.strip_suffix(WHEEL_EXTENSION)?;
    let parts: Vec<&str> = stem.split('-').collect();
    let (name, version, build) = match parts.as_slice() {
        [name, version, _python, _abi, _platform] => (*name, *version, None),
        [name, version, build, _python, _abi, _platform] => (*name, *version, Some(*build)),
        _ => return None,
    };

    if !is_wheel_name(name) {
        return None;
    }
    if build.is_some_and(|tag| !tag.starts_with(|c: char| c.is_ascii_digit())) {
        return None;
    }
    Version::from_str(version).ok()
}

/// Wheel names are escaped: only word characters and dots survive, and
/// escaping never produces a doubled underscore.
fn is_wheel_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
        && !name.contains("__")
}

/// Parse the version out of a source distribution filename.
///
/// The stem is split at its last hyphen. Any failure, including a version
/// segment that is not valid PEP 440 syntax, yields `None`.
fn sdist_version(filename: &str) -> Option<Version> {
    let stem = SDIST_EXTENSIONS
        .iter()
        .find_map(|extension| filename.strip_suffix(extension))?;
    let (_name, version) = stem.rsplit_once('-')?;
    Version::from_str(version).ok()
}
