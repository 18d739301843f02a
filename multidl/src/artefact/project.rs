//! Project pages from the package index JSON API.
//!
//! Models the subset of a PEP 691 project response this tool reads: the
//! `files` array with each file's name, URL, digests, and yank status.
//! Unknown keys are ignored.

use super::hash::HashDigests;
use serde::Deserialize;

/// A project's file listing as returned by the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectListing {
    /// Every file the index lists for the project, in index order.
    pub files: Vec<ArtifactRecord>,
}

/// One file entry from a project listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactRecord {
    /// The artefact's filename.
    pub filename: String,
    /// Absolute URL, or a URL relative to the project page.
    pub url: String,
    /// Advertised digests in index order.
    #[serde(default)]
    pub hashes: HashDigests,
    /// Yank status; absent means not yanked.
    #[serde(default)]
    pub yanked: Option<Yanked>,
}

impl ArtifactRecord {
    /// Return true when the index has withdrawn this file.
    #[must_use]
    pub fn is_yanked(&self) -> bool {
        self.yanked.as_ref().is_some_and(Yanked::is_yanked)
    }
}

/// The `yanked` field: a flag, or the reason the file was yanked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Yanked {
    /// Explicit yank flag.
    Flag(bool),
    /// A yank reason; its presence marks the file as yanked.
    Reason(String),
}

impl Yanked {
    /// Return true when this value marks the file as yanked.
    #[must_use]
    pub const fn is_yanked(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Reason(_) => true,
        }
    }
}

/// Parse a project page JSON body.
///
/// # Errors
///
/// Returns an error if the body is not JSON or lacks the `files` array.
///
/// # Examples
///
/// ```
/// use pypi_multidl::artefact::project::parse_listing;
///
/// let json = r#"{"files":[{"filename":"foo-1.0.tar.gz","url":"foo-1.0.tar.gz","hashes":{}}]}"#;
/// let listing = parse_listing(json).expect("valid listing");
/// assert_eq!(listing.files.len(), 1);
/// assert!(!listing.files[0].is_yanked());
/// ```
pub fn parse_listing(json: &str) -> Result<ProjectListing, serde_json::Error> {
    serde_json::from_str(json)
}
