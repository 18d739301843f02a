//! The download descriptor produced by artefact selection.

use super::hash::ExpectedHash;
use pep440_rs::Version;
use url::Url;

/// A selected artefact, ready to be fetched.
///
/// Produced by [`select`](super::selector::select) and consumed once by
/// [`execute`](crate::fetch::execute). The expected hash is a single optional
/// value, so an algorithm never travels without its digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    project_name: String,
    version: Version,
    filename: String,
    url: Url,
    hash: Option<ExpectedHash>,
}

impl Download {
    /// Create a download descriptor.
    #[must_use]
    pub fn new(
        project_name: impl Into<String>,
        version: Version,
        filename: impl Into<String>,
        url: Url,
        hash: Option<ExpectedHash>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            version,
            filename: filename.into(),
            url,
            hash,
        }
    }

    /// Return the normalised project name of the requirement that selected this file.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Return the version inferred from the filename.
    #[must_use]
    pub const fn version(&self) -> &Version {
        &self.version
    }

    /// Return the filename the artefact is written under.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Return the fully resolved artefact URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Return the negotiated hash, if verification is possible.
    #[must_use]
    pub const fn hash(&self) -> Option<&ExpectedHash> {
        self.hash.as_ref()
    }

    /// Return the negotiated algorithm name, if any.
    #[must_use]
    pub fn hash_algo(&self) -> Option<&'static str> {
        self.hash.as_ref().map(|expected| expected.algorithm().name())
    }

    /// Return the expected lowercase hex digest, if any.
    #[must_use]
    pub fn hash_digest(&self) -> Option<&str> {
        self.hash.as_ref().map(ExpectedHash::digest)
    }
}
