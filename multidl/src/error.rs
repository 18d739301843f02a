//! Error types for the downloader CLI.
//!
//! Each concern keeps its own error enum next to the code that raises it.
//! [`MultidlError`] gathers them for the binary, which reports any of them as
//! a one-line diagnostic and exits with status 1.

use crate::fetch::FetchError;
use crate::index_url::IndexUrlError;
use crate::requirement::RequirementError;
use crate::resolver::IndexError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that end a download run.
#[derive(Debug, Error)]
pub enum MultidlError {
    /// A requirement or requirements file is invalid.
    #[error(transparent)]
    Requirement(#[from] RequirementError),

    /// The index URL is invalid.
    #[error(transparent)]
    IndexUrl(#[from] IndexUrlError),

    /// The index could not be queried.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// An artefact could not be fetched or failed verification.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The destination directory could not be created.
    #[error("failed to create destination directory {path}: {source}")]
    CreateDestination {
        /// The directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The list file could not be written.
    #[error("failed to write list file {path}: {source}")]
    ListFile {
        /// The list file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write output to stdout.
    #[error("failed to write output: {source}")]
    WriteFailed {
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Result type alias using [`MultidlError`].
pub type Result<T> = std::result::Result<T, MultidlError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artefact::hash::HashAlgorithm;
    use crate::transport::TransportError;

    #[test]
    fn integrity_mismatch_names_file_and_algorithm() {
        let err = MultidlError::from(FetchError::IntegrityMismatch {
            filename: "foo-1.0.tar.gz".to_owned(),
            algorithm: HashAlgorithm::Sha256,
            expected: "aa".to_owned(),
            actual: "bb".to_owned(),
        });
        let msg = err.to_string();
        assert!(msg.contains("foo-1.0.tar.gz"));
        assert!(msg.contains("sha256"));
        assert!(msg.contains("aa") && msg.contains("bb"));
    }

    #[test]
    fn index_not_found_includes_url() {
        let err = MultidlError::from(IndexError::from(TransportError::NotFound {
            url: "https://pypi.org/simple/nope/".to_owned(),
        }));
        assert!(err.to_string().contains("https://pypi.org/simple/nope/"));
    }

    #[test]
    fn list_file_error_includes_path_and_source() {
        let source = std::io::Error::other("permission denied");
        let err = MultidlError::ListFile {
            path: Utf8PathBuf::from("/ro/list.json"),
            source,
        };
        let msg = err.to_string();
        assert!(msg.contains("/ro/list.json"));
        assert!(msg.contains("permission denied"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn write_failed_includes_reason() {
        let source = std::io::Error::other("broken pipe");
        let err = MultidlError::WriteFailed { source };
        let msg = err.to_string();
        assert!(msg.contains("write"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
