//! Streaming artefact retrieval with integrity verification.
//!
//! The artefact body is copied to `<dest_dir>/<filename>` in fixed-size
//! chunks. When the index advertised a supported digest every chunk is also
//! fed to an incremental hash context, and the final digest is compared once
//! the stream ends. The write is not atomic: an interrupted or corrupt
//! download stays on disk under its final name.

use crate::artefact::download::Download;
use crate::artefact::hash::HashAlgorithm;
use crate::transport::{Transport, TransportError};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use std::fs::File;
use std::io::{self, Read, Write};

/// Bytes read from the network per chunk.
pub const CHUNK_SIZE: usize = 4096;

/// Errors raised while fetching one artefact.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The artefact request failed.
    #[error("failed to download {filename}: {source}")]
    Transport {
        /// The artefact being fetched.
        filename: String,
        /// Underlying transport error.
        source: TransportError,
    },

    /// The destination file could not be written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// The destination path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The response body broke off while streaming.
    #[error("failed to read {filename} from the network: {source}")]
    Stream {
        /// The artefact being fetched.
        filename: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The downloaded bytes do not hash to the advertised digest.
    #[error("{algorithm} hash for {filename} did not match: expected {expected}, got {actual}")]
    IntegrityMismatch {
        /// The artefact that failed verification.
        filename: String,
        /// The negotiated algorithm.
        algorithm: HashAlgorithm,
        /// The digest advertised by the index.
        expected: String,
        /// The digest of the bytes received.
        actual: String,
    },
}

/// The outcome of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    /// Where the artefact was written.
    pub path: Utf8PathBuf,
    /// Number of bytes written.
    pub bytes: u64,
    /// Whether the bytes were checked against an advertised digest.
    pub verified: bool,
}

/// Download one artefact into `dest_dir`, verifying it when possible.
///
/// The stream is opened before the destination file is created, so a failed
/// request leaves nothing behind.
///
/// # Errors
///
/// Returns an error if the request fails, the file cannot be written, the
/// stream breaks off, or the digest does not match.
pub fn execute<T>(
    download: &Download,
    dest_dir: &Utf8Path,
    transport: &T,
) -> Result<Fetched, FetchError>
where
    T: Transport + ?Sized,
{
    let filename = download.filename();
    let path = dest_dir.join(filename);
    let mut reader =
        transport
            .open_stream(download.url().as_str())
            .map_err(|source| FetchError::Transport {
                filename: filename.to_owned(),
                source,
            })?;
    let mut file = File::create(&path).map_err(|source| FetchError::Io {
        path: path.clone(),
        source,
    })?;
    debug!("writing {} to {path}", download.url());

    let mut hasher = download.hash().map(|expected| expected.algorithm().hasher());
    let mut buffer = [0_u8; CHUNK_SIZE];
    let mut bytes = 0_u64;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(FetchError::Stream {
                    filename: filename.to_owned(),
                    source,
                });
            }
        };
        let chunk = &buffer[..read];
        file.write_all(chunk).map_err(|source| FetchError::Io {
            path: path.clone(),
            source,
        })?;
        if let Some(hasher) = hasher.as_mut() {
            hasher.update(chunk);
        }
        bytes += read as u64;
    }
    file.flush().map_err(|source| FetchError::Io {
        path: path.clone(),
        source,
    })?;

    let verified = match (download.hash(), hasher) {
        (Some(expected), Some(hasher)) => {
            let actual = hex::encode(hasher.finalize());
            if !expected.matches(&actual) {
                return Err(FetchError::IntegrityMismatch {
                    filename: filename.to_owned(),
                    algorithm: expected.algorithm(),
                    expected: expected.digest().to_owned(),
                    actual,
                });
            }
            debug!("{filename}: {} digest verified", expected.algorithm());
            true
        }
        _ => {
            warn!("{filename}: no supported hash advertised; saved without verification");
            false
        }
    };

    Ok(Fetched {
        path,
        bytes,
        verified,
    })
}
