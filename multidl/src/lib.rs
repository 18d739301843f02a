//! pypi-multidl library.
//!
//! This crate resolves Python package requirements against a PEP 691 package
//! index, selects every matching wheel and source distribution, and
//! downloads them with digest verification for later offline installation.
//! It is used by the `pypi-multidl` CLI binary and can be consumed
//! programmatically for testing or custom download workflows.
//!
//! # Modules
//!
//! - [`artefact`] - Index listing model, version inference, hash negotiation, and selection
//! - [`cli`] - Command-line argument definitions
//! - [`error`] - Top-level error type for the binary
//! - [`fetch`] - Streaming download with integrity verification
//! - [`index_url`] - Index URL discovery from flags and pip configuration
//! - [`output`] - Progress lines and the JSON list file
//! - [`pipeline`] - Dry-run listing and the download loop
//! - [`requirement`] - Requirement parsing and requirements files
//! - [`resolver`] - Lazy requirement resolution against the index
//! - [`transport`] - HTTP transport trait and `ureq` implementation

pub mod artefact;
pub mod cli;
pub mod error;
pub mod fetch;
pub mod index_url;
pub mod output;
pub mod pipeline;
pub mod requirement;
pub mod resolver;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
