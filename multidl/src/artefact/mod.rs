//! Index artefacts: listing model, version inference, hash negotiation, and
//! selection.
//!
//! # Sub-modules
//!
//! - [`classifier`] - Filename-based version inference (`Classification`).
//! - [`download`] - The selected artefact descriptor (`Download`).
//! - [`hash`] - Supported algorithms and negotiation (`ExpectedHash`).
//! - [`project`] - Project page JSON model (`ProjectListing`).
//! - [`selector`] - Filtering a listing into downloads.

pub mod classifier;
pub mod download;
pub mod hash;
pub mod project;
pub mod selector;
