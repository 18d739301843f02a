//! Requirement resolution against the package index.
//!
//! Each requirement is resolved independently: its project page is fetched,
//! parsed, and handed to the artefact selector. [`resolve`] chains the
//! results into one lazy sequence so that the next project page is only
//! requested once every download of the previous project has been consumed.

use crate::artefact::download::Download;
use crate::artefact::project::{ProjectListing, parse_listing};
use crate::artefact::selector::{SelectionContext, select};
use crate::requirement::Requirement;
use crate::transport::{Transport, TransportError};
use log::debug;
use std::iter::FusedIterator;
use url::Url;

/// Errors raised while querying the index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The project page could not be fetched.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The project page is not a valid JSON listing.
    #[error("invalid index response from {url}: {source}")]
    InvalidResponse {
        /// The project page URL.
        url: String,
        /// Parse failure.
        source: serde_json::Error,
    },

    /// Project URLs cannot be derived from the index URL.
    #[error("index URL cannot have a project path appended: {url}")]
    InvalidIndexUrl {
        /// The offending index URL.
        url: String,
    },
}

/// Build the project page URL: the index URL, the escaped name, then `/`.
///
/// # Errors
///
/// Returns [`IndexError::InvalidIndexUrl`] when the index URL cannot carry
/// path segments (for example a `data:` URL).
///
/// # Examples
///
/// ```
/// use pypi_multidl::resolver::project_url;
/// use url::Url;
///
/// let index = Url::parse("https://pypi.org/simple/").expect("valid URL");
/// let url = project_url(&index, "foo-bar").expect("project URL");
/// assert_eq!(url.as_str(), "https://pypi.org/simple/foo-bar/");
/// ```
pub fn project_url(index_url: &Url, project_name: &str) -> Result<Url, IndexError> {
    let mut url = index_url.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| IndexError::InvalidIndexUrl {
                url: index_url.to_string(),
            })?;
        segments.pop_if_empty().push(project_name).push("");
    }
    Ok(url)
}

/// Fetch and parse one project page.
///
/// # Errors
///
/// Returns an error if the request fails or the body is not a listing.
pub fn fetch_listing<T>(transport: &T, url: &Url) -> Result<ProjectListing, IndexError>
where
    T: Transport + ?Sized,
{
    let body = transport.fetch_json(url.as_str())?;
    parse_listing(&body).map_err(|source| IndexError::InvalidResponse {
        url: url.to_string(),
        source,
    })
}

/// Resolve one requirement into its selected downloads, in listing order.
///
/// # Errors
///
/// Returns an error if the project page cannot be fetched or parsed.
pub fn resolve_requirement<T>(
    requirement: &Requirement,
    index_url: &Url,
    transport: &T,
) -> Result<Vec<Download>, IndexError>
where
    T: Transport + ?Sized,
{
    let url = project_url(index_url, requirement.name())?;
    debug!("resolving {requirement} from {url}");
    let listing = fetch_listing(transport, &url)?;
    let context = SelectionContext {
        project_name: requirement.name(),
        specifier: requirement.specifier(),
        project_url: &url,
    };
    let downloads: Vec<Download> = select(&listing, context).collect();
    debug!(
        "{} of {} files selected for {}",
        downloads.len(),
        listing.files.len(),
        requirement.name()
    );
    Ok(downloads)
}

/// Lazily resolve every requirement in order.
///
/// The returned iterator yields at most one error, after which it is
/// exhausted.
pub fn resolve<'a, T>(
    requirements: &'a [Requirement],
    index_url: &'a Url,
    transport: &'a T,
) -> Downloads<'a, T>
where
    T: Transport + ?Sized,
{
    Downloads {
        requirements: requirements.iter(),
        index_url,
        transport,
        pending: Vec::new().into_iter(),
        failed: false,
    }
}

/// Iterator returned by [`resolve`].
pub struct Downloads<'a, T: ?Sized> {
    requirements: std::slice::Iter<'a, Requirement>,
    index_url: &'a Url,
    transport: &'a T,
    pending: std::vec::IntoIter<Download>,
    failed: bool,
}

impl<T> Iterator for Downloads<'_, T>
where
    T: Transport + ?Sized,
{
    type Item = Result<Download, IndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(download) = self.pending.next() {
                return Some(Ok(download));
            }
            let requirement = self.requirements.next()?;
            match resolve_requirement(requirement, self.index_url, self.transport) {
                Ok(downloads) => self.pending = downloads.into_iter(),
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

impl<T> FusedIterator for Downloads<'_, T> where T: Transport + ?Sized {}
