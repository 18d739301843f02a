//! Package index URL discovery.
//!
//! The index comes from the command line when given. Otherwise the ambient
//! pip configuration is consulted through `pip config get global.index-url`,
//! and PyPI is used when pip has nothing configured or cannot be run.

use log::debug;
use std::process::{Command, Output};
use thiserror::Error;
use url::Url;

/// The public PyPI simple index.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/simple/";

/// Interpreter used to query pip's configuration.
#[cfg(windows)]
const PYTHON: &str = "python";
#[cfg(not(windows))]
const PYTHON: &str = "python3";

const PIP_CONFIG_ARGS: [&str; 5] = ["-m", "pip", "config", "get", "global.index-url"];

/// Errors raised while settling on an index URL.
#[derive(Debug, Error)]
pub enum IndexUrlError {
    /// The URL does not parse.
    #[error("invalid index URL {url}: {source}")]
    Invalid {
        /// The rejected URL, after normalisation.
        url: String,
        /// Parse failure.
        source: url::ParseError,
    },

    /// The URL parses but cannot be fetched over HTTP.
    #[error("unsupported index URL scheme `{scheme}` in {url}; expected http or https")]
    UnsupportedScheme {
        /// The rejected URL.
        url: String,
        /// Its scheme.
        scheme: String,
    },
}

/// Runs the external programs consulted for configuration.
pub trait CommandExecutor {
    /// Run `cmd` with `args` to completion, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the program cannot be spawned or waited on.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pypi_multidl::index_url::{CommandExecutor, SystemCommandExecutor};
    ///
    /// let executor = SystemCommandExecutor;
    /// let output = executor.run("python3", &["--version"])?;
    /// assert!(output.status.success());
    /// # Ok::<(), std::io::Error>(())
    /// ```
    fn run(&self, cmd: &str, args: &[&str]) -> std::io::Result<Output>;
}

/// Spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> std::io::Result<Output> {
        Command::new(cmd).args(args).output()
    }
}

/// Ask pip for its configured index URL.
///
/// Returns `None` when pip cannot be run, exits unsuccessfully (pip exits
/// non-zero when the key is unset), or prints nothing.
pub fn pip_configured_index_url(executor: &dyn CommandExecutor) -> Option<String> {
    let output = match executor.run(PYTHON, &PIP_CONFIG_ARGS) {
        Ok(output) => output,
        Err(err) => {
            debug!("could not run {PYTHON} to query pip config: {err}");
            return None;
        }
    };
    if !output.status.success() {
        debug!("pip config has no global.index-url ({})", output.status);
        return None;
    }
    let configured = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    if configured.is_empty() {
        return None;
    }
    debug!("using index URL from pip config: {configured}");
    Some(configured)
}

/// Parse an index URL, ensuring it ends with `/`.
///
/// # Errors
///
/// Returns an error for malformed URLs and for schemes other than HTTP(S).
///
/// # Examples
///
/// ```
/// use pypi_multidl::index_url::normalise_index_url;
///
/// let url = normalise_index_url("https://mirror.example/pypi/simple").expect("valid URL");
/// assert_eq!(url.as_str(), "https://mirror.example/pypi/simple/");
/// ```
pub fn normalise_index_url(raw: &str) -> Result<Url, IndexUrlError> {
    let mut candidate = raw.trim().to_owned();
    if !candidate.ends_with('/') {
        candidate.push('/');
    }
    let url = Url::parse(&candidate).map_err(|source| IndexUrlError::Invalid {
        url: candidate.clone(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(IndexUrlError::UnsupportedScheme {
            scheme: other.to_owned(),
            url: candidate,
        }),
    }
}

/// Settle on the index URL for this run.
///
/// Precedence: `flag`, then pip configuration, then [`DEFAULT_INDEX_URL`].
/// pip is not consulted when `flag` is given.
///
/// # Errors
///
/// Returns an error if the chosen URL is invalid.
pub fn resolve_index_url(
    flag: Option<&str>,
    executor: &dyn CommandExecutor,
) -> Result<Url, IndexUrlError> {
    let raw = match flag {
        Some(url) => url.to_owned(),
        None => pip_configured_index_url(executor).unwrap_or_else(|| DEFAULT_INDEX_URL.to_owned()),
    };
    normalise_index_url(&raw)
}
