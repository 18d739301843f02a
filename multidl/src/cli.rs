//! Command-line arguments for `pypi-multidl`.
//!
//! Requirements arrive positionally or through `-r` files; everything else
//! shapes where files go and how the run reports.

use camino::Utf8PathBuf;
use clap::Parser;
use std::time::Duration;

/// Download Python packages for later offline installation on many platforms.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "pypi-multidl")]
#[command(version, about)]
#[command(long_about = concat!(
    "Download Python packages for later offline installation on many platforms.\n\n",
    "Every wheel and source distribution matching each requirement is fetched ",
    "from the package index, for all platforms at once. Dependencies are not ",
    "followed: list every package you need. Files are verified against the ",
    "index's advertised digests when a supported algorithm is available.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Download every file of one release:\n",
    "    $ pypi-multidl foobar==1.2.3\n\n",
    "  Download a requirements file into a wheelhouse and record what was fetched:\n",
    "    $ pypi-multidl -r requirements.txt -d wheelhouse -l wheelhouse/list.json\n\n",
    "  Preview filenames without downloading:\n",
    "    $ pypi-multidl -n 'foobar>=1.0,<2'",
))]
pub struct Cli {
    /// Dependency requirement (eg. foobar==1.2.3).
    #[arg(value_name = "REQUIREMENT")]
    pub requirements: Vec<String>,

    /// File with requirements ("requirements.txt"); can be repeated.
    #[arg(short = 'r', long = "requirement", value_name = "FILE")]
    pub requirement_files: Vec<Utf8PathBuf>,

    /// Which directory to download files to.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub dest_dir: Utf8PathBuf,

    /// Path to an output JSON file listing all downloaded files.
    ///
    /// The file is an array of objects, where each object has a name,
    /// version, and filename attribute.
    #[arg(short, long, value_name = "FILE")]
    pub list_file: Option<Utf8PathBuf>,

    /// Which package index to use [default: pip config global.index-url, else PyPI].
    #[arg(short, long, value_name = "URL")]
    pub index_url: Option<String>,

    /// Don't download files, just list them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Per-request network timeout in seconds [default: none].
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Don't print the summary line; errors are still reported.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Returns the configured request timeout, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use pypi_multidl::cli::Cli;
    /// use std::time::Duration;
    ///
    /// let cli = Cli::parse_from(["pypi-multidl", "--timeout", "30"]);
    /// assert_eq!(cli.timeout(), Some(Duration::from_secs(30)));
    /// ```
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

impl Default for Cli {
    /// Matches `pypi-multidl` invoked with no arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use pypi_multidl::cli::Cli;
    ///
    /// let cli = Cli::default();
    /// assert_eq!(cli.dest_dir.as_str(), ".");
    /// assert!(cli.requirements.is_empty());
    /// assert!(!cli.dry_run);
    /// ```
    fn default() -> Self {
        Self {
            requirements: Vec::new(),
            requirement_files: Vec::new(),
            dest_dir: Utf8PathBuf::from("."),
            list_file: None,
            index_url: None,
            dry_run: false,
            timeout: None,
            quiet: false,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
