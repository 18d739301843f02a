//! Requirement parsing and requirements-file collection.
//!
//! Requirements use PEP 508 syntax. Only the project name and the version
//! constraint matter here: extras and environment markers are accepted and
//! ignored, and direct-URL requirements are rejected because there is no
//! index listing to select artefacts from.

use camino::{Utf8Path, Utf8PathBuf};
use pep440_rs::{VersionSpecifier, VersionSpecifiers};
use pep508_rs::VersionOrUrl;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while collecting requirements.
#[derive(Debug, Error)]
pub enum RequirementError {
    /// The requirement text is not valid PEP 508.
    #[error("invalid requirement `{input}`: {reason}")]
    Invalid {
        /// The offending requirement text.
        input: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The requirement points at a URL instead of a version range.
    #[error("direct URL requirements are not supported: {name} @ {url}")]
    DirectUrl {
        /// The requested project.
        name: String,
        /// The URL given in place of a version constraint.
        url: String,
    },

    /// A requirements file could not be read.
    #[error("failed to read requirements file {path}: {source}")]
    ReadFile {
        /// The file that failed to open or read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// A project name paired with the versions it accepts.
///
/// # Examples
///
/// ```
/// use pypi_multidl::requirement::Requirement;
///
/// let requirement = Requirement::parse("Foo_Bar>=1.0,<2").expect("valid requirement");
/// assert_eq!(requirement.name(), "foo-bar");
/// assert_eq!(requirement.specifier().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    name: String,
    specifier: VersionSpecifiers,
}

impl Requirement {
    /// Parse one requirement.
    ///
    /// # Errors
    ///
    /// Returns [`RequirementError::Invalid`] for malformed syntax and
    /// [`RequirementError::DirectUrl`] for `name @ url` requirements.
    pub fn parse(input: &str) -> Result<Self, RequirementError> {
        let trimmed = input.trim();
        let parsed: pep508_rs::Requirement =
            trimmed
                .parse()
                .map_err(|err: pep508_rs::Pep508Error| RequirementError::Invalid {
                    input: trimmed.to_owned(),
                    reason: err.message.to_string(),
                })?;

        let name = parsed.name.to_string();
        let specifier = match parsed.version_or_url {
            Some(VersionOrUrl::VersionSpecifier(specifier)) => specifier,
            Some(VersionOrUrl::Url(url)) => {
                return Err(RequirementError::DirectUrl {
                    name,
                    url: url.to_string(),
                });
            }
            None => std::iter::empty::<VersionSpecifier>().collect(),
        };
        Ok(Self { name, specifier })
    }

    /// Return the normalised project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the version constraint; empty when any version is accepted.
    #[must_use]
    pub const fn specifier(&self) -> &VersionSpecifiers {
        &self.specifier
    }
}

impl FromStr for Requirement {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.specifier)
    }
}

/// Parse the contents of a requirements file.
///
/// Lines are trimmed; blank lines and lines starting with `#` are skipped.
///
/// # Errors
///
/// Returns the first line that fails to parse.
pub fn parse_requirement_lines(contents: &str) -> Result<Vec<Requirement>, RequirementError> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(Requirement::parse)
        .collect()
}

/// Read and parse a requirements file.
///
/// # Errors
///
/// Returns [`RequirementError::ReadFile`] if the file cannot be read, or a
/// parse error for its first malformed line.
pub fn read_requirements_file(path: &Utf8Path) -> Result<Vec<Requirement>, RequirementError> {
    let contents = std::fs::read_to_string(path).map_err(|source| RequirementError::ReadFile {
        path: path.to_owned(),
        source,
    })?;
    parse_requirement_lines(&contents)
}

/// Gather every requirement for a run.
///
/// File requirements come first, in file then line order, followed by the
/// inline requirements in the order given.
///
/// # Errors
///
/// Returns the first read or parse failure; nothing is partially returned.
pub fn collect_requirements(
    files: &[Utf8PathBuf],
    inline: &[String],
) -> Result<Vec<Requirement>, RequirementError> {
    let mut requirements = Vec::new();
    for path in files {
        requirements.extend(read_requirements_file(path)?);
    }
    for input in inline {
        requirements.push(Requirement::parse(input)?);
    }
    Ok(requirements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn names(requirements: &[Requirement]) -> Vec<&str> {
        requirements.iter().map(Requirement::name).collect()
    }

    #[rstest]
    #[case::pinned("foo==1.2.3", "foo", "==1.2.3")]
    #[case::range("foo>=1.0,<2.0", "foo", ">=1.0, <2.0")]
    #[case::bare("foo", "foo", "")]
    #[case::normalised_name("Foo.Bar_Baz~=1.4", "foo-bar-baz", "~=1.4")]
    #[case::extras_ignored("foo[cli]>=2", "foo", ">=2")]
    #[case::marker_ignored("foo==1.0; python_version >= '3.8'", "foo", "==1.0")]
    #[case::surrounding_whitespace("  foo!=1.1  ", "foo", "!=1.1")]
    fn parses_name_and_specifier(
        #[case] input: &str,
        #[case] name: &str,
        #[case] specifier: &str,
    ) {
        let requirement = Requirement::parse(input).expect("valid requirement");
        assert_eq!(requirement.name(), name);
        let expected: VersionSpecifiers = specifier.parse().expect("valid specifier");
        assert_eq!(requirement.specifier(), &expected);
    }

    #[rstest]
    #[case::dangling_operator("foo==")]
    #[case::bad_operator("foo=>1.0")]
    #[case::empty("")]
    #[case::bad_name("-foo==1.0")]
    fn rejects_malformed_requirements(#[case] input: &str) {
        let err = Requirement::parse(input).expect_err("should fail");
        assert!(matches!(err, RequirementError::Invalid { .. }), "{err}");
    }

    #[test]
    fn rejects_direct_url_requirements() {
        let err = Requirement::parse("foo @ https://files.example/foo-1.0.tar.gz")
            .expect_err("should fail");
        assert!(matches!(err, RequirementError::DirectUrl { ref name, .. } if name == "foo"));
    }

    #[test]
    fn requirement_lines_skip_blanks_and_comments() {
        let contents = "# pinned set\n\nfoo==1.0\n   \n  # indented comment\nbar>=2\n";
        let requirements = parse_requirement_lines(contents).expect("valid file");
        assert_eq!(names(&requirements), ["foo", "bar"]);
    }

    #[test]
    fn requirement_lines_report_the_bad_line() {
        let err = parse_requirement_lines("foo==1.0\nbar==\n").expect_err("should fail");
        assert!(err.to_string().contains("bar=="), "{err}");
    }

    #[test]
    fn file_requirements_precede_inline_ones() {
        let mut first = NamedTempFile::new().expect("temp file");
        writeln!(first, "alpha==1.0\nbeta").expect("write");
        let mut second = NamedTempFile::new().expect("temp file");
        writeln!(second, "gamma<3").expect("write");
        let files = [first.path(), second.path()]
            .into_iter()
            .map(|path| Utf8PathBuf::from_path_buf(path.to_path_buf()).expect("utf-8 path"))
            .collect::<Vec<_>>();

        let requirements =
            collect_requirements(&files, &["delta".to_owned(), "epsilon>1".to_owned()])
                .expect("valid requirements");

        assert_eq!(
            names(&requirements),
            ["alpha", "beta", "gamma", "delta", "epsilon"]
        );
    }

    #[test]
    fn missing_requirements_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("missing.txt")).expect("utf-8 path");
        let err = collect_requirements(&[path.clone()], &[]).expect_err("should fail");
        assert!(matches!(err, RequirementError::ReadFile { path: ref p, .. } if *p == path));
    }
}
