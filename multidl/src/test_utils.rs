//! Shared test utilities for the downloader crate.

use crate::artefact::hash::HashAlgorithm;
use crate::index_url::CommandExecutor;
use crate::transport::{Transport, TransportError};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io::{Cursor, Read};
use std::process::{ExitStatus, Output};

/// Builds an `ExitStatus` carrying `code`.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Builds an `ExitStatus` carrying `code`.
#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code.unsigned_abs())
}

/// Captured output of a command that exited with `code`.
pub fn command_output(code: i32, stdout: &str, stderr: &str) -> Output {
    Output {
        status: exit_status(code),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// One scripted command invocation and its canned result.
#[derive(Debug)]
pub struct ExpectedCall {
    /// Program name, such as `python3`.
    pub cmd: &'static str,
    /// Arguments the program must be given.
    pub args: Vec<&'static str>,
    /// What the invocation returns.
    pub result: std::io::Result<Output>,
}

/// A `CommandExecutor` that replays a script of expected calls in order.
///
/// Any call off the script panics, so tests also prove which commands were
/// not run.
#[derive(Debug)]
pub struct StubExecutor {
    script: RefCell<VecDeque<ExpectedCall>>,
}

impl StubExecutor {
    /// Creates an executor that expects exactly `script`, in order.
    pub fn new(script: Vec<ExpectedCall>) -> Self {
        Self {
            script: RefCell::new(script.into()),
        }
    }

    /// Asserts that every scripted call was made.
    ///
    /// # Panics
    ///
    /// Panics if part of the script is still pending.
    pub fn assert_finished(&self) {
        let pending = self.script.borrow();
        assert!(pending.is_empty(), "scripted calls not made: {pending:?}");
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> std::io::Result<Output> {
        let Some(call) = self.script.borrow_mut().pop_front() else {
            panic!("unscripted command: {cmd} {args:?}");
        };
        assert_eq!(cmd, call.cmd, "unexpected program");
        assert_eq!(args, call.args.as_slice(), "unexpected arguments to {cmd}");
        call.result
    }
}

/// An in-memory index and file host.
///
/// Serves canned project pages and artefact bodies by exact URL and records
/// every requested URL in order. Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct StubTransport {
    pages: HashMap<String, String>,
    files: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl StubTransport {
    /// Creates a transport that serves nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` as the project page at `url`.
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// Serve `bytes` as the artefact at `url`.
    #[must_use]
    pub fn with_file(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(url.into(), bytes.into());
        self
    }

    /// Returns every requested URL, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    fn record(&self, url: &str) {
        self.requests.borrow_mut().push(url.to_owned());
    }
}

impl Transport for StubTransport {
    fn fetch_json(&self, url: &str) -> Result<String, TransportError> {
        self.record(url);
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| TransportError::NotFound {
                url: url.to_owned(),
            })
    }

    fn open_stream(&self, url: &str) -> Result<Box<dyn Read>, TransportError> {
        self.record(url);
        match self.files.get(url) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            None => Err(TransportError::NotFound {
                url: url.to_owned(),
            }),
        }
    }
}

/// Computes the lowercase hex SHA-256 digest of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    HashAlgorithm::Sha256.hex_digest(data)
}

/// One `files` entry of a generated project page.
///
/// Rendered by hand so that hash keys keep their insertion order.
#[derive(Debug, Clone)]
pub struct FileEntry {
    filename: String,
    url: String,
    hashes: Vec<(String, String)>,
    yanked: Option<String>,
}

impl FileEntry {
    /// Creates an entry with no hashes that is not yanked.
    pub fn new(filename: &str, url: &str) -> Self {
        Self {
            filename: filename.to_owned(),
            url: url.to_owned(),
            hashes: Vec::new(),
            yanked: None,
        }
    }

    /// Appends an advertised digest.
    #[must_use]
    pub fn with_hash(mut self, algorithm: &str, digest: &str) -> Self {
        self.hashes.push((algorithm.to_owned(), digest.to_owned()));
        self
    }

    /// Marks the entry as yanked with a reason.
    #[must_use]
    pub fn yanked(mut self, reason: &str) -> Self {
        self.yanked = Some(json_string(reason));
        self
    }

    /// Renders the entry as a JSON object.
    pub fn to_json(&self) -> String {
        let hashes = self
            .hashes
            .iter()
            .map(|(algorithm, digest)| format!("{}:{}", json_string(algorithm), json_string(digest)))
            .collect::<Vec<_>>()
            .join(",");
        let yanked = self.yanked.as_deref().unwrap_or("false");
        format!(
            r#"{{"filename":{},"url":{},"hashes":{{{hashes}}},"yanked":{yanked}}}"#,
            json_string(&self.filename),
            json_string(&self.url),
        )
    }
}

/// Renders a PEP 691 project page listing `entries` in order.
pub fn project_page_json(entries: &[FileEntry]) -> String {
    let files = entries
        .iter()
        .map(FileEntry::to_json)
        .collect::<Vec<_>>()
        .join(",");
    format!(r#"{{"meta":{{"api-version":"1.1"}},"files":[{files}]}}"#)
}

fn json_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}
