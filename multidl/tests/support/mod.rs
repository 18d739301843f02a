//! Test support utilities for end-to-end CLI tests.
//!
//! Provides a local package index served by `wiremock` and a guard that skips
//! socket-bound scenarios when the environment cannot bind to localhost.

use pypi_multidl::test_utils::{FileEntry, project_page_json, sha256_hex};
use std::net::TcpListener;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Set to `1` to fail instead of skip when localhost sockets are unavailable.
pub const REQUIRE_SOCKET_TESTS_ENV: &str = "PYPI_MULTIDL_REQUIRE_SOCKET_TESTS";

/// Returns true when socket-bound tests must not be skipped.
pub fn socket_tests_required() -> bool {
    std::env::var(REQUIRE_SOCKET_TESTS_ENV)
        .is_ok_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Returns true when a localhost listener cannot be bound.
///
/// # Panics
///
/// Panics instead of returning true when [`REQUIRE_SOCKET_TESTS_ENV`] is set.
pub fn should_skip_socket_bound_test() -> bool {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return false;
    }
    let message = "cannot bind a localhost socket; the fixture index cannot run here";
    assert!(
        !socket_tests_required(),
        "{message}. Unset {REQUIRE_SOCKET_TESTS_ENV} to allow skipping."
    );
    eprintln!("{message}. Skipping. Set {REQUIRE_SOCKET_TESTS_ENV}=1 to fail instead.");
    true
}

/// A package index on localhost serving project pages and artefacts.
///
/// The mock server runs on its own thread, so the blocking CLI binary can
/// query it while the owning test is parked in `Command::output`.
pub struct FixtureIndex {
    server: MockServer,
    runtime: Runtime,
}

impl FixtureIndex {
    /// Starts an empty index, or returns `None` when sockets are unavailable.
    pub fn start_or_skip() -> Option<Self> {
        if should_skip_socket_bound_test() {
            return None;
        }
        let runtime = Runtime::new().expect("tokio runtime");
        let server = runtime.block_on(MockServer::start());
        Some(Self { server, runtime })
    }

    /// The simple index root, with a trailing slash.
    pub fn index_url(&self) -> String {
        format!("{}/simple/", self.server.uri())
    }

    /// Publishes `files` (filename, body) for `project`, each with a SHA-256
    /// digest and a relative URL under `/files/`.
    pub fn publish(&self, project: &str, files: &[(&str, &[u8])]) {
        let entries = files
            .iter()
            .map(|(filename, body)| {
                FileEntry::new(filename, &format!("../../files/{filename}"))
                    .with_hash("sha256", &sha256_hex(body))
            })
            .collect::<Vec<_>>();
        self.mount(
            format!("/simple/{project}/"),
            ResponseTemplate::new(200)
                .set_body_string(project_page_json(&entries))
                .insert_header("Content-Type", "application/vnd.pypi.simple.v1+json"),
        );
        for (filename, body) in files {
            self.mount(
                format!("/files/{filename}"),
                ResponseTemplate::new(200).set_body_bytes(body.to_vec()),
            );
        }
    }

    fn mount(&self, route: String, response: ResponseTemplate) {
        self.runtime.block_on(
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(response)
                .mount(&self.server),
        );
    }
}
