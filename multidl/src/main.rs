//! pypi-multidl CLI entrypoint.
//!
//! This binary resolves requirements against a package index and downloads
//! every matching wheel and source distribution for offline installation.

use clap::Parser;
use pypi_multidl::cli::Cli;
use pypi_multidl::error::Result;
use pypi_multidl::index_url::{SystemCommandExecutor, resolve_index_url};
use pypi_multidl::output::write_stderr_line;
use pypi_multidl::pipeline::{RunOptions, run_downloads};
use pypi_multidl::requirement::collect_requirements;
use pypi_multidl::resolver::resolve;
use pypi_multidl::transport::HttpTransport;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    // Input errors surface before any network activity.
    let requirements = collect_requirements(&cli.requirement_files, &cli.requirements)?;
    let index_url = resolve_index_url(cli.index_url.as_deref(), &SystemCommandExecutor)?;

    let transport = HttpTransport::new(cli.timeout());
    let options = run_options(cli);
    run_downloads(
        resolve(&requirements, &index_url, &transport),
        &transport,
        &options,
        stdout,
        stderr,
    )?;
    Ok(())
}

fn run_options(cli: &Cli) -> RunOptions<'_> {
    RunOptions {
        dest_dir: &cli.dest_dir,
        dry_run: cli.dry_run,
        list_file: cli.list_file.as_deref(),
        quiet: cli.quiet,
    }
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use pypi_multidl::error::MultidlError;
    use pypi_multidl::requirement::RequirementError;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = MultidlError::from(RequirementError::Invalid {
            input: "foo==".to_owned(),
            reason: "missing version".to_owned(),
        });

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert_eq!(stderr_text.lines().count(), 1);
        assert!(stderr_text.contains("invalid requirement `foo==`"));
    }

    #[test]
    fn invalid_requirement_fails_before_network_access() {
        let cli = Cli {
            requirements: vec!["foo==".to_owned()],
            index_url: Some("http://127.0.0.1:9/simple/".to_owned()),
            ..Cli::default()
        };
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        let err = run(&cli, &mut stdout, &mut stderr).expect_err("invalid requirement");
        assert!(matches!(err, MultidlError::Requirement(_)));
        assert!(stdout.is_empty());
    }

    #[test]
    fn invalid_index_url_is_reported() {
        let cli = Cli {
            requirements: vec!["foo".to_owned()],
            index_url: Some("ftp://mirror.example/simple".to_owned()),
            ..Cli::default()
        };
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        let err = run(&cli, &mut stdout, &mut stderr).expect_err("bad scheme");
        assert!(matches!(err, MultidlError::IndexUrl(_)));
    }

    #[test]
    fn run_options_mirror_cli_flags() {
        let cli = Cli {
            dest_dir: Utf8PathBuf::from("wheelhouse"),
            list_file: Some(Utf8PathBuf::from("list.json")),
            dry_run: true,
            quiet: true,
            ..Cli::default()
        };
        let options = run_options(&cli);
        assert_eq!(options.dest_dir.as_str(), "wheelhouse");
        assert_eq!(options.list_file.map(|path| path.as_str()), Some("list.json"));
        assert!(options.dry_run);
        assert!(options.quiet);
    }
}
