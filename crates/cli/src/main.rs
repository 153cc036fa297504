//! orggraph CLI entry point
//!
//! Opens a fresh embedded store, generates the synthetic organisation, runs
//! the five sales queries and prints the report to stdout. Setup and generation
//! failures exit non-zero; a failing query is reported inline.

mod cli;
mod logging;

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use orggraph_core::{generate, render_report, run, AnalysisConfig, GraphStore, RandomFacts};
use tracing::{error, info, warn};

use crate::cli::Cli;

/// Exit status after an interrupt, as shells report SIGINT
const INTERRUPTED: i32 = 130;

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        eprintln!("failed to initialize logging: {:#}", anyhow::Error::from(err));
        return ExitCode::FAILURE;
    }

    exit_code(&try_main(Cli::parse(), register_shutdown_hook))
}

/// Setup and generation errors fail the process; query errors never get here
fn exit_code(result: &Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "run failed");
            ExitCode::FAILURE
        }
    }
}

fn try_main<H>(cli: Cli, on_open: H) -> Result<()>
where
    H: FnOnce(&Arc<GraphStore>) -> Result<()>,
{
    let config = cli.into_config().context("failed to load configuration")?;
    let store = Arc::new(
        GraphStore::open(&config.storage_dir).context("failed to open graph store")?,
    );
    on_open(&store)?;

    let outcome = analyse(&store, &config);
    let closed = store.shutdown().context("failed to close graph store");
    outcome?;
    closed
}

fn analyse(store: &GraphStore, config: &AnalysisConfig) -> Result<()> {
    let mut facts = match config.seed {
        Some(seed) => RandomFacts::seeded(seed),
        None => RandomFacts::from_entropy(),
    };
    generate(store, &config.generator, &mut facts).context("failed to generate dataset")?;

    let report = run(store);
    if report.failures() > 0 {
        warn!(failed = report.failures(), "some queries failed");
    }

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_report(&report, &mut writer).context("failed to render report")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

/// Close the store on Ctrl-C / SIGTERM, then exit
///
/// `GraphStore::shutdown` waits for an in-flight commit and only runs once, so
/// racing with the normal shutdown path is harmless.
fn register_shutdown_hook(store: &Arc<GraphStore>) -> Result<()> {
    let store = Arc::clone(store);
    ctrlc::set_handler(move || {
        info!("interrupted, closing graph store");
        if let Err(err) = store.shutdown() {
            error!(error = %err, "graph store did not shut down cleanly");
        }
        std::process::exit(INTERRUPTED);
    })
    .context("failed to install shutdown hook")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn no_hook(_: &Arc<GraphStore>) -> Result<()> {
        Ok(())
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("orggraph").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_unusable_storage_dir_fails_the_run() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("afile");
        fs::write(&file, b"").unwrap();
        let dir = file.join("db");

        let result = try_main(cli(&["--storage-dir", dir.to_str().unwrap()]), no_hook);

        let err = result.as_ref().unwrap_err();
        assert!(err.downcast_ref::<orggraph_core::StoreError>().is_some());
        assert_eq!(exit_code(&result), ExitCode::FAILURE);
    }

    #[test]
    fn test_invalid_generator_config_fails_the_run() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("db");

        let result = try_main(
            cli(&["--storage-dir", dir.to_str().unwrap(), "--designers", "0"]),
            no_hook,
        );

        let err = result.as_ref().unwrap_err();
        assert!(err.downcast_ref::<orggraph_core::GenerationError>().is_some());
        assert_eq!(exit_code(&result), ExitCode::FAILURE);
    }

    #[test]
    fn test_empty_dataset_still_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("db");

        let result = try_main(
            cli(&[
                "--storage-dir",
                dir.to_str().unwrap(),
                "--products",
                "0",
                "--managers",
                "0",
            ]),
            no_hook,
        );

        assert!(result.is_ok());
        assert_eq!(exit_code(&result), ExitCode::SUCCESS);
        assert!(dir.join(orggraph_core::store::SNAPSHOT_FILE).exists());
    }
}
