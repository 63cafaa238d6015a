//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads `.env`
//! - sets up logging
//! - reads configuration and resolves the season
//! - runs the pipeline and prints the summary

use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};

use crate::app::pipeline::{PipelineRunner, RunStatus};
use crate::cli::{Cli, Command, RunArgs, SeasonArgs};
use crate::config::{ApiConfig, WarehouseConfig, log_file_from_env};
use crate::data::{self, ApiClient, FetchParams};
use crate::domain::Season;
use crate::error::{AppError, ConfigError, LoadError};
use crate::warehouse;

pub mod pipeline;

/// Entry point for the `epl` binary. The returned status decides the exit code.
pub fn run() -> Result<RunStatus, AppError> {
    // `epl` and `epl --season 2024` behave like `epl run ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    // A missing .env is fine; the environment may already be set.
    dotenvy::dotenv().ok();

    let log_file = cli.log_file.clone().unwrap_or_else(log_file_from_env);

    match cli.command {
        Command::Run(args) => handle_run(&args, Mode::Load, &cli.log_level, log_file),
        Command::Check(args) => handle_run(&args, Mode::CheckOnly, &cli.log_level, log_file),
        Command::Season(args) => {
            println!("{}", season_for_date(&args));
            Ok(RunStatus::AllSucceeded)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Load,
    CheckOnly,
}

fn handle_run(
    args: &RunArgs,
    mode: Mode,
    log_level: &str,
    log_file: PathBuf,
) -> Result<RunStatus, AppError> {
    let _guard = crate::logging::init(log_level, &log_file)?;

    let api = ApiConfig::from_env().map_err(config_failure)?;
    let warehouse_config = match mode {
        Mode::Load => Some(WarehouseConfig::from_env().map_err(config_failure)?),
        Mode::CheckOnly => None,
    };
    info!(
        base_url = %api.base_url,
        league = api.league_id,
        api_key = %api.key_hint(),
        driver = ?warehouse_config.as_ref().map(WarehouseConfig::driver),
        log_file = %log_file.display(),
        "Configuration loaded"
    );

    let season = resolve_season(args);
    let client = ApiClient::from_config(&api)?;
    let params = FetchParams {
        league: api.league_id,
        season,
    };
    let exported_at = Utc::now();
    let runner = PipelineRunner::new(&client, params, exported_at);

    let run = match warehouse_config {
        Some(config) => {
            let mut store = warehouse::open(&config).map_err(warehouse_failure)?;
            let run = runner.run(Some(store.as_mut()));
            if let Err(err) = store.close() {
                warn!(error = %err, "Failed to close warehouse connection");
            }
            run
        }
        None => runner.run(None),
    };

    println!("{}", crate::report::format_run_summary(&run));
    Ok(run.status())
}

/// Log a configuration problem before it aborts the run.
fn config_failure(err: ConfigError) -> AppError {
    error!(stage = "config", error = %err, "Configuration invalid; aborting run");
    err.into()
}

fn warehouse_failure(err: LoadError) -> AppError {
    error!(stage = "warehouse", error = %err, "Failed to open warehouse; aborting run");
    AppError::new(1, format!("Failed to open warehouse: {err}"))
}

fn resolve_season(args: &RunArgs) -> Season {
    match (args.season, args.date) {
        (Some(year), _) => Season(year),
        (None, Some(date)) => data::resolve(date),
        (None, None) => data::current(),
    }
}

fn season_for_date(args: &SeasonArgs) -> Season {
    args.date.map_or_else(data::current, data::resolve)
}

fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "check" | "season");
    if is_subcommand {
        return argv;
    }

    // A leading flag means "run with these flags".
    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;

    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs() {
        assert_eq!(rewrite_args(argv(&["epl"])), argv(&["epl", "run"]));
    }

    #[test]
    fn leading_flags_go_to_run() {
        assert_eq!(
            rewrite_args(argv(&["epl", "--season", "2024"])),
            argv(&["epl", "run", "--season", "2024"])
        );
    }

    #[test]
    fn subcommands_and_help_untouched() {
        assert_eq!(rewrite_args(argv(&["epl", "check"])), argv(&["epl", "check"]));
        assert_eq!(rewrite_args(argv(&["epl", "--help"])), argv(&["epl", "--help"]));
    }

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn startup_failures_are_logged_and_exit_with_one() {
        let logs = Captured::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let (config_err, warehouse_err) = tracing::subscriber::with_default(subscriber, || {
            let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
            (
                config_failure(ConfigError::Missing("API_FOOTBALL_KEY")),
                warehouse_failure(LoadError::Io(io)),
            )
        });

        assert_eq!(config_err.exit_code(), 1);
        assert!(config_err.to_string().contains("API_FOOTBALL_KEY"));
        assert_eq!(warehouse_err.exit_code(), 1);
        assert!(warehouse_err.to_string().starts_with("Failed to open warehouse"));

        let text = logs.text();
        assert!(text.contains("stage=\"config\""), "got: {text}");
        assert!(text.contains("API_FOOTBALL_KEY"), "got: {text}");
        assert!(text.contains("stage=\"warehouse\""), "got: {text}");
        assert!(text.contains("read-only"), "got: {text}");
    }

    #[test]
    fn explicit_season_beats_date() {
        let args = RunArgs {
            season: Some(2022),
            date: NaiveDate::from_ymd_opt(2025, 3, 1),
        };
        assert_eq!(resolve_season(&args), Season(2022));
    }

    #[test]
    fn date_feeds_resolver() {
        let args = RunArgs {
            season: None,
            date: NaiveDate::from_ymd_opt(2025, 3, 1),
        };
        assert_eq!(resolve_season(&args), Season(2024));
        let season = SeasonArgs {
            date: NaiveDate::from_ymd_opt(2025, 8, 1),
        };
        assert_eq!(season_for_date(&season), Season(2025));
    }
}
