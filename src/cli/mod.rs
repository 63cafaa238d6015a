//! Command-line parsing for the EPL stats pipeline.
//!
//! Parsing stays here; dispatch lives in `app`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "epl",
    version,
    about = "Fetch, validate and load Premier League standings and leaderboards"
)]
pub struct Cli {
    /// Log level used when RUST_LOG is not set (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Log file path (overrides PIPELINE_LOG_FILE).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch, validate and load all three datasets.
    Run(RunArgs),
    /// Fetch and validate only; the warehouse is not touched.
    Check(RunArgs),
    /// Print the season a date belongs to.
    Season(SeasonArgs),
}

#[derive(Debug, Args, Clone, Default)]
pub struct RunArgs {
    /// Season start year, e.g. 2025 for 2025/26. Overrides --date.
    #[arg(long)]
    pub season: Option<i32>,

    /// Resolve the season for this date (YYYY-MM-DD) instead of today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct SeasonArgs {
    /// Date to resolve (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_season() {
        let cli = Cli::parse_from(["epl", "run", "--season", "2024"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.season, Some(2024));
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["epl", "check", "--log-level", "debug", "--date", "2025-09-01"]);
        assert_eq!(cli.log_level, "debug");
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2025, 9, 1));
    }

    #[test]
    fn rejects_bad_date() {
        assert!(Cli::try_parse_from(["epl", "season", "--date", "01/09/2025"]).is_err());
    }
}
