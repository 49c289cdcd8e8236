//! deal-etl CLI
//!
//! Command-line interface for loading storefront deal, catalog and review
//! exports into the key-value store.

mod commands;
mod error;
mod progress;

use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use deal_etl_import::{PipelineSettings, load_settings};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

pub(crate) use error::CliError;

/// Normalize storefront exports and load them into the deal store.
#[derive(Parser)]
#[command(name = "deal-etl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Store database path (overrides settings.toml and DEAL_ETL_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, normalize, merge and load the three exports
    Run {
        /// Deal export (JSON array or JSON lines)
        #[arg(long)]
        deal: Option<PathBuf>,

        /// Catalog link export
        #[arg(long)]
        link: Option<PathBuf>,

        /// Review export
        #[arg(long)]
        reviews: Option<PathBuf>,

        /// Drop deals whose link has no app id instead of failing
        #[arg(long)]
        skip_malformed_links: bool,

        /// Transform only; print the summary without touching the store
        #[arg(long)]
        dry_run: bool,

        /// Reference date for offer countdowns (YYYY-MM-DD, default: today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Create the deal, game and review tables if missing
    CreateTables,

    /// Show item counts per table and recent runs
    Stats {
        /// Number of recent runs to list
        #[arg(long, default_value_t = 5)]
        runs: u32,
    },

    /// Look up stored items by key
    Get {
        /// Table name
        table: String,

        /// Partition key value (the app id)
        app_id: String,

        /// Sort key value; omit to list the whole partition
        sort_key: Option<String>,
    },

    /// Inspect pipeline settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings as TOML
    Show,
    /// Print the settings file location
    Path,
}

fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format(|buf, record| match record.level() {
            log::Level::Info => writeln!(buf, "{}", record.args()),
            level => writeln!(buf, "{}: {}", level, record.args()),
        })
        .init();
}

/// Print an empty line through the logger.
pub(crate) fn log_blank() {
    log::info!("");
}

/// Load settings from file and environment, then apply the `--db` override.
fn resolve_settings(db: Option<PathBuf>) -> Result<PipelineSettings, CliError> {
    let mut settings = load_settings()?;
    if let Some(db) = db {
        settings.store.database_path = db;
    }
    Ok(settings)
}

fn dispatch(cli: Cli) -> Result<(), CliError> {
    let mut settings = resolve_settings(cli.db)?;
    match cli.command {
        Commands::Run {
            deal,
            link,
            reviews,
            skip_malformed_links,
            dry_run,
            today,
        } => {
            if let Some(path) = deal {
                settings.inputs.deal = path;
            }
            if let Some(path) = link {
                settings.inputs.link = path;
            }
            if let Some(path) = reviews {
                settings.inputs.review = path;
            }
            settings.skip_malformed_links |= skip_malformed_links;
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            commands::run::run_pipeline(&settings, today, dry_run, cli.quiet)
        }
        Commands::CreateTables => commands::run::run_create_tables(&settings),
        Commands::Stats { runs } => commands::stats::run_stats(&settings, runs),
        Commands::Get {
            table,
            app_id,
            sort_key,
        } => commands::stats::run_get(&settings, &table, &app_id, sort_key.as_deref()),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&settings),
            ConfigAction::Path => commands::config::run_config_path(),
        },
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    if let Err(e) = dispatch(cli) {
        log::error!("{}", e.if_supports_color(Stderr, |t| t.red()));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "deal-etl",
            "run",
            "--deal",
            "d.json",
            "--today",
            "2024-01-10",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                deal,
                today,
                dry_run,
                skip_malformed_links,
                ..
            } => {
                assert_eq!(deal, Some(PathBuf::from("d.json")));
                assert_eq!(today, NaiveDate::from_ymd_opt(2024, 1, 10));
                assert!(dry_run);
                assert!(!skip_malformed_links);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn global_db_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["deal-etl", "stats", "--db", "x.db"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
    }
}
