//! rss CLI - query the REDCap mirror store
//!
//! Usage:
//!   rss init
//!   rss filter <spec.json>
//!   rss report list
//!   rss report show <uuid>
//!   rss report create <report.json>
//!   rss report update <uuid> <report.json>
//!   rss report delete <uuid>
//!   rss report render <uuid> --category events [--page 2] [--per-page 50]
//!
//! Examples:
//!   rss --database ./mirror.db filter adults.json
//!   rss report render 1f0c... --category instruments --page 3

use clap::{Parser, Subcommand, ValueEnum};
use rss::config::Settings;
use rss::model::{Category, FilterSpec, ReportDraft};
use rss::pagination::PageParams;
use rss::querybuilder::filter;
use rss::report::render_report;
use rss::store::Store;
use rss::QueryError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Exit code for reports that need a field calculator the CLI cannot supply.
const EXIT_NOT_IMPLEMENTED: u8 = 2;

#[derive(Parser)]
#[command(name = "rss")]
#[command(about = "rss - filtered, paginated reports over a REDCap mirror")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to RSS_CONFIG, ./rss.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite store, overriding the configured path
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the store tables
    Init,

    /// Print the record ids matching a filter document
    Filter {
        /// Path to the filter JSON
        file: PathBuf,
    },

    /// Manage and render saved reports
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand)]
enum ReportCommand {
    /// List saved reports
    List,

    /// Show one report
    Show { uuid: Uuid },

    /// Create a report from a JSON definition
    Create { file: PathBuf },

    /// Replace a report's definition
    Update { uuid: Uuid, file: PathBuf },

    /// Delete a report
    Delete { uuid: Uuid },

    /// Render one page of a report
    Render {
        uuid: Uuid,

        /// Row category to render
        #[arg(short, long, default_value = "events")]
        category: CategoryArg,

        #[arg(long, default_value_t = 1)]
        page: u64,

        /// Page size (defaults to the configured default)
        #[arg(long)]
        per_page: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Events,
    Instruments,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Events => Category::Event,
            CategoryArg::Instruments => Category::Instrument,
        }
    }
}

/// Any failure the CLI reports.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Settings(#[from] rss::config::SettingsError),

    #[error("Error reading file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&settings.logging.filter);

    match run(cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Query(e)) if e.is_not_implemented() => {
            error!("{}", e);
            ExitCode::from(EXIT_NOT_IMPLEMENTED)
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays JSON.
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli, settings: &Settings) -> Result<(), CliError> {
    let path = match cli.database {
        Some(path) => path,
        None => settings.database.resolved_path()?,
    };
    let store = Store::open(&path)?;

    match cli.command {
        Commands::Init => {
            println!("Initialized store at {}", path.display());
            Ok(())
        }
        Commands::Filter { file } => {
            let spec: FilterSpec = FilterSpec::from_json(&read_json(&file)?)?;
            let records = filter(&store, &spec)?;
            print_json(&records)
        }
        Commands::Report(command) => cmd_report(&store, settings, command),
    }
}

fn cmd_report(store: &Store, settings: &Settings, command: ReportCommand) -> Result<(), CliError> {
    match command {
        ReportCommand::List => print_json(&store.list_reports()?),
        ReportCommand::Show { uuid } => print_json(&store.get_report(&uuid)?),
        ReportCommand::Create { file } => {
            let draft = read_draft(&file)?;
            print_json(&store.create_report(draft)?)
        }
        ReportCommand::Update { uuid, file } => {
            let draft = read_draft(&file)?;
            print_json(&store.modify_report(&uuid, draft)?)
        }
        ReportCommand::Delete { uuid } => print_json(&store.delete_report(&uuid)?),
        ReportCommand::Render {
            uuid,
            category,
            page,
            per_page,
        } => {
            let per_page = per_page.unwrap_or(settings.pagination.default_per_page);
            let params = PageParams::new(page, per_page)?;

            let category: Category = category.into();
            let collection = format!("{}s", category);
            let id = uuid.to_string();
            let mut request_url = settings.pagination.resolved_base_url()?;
            request_url
                .path_segments_mut()
                .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
                .pop_if_empty()
                .extend(["reports", collection.as_str(), id.as_str()]);
            request_url
                .query_pairs_mut()
                .append_pair("page", &page.to_string())
                .append_pair("per_page", &per_page.to_string());

            // No field calculator is wired into the CLI
            let rendered = render_report(store, &uuid, category, None, &params, &request_url)?;
            print_json(&rendered)
        }
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value, CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_draft(path: &Path) -> Result<ReportDraft, CliError> {
    serde_json::from_value(read_json(path)?).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(QueryError::from)?;
    println!("{}", text);
    Ok(())
}
