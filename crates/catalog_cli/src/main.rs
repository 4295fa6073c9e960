//! Command-line front end for catalog change queries.
//!
//! # Responsibility
//! - Parse query arguments and run them through `ChangeService`.
//! - Print reports as JSON on stdout and failures on stderr.
//!
//! Without a subcommand the binary prints the core ping and version.

use catalog_core::db::open_db;
use catalog_core::{
    init_logging, CatalogConfig, ChangeService, EntityKind, LookupRequest,
    SqliteCatalogRepository,
};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "catalog_cli")]
#[command(about = "Registry catalog change detection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report changed categories of one organization
    Organization {
        guid: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Report changed categories of one company
    Company {
        business_id: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Report changed categories of one X-Road member
    Member {
        x_road_instance: String,
        member_class: String,
        member_code: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// List every root of a kind that changed inside the window
    List {
        #[arg(value_enum)]
        kind: RootKind,
        #[command(flatten)]
        query: QueryArgs,
    },
}

#[derive(Debug, Args)]
struct QueryArgs {
    /// JSON configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Window start, exclusive (`YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD`)
    #[arg(value_parser = parse_instant)]
    since: NaiveDateTime,

    /// Window end, inclusive; defaults to now
    #[arg(value_parser = parse_instant)]
    until: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RootKind {
    Organization,
    Company,
    Member,
}

impl From<RootKind> for EntityKind {
    fn from(value: RootKind) -> Self {
        match value {
            RootKind::Organization => EntityKind::Organization,
            RootKind::Company => EntityKind::Company,
            RootKind::Member => EntityKind::Member,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("catalog_core ping={}", catalog_core::ping());
        println!("catalog_core version={}", catalog_core::core_version());
        return ExitCode::SUCCESS;
    };

    match execute(command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Command) -> Result<String, Box<dyn Error>> {
    let (request, query) = match command {
        Command::Organization { guid, query } => {
            (LookupRequest::organization(Some(guid.as_str())), query)
        }
        Command::Company { business_id, query } => {
            (LookupRequest::company(Some(business_id.as_str())), query)
        }
        Command::Member {
            x_road_instance,
            member_class,
            member_code,
            query,
        } => (
            LookupRequest::member(
                Some(x_road_instance.as_str()),
                Some(member_class.as_str()),
                Some(member_code.as_str()),
            ),
            query,
        ),
        Command::List { kind, query } => return execute_list(kind.into(), query),
    };

    let config = load_config(&query)?;
    let conn = open_db(&config.database_path)?;
    let service = ChangeService::new(SqliteCatalogRepository::try_new(&conn)?)?;

    let report = service.detect_change(request, query.since, query.until)?;
    info!("event=cli_query module=cli status=ok command=detect");
    Ok(serde_json::to_string_pretty(&report)?)
}

fn execute_list(kind: EntityKind, query: QueryArgs) -> Result<String, Box<dyn Error>> {
    let config = load_config(&query)?;
    let conn = open_db(&config.database_path)?;
    let service = ChangeService::new(SqliteCatalogRepository::try_new(&conn)?)?;

    let changed = service.list_changed(kind, query.since, query.until)?;
    info!(
        "event=cli_query module=cli status=ok command=list roots={}",
        changed.len()
    );
    Ok(serde_json::to_string_pretty(&changed)?)
}

fn load_config(query: &QueryArgs) -> Result<CatalogConfig, Box<dyn Error>> {
    let config = CatalogConfig::load(&query.config)?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
    }
    Ok(config)
}

/// Accepts `YYYY-MM-DDTHH:MM:SS`, with optional fraction, or a bare date.
fn parse_instant(value: &str) -> Result<NaiveDateTime, String> {
    if let Ok(instant) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(instant);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("invalid timestamp `{value}`"))
}
