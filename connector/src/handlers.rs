use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use clap::parser::ValueSource;
use colored::Colorize;
use connector_core::{Database, LinkResolver, LinkSink, Resolution, StdoutSink, ingest};
use connector_fetch::client::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
use connector_fetch::{Client, RouterLocationData};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{Level, debug, error};
use url::Url;

pub const DEFAULT_DB_PATH: &str = "~/.config/connector/connector.db";

/// Install the stderr log subscriber. stdout is reserved for link output.
pub fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Expand a leading `~` in a database path
pub fn resolve_db_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Open (or create) the store, creating its parent directory if needed
pub fn open_database(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    Database::new(path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Load a router location payload from a local JSON file
pub fn load_payload_from_file(path: &Path) -> Result<RouterLocationData, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read payload file {}: {}", path.display(), e))?;

    RouterLocationData::from_json(&content)
        .map_err(|e| format!("Invalid payload in {}: {}", path.display(), e))
}

/// Fetch the payload from the API, showing a spinner unless quiet
pub async fn fetch_payload(
    url: &Url,
    retries: u32,
    timeout_secs: u64,
    quiet: bool,
) -> Result<RouterLocationData> {
    let client = Client::new(url.as_str())?
        .with_max_retries(retries)
        .with_timeout(timeout_secs);

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };
    spinner.set_message(format!("Fetching router location data from {}", url));

    let result = client.fetch().await;
    spinner.finish_and_clear();

    result.context("get router location data")
}

/// Store the payload, then resolve and report its location links
pub fn run_pipeline<K: LinkSink>(db: &Database, data: &RouterLocationData, sink: K) -> Resolution {
    ingest(db, data);
    LinkResolver::new(db, sink).resolve(&data.routers)
}

fn db_path_arg(args: &ArgMatches) -> PathBuf {
    let raw = args
        .get_one::<String>("db")
        .map(String::as_str)
        .unwrap_or(DEFAULT_DB_PATH);
    resolve_db_path(raw)
}

/// Whether `--url` was typed by the user rather than taken from the
/// environment or its default.
pub fn url_given_on_command_line(args: &ArgMatches) -> bool {
    args.value_source("url") == Some(ValueSource::CommandLine)
}

pub async fn handle_run(args: &ArgMatches) -> Result<()> {
    let quiet = args.get_flag("quiet");
    let persist = args.get_flag("persist-data");
    let db_path = db_path_arg(args);

    if args.contains_id("file") && url_given_on_command_line(args) {
        bail!("--url and --file cannot be used together");
    }

    let data = match args.get_one::<PathBuf>("file") {
        Some(file) => load_payload_from_file(file).map_err(anyhow::Error::msg)?,
        None => {
            let Some(url) = args.get_one::<Url>("url") else {
                bail!("Either --url or --file must be provided");
            };
            let retries = args.get_one::<u32>("retries").copied().unwrap_or(DEFAULT_MAX_RETRIES);
            let timeout = args.get_one::<u64>("timeout").copied().unwrap_or(DEFAULT_TIMEOUT_SECS);
            fetch_payload(url, retries, timeout, quiet).await?
        }
    };

    let db = open_database(&db_path)?;
    let resolution = run_pipeline(&db, &data, StdoutSink);

    if !quiet {
        eprintln!(
            "{} {} location link(s) from {} routers",
            "✓".green().bold(),
            resolution.links.len().to_string().cyan(),
            data.routers.len()
        );
        if !resolution.errors.is_empty() {
            eprintln!(
                "{} {} storage error(s) skipped",
                "⚠".yellow().bold(),
                resolution.errors.len()
            );
        }
    }

    if !persist {
        match db.clear() {
            Ok(removed) => debug!("Flushed {} records from {}", removed, db_path.display()),
            Err(e) => error!("error flushing store: {}", e),
        }
    }

    Ok(())
}

pub fn handle_links(args: &ArgMatches) -> Result<()> {
    let db_path = db_path_arg(args);
    if !Database::exists(&db_path) {
        bail!("No database at {}", db_path.display());
    }

    let db = open_database(&db_path)?;
    let links = db.list_links()?;
    for link in &links {
        println!("{}", link.connection);
    }

    if !args.get_flag("quiet") {
        eprintln!("{} {} stored link(s)", "→".blue(), links.len());
    }
    Ok(())
}

pub fn handle_flush(args: &ArgMatches) -> Result<()> {
    let db_path = db_path_arg(args);
    if !Database::exists(&db_path) {
        bail!("No database at {}", db_path.display());
    }

    let removed = open_database(&db_path)?.clear()?;
    if !args.get_flag("quiet") {
        eprintln!(
            "{} Removed {} record(s) from {}",
            "✓".green().bold(),
            removed,
            db_path.display().to_string().bright_white()
        );
    }
    Ok(())
}
