//! gaslight - store-and-forward relay for captured backend requests
//!
//! This tool provides commands for:
//! - Capturing a request payload into the local queue
//! - Replaying queued requests, in capture order, to the real backends
//! - Inspecting the queue and the endpoint configuration
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/gaslight/gaslight.db (~/.local/share/gaslight/gaslight.db)
//! - Logs: $XDG_STATE_HOME/gaslight/gaslight.log (~/.local/state/gaslight/gaslight.log)
//! - Config: $XDG_CONFIG_HOME/gaslight/config.toml (~/.config/gaslight/config.toml)

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gaslight_core::{capture, run_replay_pass, Config, Database, PassOutcome, Payload};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "gaslight")]
#[command(about = "Store captured backend requests and replay them later")]
#[command(version)]
struct Args {
    /// Queue database path (default: $XDG_DATA_HOME/gaslight/gaslight.db)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Echo log output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay queued requests to the backends, stopping at the first failure
    Push {
        /// Base URL for `gql` destinations
        #[arg(long)]
        graph_endpoint: Option<String>,

        /// Base URL for `otel` destinations
        #[arg(long)]
        otlp_endpoint: Option<String>,

        /// Base URL for any category, as CATEGORY=URL (repeatable)
        #[arg(long = "endpoint", value_name = "CATEGORY=URL", value_parser = parse_endpoint)]
        endpoints: Vec<(String, String)>,
    },

    /// Queue a request payload read from a file or stdin
    Capture {
        /// Destination, e.g. `gql` or `otel:/v1/traces`
        destination: String,

        /// Read the payload from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Parse the payload as JSON and store its compact form
        #[arg(long)]
        json: bool,
    },

    /// List queued requests in replay order
    List,

    /// Show queue depth and endpoint configuration
    Status,
}

impl Command {
    /// Whether the command reads endpoint or relay settings
    fn uses_config(&self) -> bool {
        matches!(self, Command::Push { .. } | Command::Status)
    }
}

fn parse_endpoint(value: &str) -> std::result::Result<(String, String), String> {
    match value.split_once('=') {
        Some((category, url)) if !category.is_empty() && !url.is_empty() => {
            Ok((category.to_string(), url.to_string()))
        }
        _ => Err(format!("expected CATEGORY=URL, got {:?}", value)),
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // capture and list only touch the queue, so a broken config file must not block them
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) if !args.command.uses_config() => {
            eprintln!("warning: ignoring configuration: {}", e);
            Config::default()
        }
        Err(e) => return Err(e).context("failed to load configuration"),
    };

    let _log_guard = gaslight_core::logging::init(&config.logging, args.verbose)
        .context("failed to initialize logging")?;

    let db_path = args.database.unwrap_or_else(Config::database_path);
    tracing::info!(path = %db_path.display(), "gaslight starting");

    match args.command {
        Command::Push {
            graph_endpoint,
            otlp_endpoint,
            endpoints,
        } => cmd_push(config, &db_path, graph_endpoint, otlp_endpoint, endpoints),
        Command::Capture {
            destination,
            file,
            json,
        } => cmd_capture(&db_path, &destination, file.as_deref(), json),
        Command::List => cmd_list(&db_path),
        Command::Status => cmd_status(&config, &db_path),
    }
}

fn open_existing(db_path: &Path) -> Result<Option<Database>> {
    if !db_path.exists() {
        println!("Database not found at {}", db_path.display());
        return Ok(None);
    }

    let db = Database::open(db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;
    Ok(Some(db))
}

fn cmd_push(
    mut config: Config,
    db_path: &Path,
    graph_endpoint: Option<String>,
    otlp_endpoint: Option<String>,
    overrides: Vec<(String, String)>,
) -> Result<ExitCode> {
    if let Some(url) = graph_endpoint {
        config.endpoints.set("gql", url);
    }
    if let Some(url) = otlp_endpoint {
        config.endpoints.set("otel", url);
    }
    for (category, url) in overrides {
        config.endpoints.set(category, url);
    }
    config
        .endpoints
        .validate()
        .context("invalid endpoint configuration")?;

    let db = Database::open(db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let report = run_replay_pass(&db, &config.endpoints, &config.relay)
        .context("replay pass aborted")?;

    println!("Pushed {} requests", report.processed);

    match report.outcome {
        PassOutcome::Succeeded => Ok(ExitCode::SUCCESS),
        PassOutcome::Halted { entry_id, reason } => {
            eprintln!("Failed to push data for entry {}: {}", entry_id, reason);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_capture(
    db_path: &Path,
    destination: &str,
    file: Option<&Path>,
    json: bool,
) -> Result<ExitCode> {
    if destination.is_empty() {
        bail!("destination must not be empty");
    }

    let bytes = match file {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("failed to read payload from {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read payload from stdin")?;
            buf
        }
    };

    let payload = if json {
        Payload::Json(serde_json::from_slice(&bytes).context("payload is not valid JSON")?)
    } else {
        Payload::Bytes(bytes)
    };

    let db = Database::open(db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let id = capture(&db, destination, payload).context("failed to queue payload")?;
    db.close().context("failed to close database")?;

    println!("Captured entry {} for {}", id, destination);
    Ok(ExitCode::SUCCESS)
}

fn cmd_list(db_path: &Path) -> Result<ExitCode> {
    let Some(db) = open_existing(db_path)? else {
        return Ok(ExitCode::SUCCESS);
    };

    let entries = db.entries()?;
    if entries.is_empty() {
        println!("Queue is empty.");
        return Ok(ExitCode::SUCCESS);
    }

    println!("{:>8}  {:<40} {:>10}", "ID", "Destination", "Bytes");
    println!("{:-<60}", "");

    for entry in entries {
        println!(
            "{:>8}  {:<40} {:>10}",
            entry.id.0,
            entry.destination,
            entry.payload.len()
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_status(config: &Config, db_path: &Path) -> Result<ExitCode> {
    println!("gaslight Relay Status");
    println!("=====================");
    println!();
    println!("Database:        {}", db_path.display());

    if db_path.exists() {
        let db = Database::open(db_path).context("failed to open database")?;
        db.migrate().context("failed to run database migrations")?;
        println!("Queued:          {}", db.count()?);
        println!("Schema:          v{}", db.schema_version()?);
    } else {
        println!("Queued:          0 (database not created yet)");
    }

    println!(
        "Log file:        {}",
        gaslight_core::logging::log_file_path().display()
    );
    println!(
        "Timeout:         {}",
        config
            .relay
            .timeout_secs
            .map(|secs| format!("{}s", secs))
            .unwrap_or_else(|| "none".to_string())
    );

    println!();
    println!("Endpoints:");
    for (category, base) in config.endpoints.iter() {
        println!("  {:<12} {}", category, base);
    }

    Ok(ExitCode::SUCCESS)
}
