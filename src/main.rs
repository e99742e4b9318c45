use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use logwise::{report, LogsRequest};
use logwise_client::BackendClient;
use logwise_core::{config::Config, RangeKey, RangeTable, Severity};

#[derive(Parser)]
#[command(name = "logwise", about = "logwise: terminal log investigation", version)]
struct Cli {
    /// Write debug logs to the log file (tail -f to inspect).
    #[arg(long, global = true)]
    debug: bool,

    /// Where `--debug` writes.
    #[arg(long, global = true, default_value = "/tmp/logwise-debug.log")]
    log_file: PathBuf,

    /// Config file to use instead of ~/.config/logwise/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file.
    #[arg(long, global = true)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Interactive dashboard (default).
    Tui,
    /// Probe the backend; exits non-zero when unreachable.
    Health,
    /// List connected projects.
    Projects,
    /// List investigation sessions.
    Sessions,
    /// Start a session for a project and print its id.
    StartSession { project_id: String },
    /// Print logs and the volume chart for a time range.
    Logs {
        /// last-5m, last-15m, last-30m, last-1h, last-6h, last-24h, yesterday or last-7d.
        #[arg(long)]
        range: Option<RangeKey>,
        /// Repeatable; defaults to the configured severities.
        #[arg(long = "severity", value_name = "LEVEL")]
        severities: Vec<Severity>,
        /// Case-insensitive text filter.
        #[arg(long, default_value = "")]
        search: String,
        /// Print full messages, resource and labels.
        #[arg(long)]
        full: bool,
    },
    /// Ask the backend to explain a log message.
    Explain {
        message: String,
        #[arg(long)]
        project_description: Option<String>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&cli.log_file)
            .with_context(|| format!("opening {}", cli.log_file.display()))?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!(path = %cli.log_file.display(), "logwise debug log started");
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading config")?;
    if let Some(url) = cli.backend_url {
        config.backend.base_url = url;
    }

    let client = BackendClient::from_config(&config.backend)?;
    let runtime = tokio::runtime::Runtime::new()?;

    match cli.command.unwrap_or(Cmd::Tui) {
        Cmd::Tui => {
            logwise_tui::run(config, client, runtime.handle().clone())?;
        }
        Cmd::Health => {
            let outcome = runtime.block_on(client.health());
            println!("{}", report::health_line(client.base_url(), &outcome));
            if outcome.is_err() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Cmd::Projects => {
            let projects = runtime.block_on(client.projects())?;
            print!("{}", report::projects_table(&projects));
        }
        Cmd::Sessions => {
            let sessions = runtime.block_on(client.sessions())?;
            print!("{}", report::sessions_table(&sessions));
        }
        Cmd::StartSession { project_id } => {
            let session_id = runtime.block_on(client.start_session(&project_id))?;
            println!("{session_id}");
        }
        Cmd::Logs { range, severities, search, full } => {
            let request = LogsRequest {
                range: range.unwrap_or(config.investigation.default_range),
                severities: if severities.is_empty() {
                    config.investigation.default_severities.clone()
                } else {
                    severities
                },
                search,
                full,
            };
            let table = RangeTable::standard();
            let normalizer = config.investigation.normalizer();
            let out = runtime.block_on(logwise::logs_report(&client, &table, &normalizer, &request))?;
            print!("{out}");
        }
        Cmd::Explain { message, project_description } => {
            let description = project_description.unwrap_or(config.backend.project_description);
            let explanation = runtime.block_on(client.explain(&message, &description))?;
            println!("{explanation}");
        }
    }

    Ok(ExitCode::SUCCESS)
}
