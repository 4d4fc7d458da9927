use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trinity_cwl::api::{build_router, state::AppState};
use trinity_cwl::calculate::build_report;
use trinity_cwl::config::AppConfig;
use trinity_cwl::fetch::{CwlClient, CwlSource, StaticSource};
use trinity_cwl::models::{CwlSnapshot, Tag};
use trinity_cwl::parse_duration;

#[derive(Parser)]
#[command(name = "trinity-cwl")]
#[command(about = "Clan War League leaderboard, rounds and mirror bonus tracking")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,

        /// How long upstream responses are reused (e.g., "2m", "90s")
        #[arg(long)]
        cache_ttl: Option<String>,

        /// Serve a saved snapshot instead of calling the API
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// League used for medal calculation
        #[arg(long)]
        league: Option<String>,
    },

    /// Build a report from a saved snapshot and print it as JSON
    Report {
        /// Snapshot file written by `fetch`
        #[arg(long)]
        input: PathBuf,

        /// Clan tag; defaults to the configured clan
        #[arg(long)]
        clan: Option<String>,

        /// Part of the report to print
        #[arg(long, value_enum, default_value_t = Section::All)]
        section: Section,

        /// League used for medal calculation
        #[arg(long)]
        league: Option<String>,
    },

    /// Download the current league group and its wars to a snapshot file
    Fetch {
        /// Clan tag; defaults to the configured clan
        #[arg(long)]
        clan: Option<String>,

        /// Where to write the snapshot
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Section {
    All,
    Leaderboard,
    Rounds,
    Members,
}

fn resolve_clan(arg: Option<&str>, config: &AppConfig) -> Result<Tag> {
    match arg {
        Some(raw) => Tag::parse(raw).with_context(|| format!("Invalid clan tag {:?}", raw)),
        None => config
            .clan()?
            .ok_or_else(|| anyhow!("No clan given; pass --clan or set clan_tag in the config")),
    }
}

fn read_snapshot(path: &Path) -> Result<CwlSnapshot> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_file_or_default(&cli.config)?;

    // Initialize tracing; logs go to stderr so report output stays clean
    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::info!("Starting trinity-cwl v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve {
            host,
            port,
            cache_ttl,
            snapshot,
            league,
        } => {
            let source: Arc<dyn CwlSource> = match snapshot {
                Some(path) => {
                    tracing::info!("Serving saved snapshot {}", path.display());
                    Arc::new(StaticSource::new(read_snapshot(&path)?))
                }
                None => {
                    let mut client_config = config.api.client_config();
                    if let Some(raw) = cache_ttl.as_deref() {
                        client_config.cache_ttl = parse_duration(raw)
                            .ok_or_else(|| anyhow!("Invalid cache TTL {:?}", raw))?;
                    }
                    if client_config.token.is_none() {
                        tracing::warn!(
                            "No API token configured; set {} or api.token",
                            config.api.token_env
                        );
                    }
                    Arc::new(CwlClient::new(client_config)?)
                }
            };

            let state = AppState {
                source,
                league_override: league.or_else(|| config.league.clone()),
                cors_origin: config.server.cors_origin.clone(),
            };
            let app = build_router(state);
            let addr = format!(
                "{}:{}",
                host.unwrap_or_else(|| config.server.host.clone()),
                port.unwrap_or(config.server.port)
            );
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Dashboard API: http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Report {
            input,
            clan,
            section,
            league,
        } => {
            let tag = resolve_clan(clan.as_deref(), &config)?;
            let snapshot = read_snapshot(&input)?;
            let league = league.or_else(|| config.league.clone());
            let report = build_report(&snapshot, &tag, league.as_deref(), Utc::now());

            let output = match section {
                Section::All => serde_json::to_string_pretty(&report)?,
                Section::Leaderboard => serde_json::to_string_pretty(&report.leaderboard)?,
                Section::Rounds => serde_json::to_string_pretty(&report.rounds)?,
                Section::Members => serde_json::to_string_pretty(&report.members)?,
            };
            println!("{}", output);
        }
        Commands::Fetch { clan, output } => {
            let tag = resolve_clan(clan.as_deref(), &config)?;
            let client = CwlClient::new(config.api.client_config())?;
            let snapshot = client.fetch_snapshot(&tag).await?;

            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&output, serde_json::to_string_pretty(&snapshot)?)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            tracing::info!(
                "Saved {} wars for {} to {}",
                snapshot.wars.len(),
                tag,
                output.display()
            );
        }
    }

    Ok(())
}
