//! resubscribe CLI: migrate channel subscriptions onto a new account.

use clap::{Parser, Subcommand};
use resubscribe::auth::authorize;
use resubscribe::config::Config;
use resubscribe::engine::{MigrationEngine, start_summary};
use resubscribe::gateway::Gateway;
use resubscribe::input::load_channel_ids;
use resubscribe::progress::ProgressStore;
use resubscribe::report::{render_start, render_summary};
use resubscribe::telemetry::{TelemetryConfig, init_telemetry};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "resubscribe",
    about = "Resumable migration of YouTube subscriptions"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Subscribe to every channel in the input, resuming from earlier runs
    Run {
        /// CSV export whose first column holds channel IDs
        #[arg(long)]
        input: Option<PathBuf>,
        /// Progress file of already resolved channel IDs
        #[arg(long)]
        progress: Option<PathBuf>,
        /// OAuth client secrets JSON
        #[arg(long)]
        credentials: Option<PathBuf>,
    },
    /// Show how much of the input is already done, without calling the API
    Status {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        progress: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "resubscribe".to_string(),
        default_level: config.log_level.clone(),
    })?;

    match cli.command {
        Command::Run {
            input,
            progress,
            credentials,
        } => {
            override_paths(&mut config, input, progress);
            if let Some(path) = credentials {
                config.credentials_path = path;
            }
            cmd_run(&config).await
        }
        Command::Status { input, progress } => {
            override_paths(&mut config, input, progress);
            cmd_status(&config)
        }
    }
}

fn override_paths(config: &mut Config, input: Option<PathBuf>, progress: Option<PathBuf>) {
    if let Some(path) = input {
        config.input_path = path;
    }
    if let Some(path) = progress {
        config.progress_path = path;
    }
}

async fn cmd_run(config: &Config) -> anyhow::Result<()> {
    // Both fatal checks happen before any remote call.
    let items = load_channel_ids(&config.input_path)?;
    let store = ProgressStore::new(&config.progress_path);
    let completed = store.load()?;
    let log = store.open_log()?;

    let client = authorize(&config.auth()).await?;

    let mut engine = MigrationEngine::new(Gateway::new(client), log, completed, config.throttle);
    print!("{}", render_start(&engine.start_summary(&items)));

    let summary = engine.run(&items).await?;
    drop(engine);

    // A quota halt is a normal exit; the summary says how to resume.
    print!("{}", render_summary(&summary));
    Ok(())
}

fn cmd_status(config: &Config) -> anyhow::Result<()> {
    let items = load_channel_ids(&config.input_path)?;
    let completed = ProgressStore::new(&config.progress_path).load()?;
    print!("{}", render_start(&start_summary(&items, &completed)));
    Ok(())
}
