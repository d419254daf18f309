use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use forum_post_harvester::config::{Config, HarvestMode};
use forum_post_harvester::pipeline;
use forum_post_harvester::platform::HttpPlatformClient;

/// Config file picked up from the working directory when nothing else is given.
const DEFAULT_CONFIG_FILE: &str = "config.json";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let started = Instant::now();
    info!("Starting forum-post-harvester");

    let config = load_config().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        user = %config.user_id,
        mode = ?config.mode,
        total_count = config.total_count,
        forums = ?config.forum_names,
        "Configuration loaded"
    );

    let client = HttpPlatformClient::new(&config).context("Failed to create platform client")?;

    let written = match config.mode {
        HarvestMode::Posts => pipeline::run_posts(&client, &config).await?,
        HarvestMode::Followed => pipeline::run_followed(&client, &config).await?,
    };

    if let Some(path) = written {
        info!(path = %path.display(), "Output saved");
    }
    info!(elapsed_secs = started.elapsed().as_secs_f64(), "Finished");

    Ok(())
}

/// Pick the configuration source.
///
/// Precedence: first CLI argument, `CONFIG_FILE`, `./config.json` if present,
/// then environment variables alone.
fn load_config() -> Result<Config> {
    let explicit = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CONFIG_FILE").ok())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);

    let path = explicit.or_else(|| {
        let default = Path::new(DEFAULT_CONFIG_FILE);
        default.exists().then(|| default.to_path_buf())
    });

    match path {
        Some(path) => {
            info!(path = %path.display(), "Reading config file");
            Ok(Config::from_json_file(&path)?)
        }
        None => Ok(Config::from_env()?),
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,forum_post_harvester=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
