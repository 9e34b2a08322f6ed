use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use timeline_snapshot::config::Config;
use timeline_snapshot::pipeline;
use timeline_snapshot::syndication::SyndicationClient;
use timeline_snapshot::throttle::SleepThrottle;

/// Exit status when no account could be fetched.
const EXIT_NO_FETCHES: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            error!("Fatal error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    info!("Starting timeline-snapshot");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        accounts = config.accounts.len(),
        output = %config.output_path.display(),
        upstream = %config.syndication_base_url,
        "Configuration loaded"
    );

    let client = SyndicationClient::new(&config).context("Failed to build HTTP client")?;
    let throttle = SleepThrottle::new(config.fetch_delay);

    let snapshot = pipeline::run(&config, &client, &throttle)
        .await
        .context("Failed to write snapshot")?;

    info!(
        posts = snapshot.posts.len(),
        successful = snapshot.successful_fetch_count,
        accounts = snapshot.tracked_account_count,
        "Done"
    );

    if snapshot.successful_fetch_count == 0 && config.fail_on_no_fetches {
        warn!("No account could be fetched");
        return Ok(ExitCode::from(EXIT_NO_FETCHES));
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,timeline_snapshot=debug"));

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
