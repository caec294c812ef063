use clap::Parser;
use roommate_match::config::Settings;
use roommate_match::models::ProfileSnapshot;
use roommate_match::services::{InMemoryProfileStore, MatchEngine};
use roommate_match::MatchError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Rank roommate candidates from a JSON profile pool
#[derive(Debug, Parser)]
#[command(name = "roommate-match", version, about)]
struct Cli {
    /// JSON file holding an array of profile snapshots
    #[arg(long)]
    pool: PathBuf,

    /// Identity of the requesting user
    #[arg(long)]
    user: String,

    /// Number of matches to return (defaults to matching.default_top_n)
    #[arg(long)]
    top_n: Option<usize>,

    /// Score the user against a single profile instead of ranking
    #[arg(long)]
    against: Option<String>,

    /// Configuration file (defaults to config/default and config/local)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .map_err(|e| std::io::Error::other(format!("Configuration error: {}", e)))?;

    init_logging(&settings);

    if let Err(e) = settings.validate() {
        error!("Invalid configuration: {}", e);
        return Err(std::io::Error::other(e.to_string()));
    }

    info!("Configuration loaded successfully");

    let raw = std::fs::read_to_string(&cli.pool)?;
    let profiles: Vec<ProfileSnapshot> = serde_json::from_str(&raw)?;
    info!("Loaded {} profiles from {}", profiles.len(), cli.pool.display());

    let store = Arc::new(InMemoryProfileStore::from_profiles(profiles));
    let engine = MatchEngine::new(&settings, store)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let output = match &cli.against {
        Some(other) => {
            serde_json::to_value(engine.score_pair(&cli.user, other).await.map_err(failed)?)?
        }
        None => serde_json::to_value(
            engine
                .find_matches(&cli.user, cli.top_n)
                .await
                .map_err(failed)?,
        )?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn failed(e: MatchError) -> std::io::Error {
    error!("Matching failed: {}", e);
    std::io::Error::other(e.to_string())
}
