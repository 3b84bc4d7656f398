//! Fixture Consensus Service
//!
//! Serves prediction consensus, odds and expected value analysis for
//! football fixtures.

use clap::{Parser, Subcommand};
use fixture_consensus::{
    client::ProviderClient,
    config::{Config, LoggingConfig},
    engine::{AnalysisRequest, FixtureAnalyzer},
    server::{self, AnalysisResponse, AppState},
};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "fixture-consensus")]
#[command(about = "Prediction consensus and market-value engine for football fixtures")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve,
    /// Analyze a single fixture and print the result as JSON
    Analyze {
        /// Provider fixture id
        fixture_id: u64,

        /// Preferred bookmaker id
        #[arg(short, long)]
        bookmaker: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;
    init_logging(&config.logging);

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Analyze {
            fixture_id,
            bookmaker,
        } => analyze_fixture(config, fixture_id, bookmaker).await,
    }
}

/// RUST_LOG wins over the configured level
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format.as_str() {
        "compact" => fmt().compact().with_env_filter(filter).init(),
        _ => fmt().pretty().with_env_filter(filter).init(),
    }
}

fn build_analyzer(config: &Config) -> anyhow::Result<FixtureAnalyzer> {
    let provider = ProviderClient::new(&config.provider)?;
    Ok(FixtureAnalyzer::new(Arc::new(provider), config))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting fixture consensus service");

    let analyzer = build_analyzer(&config)?;
    let state = Arc::new(AppState::new(analyzer));

    server::start_server(state, &config.server.host, config.server.port)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {}", e))
}

async fn analyze_fixture(
    config: Config,
    fixture_id: u64,
    bookmaker: Option<u64>,
) -> anyhow::Result<()> {
    let analyzer = build_analyzer(&config)?;
    let request = AnalysisRequest::new(fixture_id).with_bookmaker(bookmaker);

    let analysis = analyzer.analyze(&request).await?;
    let response = AnalysisResponse::from(analysis.as_ref());

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
