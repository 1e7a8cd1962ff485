use clap::Parser;
use dataforge::adapters::delivery::DeliveryFanout;
use dataforge::adapters::orchestrator::GenerationOrchestrator;
use dataforge::cli::Cli;
use dataforge::config::{GeneratorMode, Settings};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    match settings.generator.mode {
        GeneratorMode::Process => info!(command = %settings.generator.command, "using generator process"),
        GeneratorMode::Builtin => info!("using builtin generator"),
    }

    let generator = Arc::new(GenerationOrchestrator::from_settings(&settings.generator));
    let delivery = DeliveryFanout::from_settings(&settings.delivery)?;

    let app = dataforge::create_app(Arc::new(settings), generator, delivery);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting Dataforge on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
