use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use flowstack_proposal::config::Config;
use flowstack_proposal::server::{self, AppState};

#[derive(Parser, Debug)]
#[command(
    name = "flowstackd",
    about = "Proposal generation backend for the FlowStack lead funnel",
    version
)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    if !config.has_api_key() {
        tracing::warn!("GROQ_API_KEY is not set; proposal generation will fail until it is");
    }
    if config.webhook_url.is_none() {
        tracing::warn!("N8N_WEBHOOK_URL is not set; lead forwarding is disabled");
    }

    let state = Arc::new(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!(addr = %args.bind, "listening");
    server::serve(listener, state).await
}
