/*
newsdraft - main.rs
This binary starts the Rocket HTTP server serving the post generation form.
*/

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use newsdraft::pipeline::PostGenerator;
use newsdraft::server::launch_rocket;

#[derive(Parser, Debug)]
#[command(name = "newsdraft", about = "Generate blog posts from recent news articles")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override bind address from config
    #[arg(long)]
    bind: Option<String>,

    /// Override port from config
    #[arg(long)]
    port: Option<u16>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // A missing .env is fine; variables may come from the real environment.
    if let Ok(path) = dotenv::dotenv() {
        info!(path = %path.display(), "loaded environment file");
    }

    let mut config = newsdraft::load_config(args.config).await?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // The key is read once here and handed to the generation client.
    let api_key = config.llm.resolve_api_key();
    if api_key.is_none() {
        warn!(
            env = %config.llm.api_key_env,
            "LLM API key not set; post generation will fail until it is configured"
        );
    }
    info!(model = %config.llm.model, api_url = %config.llm.api_url, "LLM provider configured");

    let generator = Arc::new(PostGenerator::from_config(&config, api_key)?);
    launch_rocket(generator, &config.server).await
}
