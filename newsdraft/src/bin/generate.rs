/*
newsdraft-generate - run the post pipeline once from the terminal and print the result.
*/

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use newsdraft::pipeline::{GenerationRequest, GenerationResult, PostGenerator};

#[derive(Parser, Debug)]
#[command(name = "newsdraft-generate", about = "Generate one post from recent news and print it")]
struct Args {
    /// Topic to search news for
    #[arg(long)]
    topic: String,

    /// Target audience of the post
    #[arg(long, default_value = "general readers")]
    audience: String,

    /// Style code: 1 easy to read, 2 exciting read, 3 technical read, 4 marketing purpose, 5 upskilling
    #[arg(long)]
    style: Option<String>,

    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let _ = dotenv::dotenv();

    let config = newsdraft::load_config(args.config).await?;
    let api_key = config.llm.resolve_api_key();
    let generator = PostGenerator::from_config(&config, api_key)?;

    let request = GenerationRequest::new(args.topic, args.audience, args.style);
    let result = generator.generate(&request).await?;

    if args.json {
        let json = serde_json::to_string_pretty(&result).context("failed to serialize result")?;
        println!("{}", json);
    } else {
        print_summary(&result);
    }
    Ok(())
}

fn print_summary(result: &GenerationResult) {
    println!("\n{}", "=".repeat(60));
    println!("Topic: {}", result.topic);
    println!("Audience: {}", result.audience);
    println!("Style: {}", result.style_label);
    println!("Model: {}", result.model);
    println!("Input tokens used: {}", result.input_token_count);
    println!("Output tokens used: {}", result.output_token_count);
    println!("Inference time: {:.2}s", result.latency_seconds);
    if result.used_fallback {
        println!("Sources: none (fallback prompt)");
    } else {
        println!("Sources ({}):", result.sources.len());
        for url in &result.sources {
            println!("  - {}", url);
        }
    }
    println!("{}", "=".repeat(60));
    println!("{}", result.post_html);
}
