use anyhow::{Context, Result};
use rmcp::{ServiceExt, transport::stdio};
use tracing_subscriber::EnvFilter;

use mlfb_describe::server::SimpleServer;
use mlfb_describe::{Config, Retriever, http};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let retriever = Retriever::from_config(config.clone())?;

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--test") => {
            let mlfb = args.get(2).context("usage: mlfb-describe --test <mlfb>")?;
            test_lookup(&retriever, mlfb).await
        }
        Some("--mcp") => {
            let service = SimpleServer::new(retriever).serve(stdio()).await?;
            service.waiting().await?;
            Ok(())
        }
        _ => http::serve(&config, retriever).await,
    }
}

async fn test_lookup(retriever: &Retriever, mlfb: &str) -> Result<()> {
    println!(
        "Looking up {} via {} backend (threshold {})",
        mlfb,
        retriever.backend_name(),
        retriever.threshold()
    );
    let lookup = retriever.describe(mlfb).await?;
    println!("source: {}", if lookup.source.is_empty() { "-" } else { &lookup.source });
    println!("description ({} chars):\n{}", lookup.description.chars().count(), lookup.description);
    Ok(())
}
