mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use kodik::prelude::*;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kodik=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let source = match &cli.config {
        Some(path) => SourceConfig::from_file(path)?,
        None => SourceConfig::from_env()?,
    };
    let transport = HttpTransport::from_env()?;
    let cache: Arc<dyn TokenCache> = if cli.no_persist {
        Arc::new(MemoryTokenCache::new())
    } else {
        let db = Database::connect(cli.database.as_deref()).await?;
        db.run_migrations().await?;
        Arc::new(db)
    };
    let api = KodikApi::new(source, transport, cache, KodikVideoFactory);

    match cli.command {
        Commands::Check { cache } => {
            api.access_checking(cache).await?;
            println!("Token accepted by {}", api.source().host);
        }
        Commands::Search { title } => {
            let videos = api.get_videos(&title).await?;
            println!("{}", serde_json::to_string_pretty(&videos)?);
        }
        Commands::Get { id } => {
            let video = api.get_video(&id).await?;
            println!("{}", serde_json::to_string_pretty(&video)?);
        }
    }
    Ok(())
}
