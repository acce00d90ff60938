mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use coda_alfred::{CodaClient, Config, DayCache, Listings, Projector, SystemClock, print_tables};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "CODA_LOG";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);
    run(cli).await
}

fn init_tracing(cli: &Cli) {
    let filter = match cli.log_level() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    if !cli.has_action() {
        return Ok(());
    }

    let config = Config::load()?;
    let client = CodaClient::from_env(&config)?;
    let cache = DayCache::open(&config.cache_dir, &SystemClock)?;
    if cli.refresh {
        cache.clear()?;
    }

    let projector = Projector::new(config.fields.clone(), config.icon.clone());
    let listings = Listings::new(&client, &cache, &projector);
    let format = cli.format();

    if cli.docs {
        let listing = listings.docs(format).await?;
        println!("{}", serde_json::to_string(&listing)?);
    }

    if let Some(doc_id) = &cli.pages {
        let listing = listings.pages(std::slice::from_ref(doc_id), format).await?;
        println!("{}", serde_json::to_string(&listing)?);
    }

    if let Some(doc_id) = &cli.tables {
        let max_tables = cli.max_tables.unwrap_or(config.max_tables);
        print_tables(&client, doc_id, max_tables, &mut std::io::stdout()).await?;
    }

    Ok(())
}
