use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use estate_scout::config::{self, CollectorConfig};
use estate_scout::scrapers::{run_and_save, ChromePage, DriverKind, StaticPage};
use estate_scout::server;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape rental listings into a JSON file
    Collect(CollectArgs),
    /// Serve price predictions over HTTP
    Serve(ServeArgs),
}

#[derive(Args)]
struct CollectArgs {
    /// Path to output JSON file
    #[arg(short, long)]
    output: Option<String>,

    /// Listing page to start from
    #[arg(long)]
    url: Option<String>,

    /// Maximum number of pages to extract
    #[arg(short, long)]
    max_pages: Option<usize>,

    /// Keep listings whose ID was already seen
    #[arg(long)]
    no_dedup: bool,

    #[arg(long, value_enum)]
    driver: Option<DriverKind>,

    /// Extract from a saved copy of the listing page instead of the live site
    #[arg(long)]
    html_file: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,
}

#[derive(Args)]
struct ServeArgs {
    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,
}

/// Validates that a log level string is valid
fn validate_log_level(level: &str) -> Result<()> {
    level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
                level
            )
        })?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging setup)
    let mut config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Environment variable overrides config
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.server.logs.level.clone());
    if let Err(e) = validate_log_level(&log_level) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&log_level))
        .init();

    match cli.command {
        Command::Collect(args) => {
            apply_collect_args(&mut config.collector, &args)?;
            collect(config.collector, args.html_file).await
        }
        Command::Serve(args) => {
            if let Some(host) = args.host {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            server::run(config).await?;
            Ok(())
        }
    }
}

fn apply_collect_args(config: &mut CollectorConfig, args: &CollectArgs) -> Result<()> {
    if let Some(output) = &args.output {
        config.output_path = output.clone();
    }
    if let Some(url) = &args.url {
        config.base_url = url.clone();
    }
    if let Some(max_pages) = args.max_pages {
        if max_pages == 0 {
            anyhow::bail!("--max-pages must be at least 1");
        }
        config.max_pages = Some(max_pages);
    }
    if args.no_dedup {
        config.deduplicate = false;
    }
    if let Some(driver) = args.driver {
        config.driver = driver;
    }
    if args.headed {
        config.headless = false;
    }
    Ok(())
}

async fn collect(config: CollectorConfig, html_file: Option<PathBuf>) -> Result<()> {
    info!("🏠 Estate Scout - listing collector");
    info!(
        "Deduplication: {}, page cap: {}",
        if config.deduplicate { "on" } else { "off" },
        config
            .max_pages
            .map_or_else(|| "none".to_string(), |max| max.to_string())
    );

    match (html_file, config.driver) {
        (Some(path), _) => {
            let page = StaticPage::from_file(&path).await?;
            run_and_save(config, move |_| Ok(page)).await?;
        }
        (None, DriverKind::Static) => {
            let page = StaticPage::fetch(&config.base_url, config.navigation_timeout()).await?;
            run_and_save(config, move |_| Ok(page)).await?;
        }
        (None, DriverKind::Chrome) => {
            run_and_save(config, ChromePage::launch).await?;
        }
    }

    Ok(())
}
