//! CLI entry point for metro_spyder.
//!
//! Crawls metro and light-rail line, station and accessibility pages, then
//! merges them with the static station tables into one CSV.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use metro_spyder::config::{Config, DEFAULT_BASE_URL, DEFAULT_CONCURRENCY, DEFAULT_USER_AGENT};
use metro_spyder::merge::merge_files;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "metro_spyder")]
#[command(about = "Scrape metro and light-rail stations and merge them with static feed stops", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    crawl: CrawlArgs,

    #[command(flatten)]
    paths: PathArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl both modes, then merge (default)
    Run,
    /// Only crawl, writing the intermediate record files
    Crawl,
    /// Only merge existing intermediate record files
    Merge,
}

#[derive(Args)]
struct CrawlArgs {
    /// Scheme and host of the transit authority's website
    #[arg(long, global = true, env = "METRO_SPYDER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, global = true, env = "METRO_SPYDER_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Maximum page requests in flight per crawl
    #[arg(short, long, global = true, env = "METRO_SPYDER_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,
}

#[derive(Args)]
struct PathArgs {
    /// Static station table of the metro feed
    #[arg(long, global = true, env = "METRO_SPYDER_METRO_STOPS", default_value = "stops.txt")]
    metro_stops: PathBuf,

    /// Static station table of the light-rail feed
    #[arg(long, global = true, env = "METRO_SPYDER_LIGHT_RAIL_STOPS", default_value = "stops_ligero.txt")]
    light_rail_stops: PathBuf,

    #[arg(long, global = true, env = "METRO_SPYDER_METRO_RECORDS", default_value = "metro.json")]
    metro_records: PathBuf,

    #[arg(long, global = true, env = "METRO_SPYDER_LIGHT_RAIL_RECORDS", default_value = "ligero.json")]
    light_rail_records: PathBuf,

    /// Merged CSV output
    #[arg(short, long, global = true, env = "METRO_SPYDER_OUTPUT", default_value = "DATOS.csv")]
    output: PathBuf,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            base_url: self.crawl.base_url.clone(),
            user_agent: self.crawl.user_agent.clone(),
            concurrency: self.crawl.concurrency,
            metro_stops: self.paths.metro_stops.clone(),
            light_rail_stops: self.paths.light_rail_stops.clone(),
            metro_records: self.paths.metro_records.clone(),
            light_rail_records: self.paths.light_rail_records.clone(),
            output: self.paths.output.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/metro_spyder.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("metro_spyder.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = cli.config();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let merged = metro_spyder::run(&config).await?;
            info!(rows = merged.len(), "Pipeline finished");
        }
        Commands::Crawl => {
            metro_spyder::crawl(&config).await?;
        }
        Commands::Merge => {
            let merged = merge_files(&config)?;
            info!(rows = merged.len(), "Merge finished");
        }
    }

    Ok(())
}
