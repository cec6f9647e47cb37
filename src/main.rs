//! docsync main entry point
//!
//! This is the command-line interface for the docsync documentation archiver.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use docsync::config::{read_config_with_hash, validate, Config};
use docsync::crawler::Coordinator;
use docsync::output::print_statistics;
use docsync::select::{choose_pages, SelectAll, TerminalSelector};
use docsync::SyncError;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Exit status after Ctrl-C
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// docsync: archive documentation sites as Markdown
///
/// docsync finds a documentation site's pages through its sitemap, lets you
/// pick the ones you want, and keeps local copies in sync, rewriting only
/// pages whose content changed since the last run.
#[derive(Parser, Debug)]
#[command(name = "docsync")]
#[command(version)]
#[command(about = "Archive documentation sites as Markdown", long_about = None)]
struct Cli {
    /// Base URL(s) of the documentation to crawl
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Read page URLs from a file (one per line) instead of crawling
    #[arg(short = 'f', long, value_name = "FILE")]
    url_file: Option<PathBuf>,

    /// Only keep pages whose path contains this language code (e.g. en, fr, pt-BR)
    #[arg(short, long = "lang", value_name = "CODE")]
    language: Option<String>,

    /// Output formats to write
    #[arg(long, value_enum, value_delimiter = ',', value_name = "FMT,...")]
    format: Vec<Format>,

    /// Write all files into one directory
    #[arg(long)]
    flatten: bool,

    /// Do not write the selected URL list
    #[arg(long)]
    no_store_urls: bool,

    /// Select every discovered page without prompting
    #[arg(long)]
    all: bool,

    /// Show detailed statistics
    #[arg(long)]
    debug: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Markdown,
    Html,
    Text,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tokio::select! {
        result = run(cli) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("docsync=info,warn"),
            1 => EnvFilter::new("docsync=debug,info"),
            2 => EnvFilter::new("docsync=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_settings(&cli)?;

    match &cli.url_file {
        Some(path) => handle_url_file(config, path).await,
        None => handle_crawl(config, cli.all).await,
    }
}

/// Loads the config file (or defaults), applies flags, then validates
fn load_settings(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = read_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, cli);
    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Applies command-line flags on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if !cli.urls.is_empty() {
        config.crawler.base_urls = cli.urls.clone();
    }
    if let Some(language) = &cli.language {
        config.crawler.language = Some(language.clone());
    }
    if !cli.format.is_empty() {
        config.output.markdown = cli.format.contains(&Format::Markdown);
        config.output.html = cli.format.contains(&Format::Html);
        config.output.text = cli.format.contains(&Format::Text);
    }
    if cli.flatten {
        config.output.flatten = true;
    }
    if cli.no_store_urls {
        config.output.store_urls = false;
    }
    if cli.debug {
        config.crawler.debug = true;
    }
}

/// Handles --url-file: syncs an explicit list of pages
async fn handle_url_file(config: Config, path: &Path) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read URL file {}", path.display()))?;
    let urls = read_url_list(&content)?;

    if urls.is_empty() {
        tracing::warn!("No URLs in {}", path.display());
        return Ok(());
    }
    tracing::info!("Loaded {} URLs from {}", urls.len(), path.display());

    let coordinator = Coordinator::new(config)?;
    sync(&coordinator, &urls).await
}

/// Parses a URL list, one URL per line, ignoring blank lines
fn read_url_list(content: &str) -> Result<Vec<String>, SyncError> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if line.starts_with("http") {
                Ok(line.to_string())
            } else {
                Err(SyncError::InvalidUrlList {
                    line: line.to_string(),
                })
            }
        })
        .collect()
}

/// Handles the main crawl operation
async fn handle_crawl(mut config: Config, select_all: bool) -> anyhow::Result<()> {
    if config.crawler.base_urls.is_empty() {
        config.crawler.base_urls = tokio::task::spawn_blocking(prompt_base_urls)
            .await?
            .context("Failed to read base URLs")?;
    }

    tracing::info!("Base URLs: {}", config.crawler.base_urls.join(", "));
    if let Some(language) = &config.crawler.language {
        tracing::info!("Language filter: {}", language);
    }

    let coordinator = Coordinator::new(config)?;
    let sitemap = coordinator.build_sitemap().await?;
    println!("Found {} relevant pages", sitemap.len());

    let selected = if select_all {
        choose_pages(&sitemap, &mut SelectAll)?
    } else {
        tokio::task::spawn_blocking(move || {
            let mut selector = TerminalSelector::stdio();
            choose_pages(&sitemap, &mut selector)
        })
        .await??
    };

    sync(&coordinator, &selected).await
}

/// Stores the URL list, syncs the pages and prints the totals
async fn sync(coordinator: &Coordinator, urls: &[String]) -> anyhow::Result<()> {
    if let Some(path) = coordinator.store_urls(urls)? {
        println!("Saved URL list to {}", path.display());
    }

    let report = coordinator.sync_pages(urls).await?;

    print_statistics(&report.stats, coordinator.config().crawler.debug);
    println!(
        "Synced {} pages: {} written, {} unchanged, {} failed",
        urls.len(),
        report.written,
        report.unchanged,
        report.failed
    );
    Ok(())
}

/// Asks for base URLs on stdin
fn prompt_base_urls() -> std::io::Result<Vec<String>> {
    print!("Enter documentation base URL(s), separated by spaces: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.split_whitespace().map(str::to_string).collect())
}
