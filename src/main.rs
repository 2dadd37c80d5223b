// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing) from -v/-q or RUST_LOG
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = crawl finished, 1 = aborted, 2 = error)
// =============================================================================

mod cli;

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use site_crawler::{address, crawl_site, CrawlConfig, CrawlOutcome, CrawlReport, Hooks};
use tracing::debug;

use cli::{Cli, Commands, CrawlArgs};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins, then --quiet, then -v count, then "info"
fn init_tracing(cli: &Cli) {
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr so stdout stays clean for URLs and JSON
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Crawl(args) => handle_crawl(&args).await,
        Commands::Parse { url, base } => handle_parse(&url, base.as_deref()),
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(args: &CrawlArgs) -> Result<i32> {
    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str::<CrawlConfig>(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => CrawlConfig::default(),
    };
    let config = args.apply(config);
    debug!(?config, "crawl configuration");

    let prints_urls = config.output_file.is_none() && !args.json;
    let report = crawl_site(&args.target, config, Hooks::new()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if prints_urls {
            for url in &report.fetched {
                println!("{}", url);
            }
        }
        print_summary(&report);
    }

    Ok(match report.outcome {
        CrawlOutcome::Exhausted => 0,
        CrawlOutcome::Aborted => 1,
    })
}

// Handles the 'parse' subcommand: prints the components as JSON
fn handle_parse(url: &str, base: Option<&str>) -> Result<i32> {
    let parsed = match base {
        Some(base) => {
            let base = address::parse(base)
                .with_context(|| format!("base '{}' is not a valid URL", base))?;
            address::resolve_raw(&base, url)
        }
        None => address::parse(url),
    };

    match parsed {
        Some(parts) => {
            println!("{}", serde_json::to_string_pretty(&parts)?);
            println!("{}", parts);
            Ok(0)
        }
        None => {
            eprintln!("Not a crawlable link: {}", url);
            Ok(1)
        }
    }
}

// Human-readable summary on stderr
fn print_summary(report: &CrawlReport) {
    eprintln!();
    eprintln!("Summary for {}:", report.seed);
    eprintln!("   Pages fetched:      {}", report.fetched.len());
    eprintln!("   Requests:           {}", report.requests);
    eprintln!("   Redirects followed: {}", report.redirects_followed);
    eprintln!("   Transport errors:   {}", report.transport_errors);
    eprintln!("   Links queued:       {}", report.links_enqueued);
    eprintln!("   Links out of scope: {}", report.links_out_of_scope);
    if report.outcome == CrawlOutcome::Aborted {
        eprintln!("   Crawl was aborted by a hook ({} URL(s) still pending)", report.pending);
    }
}
