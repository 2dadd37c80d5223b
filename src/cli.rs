// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Every crawl flag is optional: unset flags leave the value from --config
// (or the built-in default) alone.
// =============================================================================

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use site_crawler::{CrawlConfig, DomainScope, LogFormat, SchemeScope};

#[derive(Parser, Debug)]
#[command(
    name = "site-crawler",
    version,
    about = "Crawl a website within a scope and list every page that answered 200",
    long_about = "site-crawler starts from a seed URL, follows in-scope links and redirect chains \
                  one request at a time, and writes every successfully fetched URL to stdout or a file."
)]
pub struct Cli {
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a site
    ///
    /// Example: site-crawler crawl example.com --max-depth 3 --output pages.txt
    Crawl(CrawlArgs),

    /// Show how a URL is split into components
    ///
    /// Example: site-crawler parse "https://docs.example.com/a?b=1"
    Parse {
        /// URL or relative reference to parse
        url: String,

        /// Resolve against this base URL first
        #[arg(long)]
        base: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Host ("example.com") or full seed URL
    pub target: String,

    /// JSON file with a crawl configuration; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path appended to a bare host to form the seed (default "/")
    #[arg(long)]
    pub entry_path: Option<String>,

    /// Append fetched URLs to this file instead of printing them
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Folder for the general/error/redirect log streams
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Subdomain to crawl under --domain-scope subdomain-only
    #[arg(long)]
    pub subdomain: Option<String>,

    #[arg(long, value_enum)]
    pub domain_scope: Option<DomainScope>,

    /// Scheme for the seed and for --scheme-scope match-entry (default https)
    #[arg(long)]
    pub entry_scheme: Option<String>,

    #[arg(long, value_enum)]
    pub scheme_scope: Option<SchemeScope>,

    /// Longest redirect chain to follow (default 20)
    #[arg(long)]
    pub max_redirects: Option<u32>,

    /// Largest number of path segments a crawled URL may have
    #[arg(long)]
    pub max_depth: Option<usize>,

    #[arg(long)]
    pub user_agent: Option<String>,

    /// Pause between requests, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Per-request timeout in seconds (default 10)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Keep session storage here so an interrupted crawl can resume
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Print the crawl report as JSON
    #[arg(long)]
    pub json: bool,
}

impl CrawlArgs {
    /// Applies the flags that were given on top of `config`.
    pub fn apply(&self, mut config: CrawlConfig) -> CrawlConfig {
        if let Some(path) = &self.entry_path {
            config.entry_path = path.clone();
        }
        if let Some(output) = &self.output {
            config.output_file = Some(output.clone());
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(subdomain) = &self.subdomain {
            config.scope.allowed_subdomain = subdomain.clone();
        }
        if let Some(scope) = self.domain_scope {
            config.scope.domain_scope = scope;
        }
        if let Some(scheme) = &self.entry_scheme {
            config.scope.entry_scheme = scheme.to_ascii_lowercase();
        }
        if let Some(scope) = self.scheme_scope {
            config.scope.scheme_scope = scope;
        }
        if let Some(max) = self.max_redirects {
            config.scope.max_redirects = max;
        }
        if let Some(depth) = self.max_depth {
            config.scope.max_depth = Some(depth);
        }
        if let Some(agent) = &self.user_agent {
            config.user_agent = agent.clone();
        }
        if let Some(delay) = self.delay_ms {
            config.request_delay_ms = Some(delay);
        }
        if let Some(timeout) = self.timeout_secs {
            config.timeout_secs = timeout;
        }
        if let Some(dir) = &self.work_dir {
            config.work_dir = Some(dir.clone());
        }
        config
    }
}
