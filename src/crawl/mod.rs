// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Sequential crawling from a seed, one request at a time
// - Scope rules (scheme, domain, subdomain, path depth) for discovered links
// - Redirect chains followed first, bounded by a counter and loop checks
// - Hooks to skip, rewrite or abort at five points of the crawl
// - Per-session storage that is cleaned up however the crawl ends
//
// Submodules:
// - hooks: the decision points and their decision types
// - session: per-crawl state and storage
// - engine: the crawl loop itself
// =============================================================================

mod engine;
mod hooks;
mod session;

pub use engine::{CrawlOutcome, CrawlReport, Crawler};
pub use hooks::{
    Hooks, PostFetchDecision, PreFetchDecision, RedirectDecision, TransportErrorDecision,
    UnscopedLinkDecision,
};
pub use session::{Session, SessionStorage};

use crate::config::CrawlConfig;
use crate::error::Result;
use crate::fetch::HttpFetcher;

// Crawls a site over HTTP with a SQLite-backed frontier
//
// Parameters:
//   target: a bare host ("example.com") or a full seed URL
//   config: scope, output and HTTP settings for this session
//   hooks: decision hooks (Hooks::new() for none)
//
// Returns: the crawl report once the session is done and its storage released
pub async fn crawl_site(target: &str, config: CrawlConfig, hooks: Hooks) -> Result<CrawlReport> {
    let fetcher = HttpFetcher::new(&config.user_agent, config.timeout())?;
    let session = Session::open(target, config).await?;
    Crawler::new(fetcher).with_hooks(hooks).run(session).await
}
