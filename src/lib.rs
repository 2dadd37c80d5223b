// src/lib.rs
// =============================================================================
// site-crawler: a single-session website crawler.
//
// Given a seed and a scope, a session repeatedly fetches a page, pulls out
// its links, normalizes and scopes them, queues the new ones and follows
// redirect chains, until nothing is left or a hook says stop.
//
// Modules, leaves first:
// - address: URL parsing, resolution and serialization
// - scope: is a link inside the crawl?
// - frontier: visited/pending URL stores
// - fetch: HTTP GET and anchor extraction
// - output: fetched-URL sink and log streams
// - crawl: hooks, sessions and the crawl loop
// =============================================================================

pub mod address;
pub mod config;
pub mod crawl;
pub mod error;
pub mod fetch;
pub mod frontier;
pub mod output;
pub mod scope;

pub use address::UrlComponents;
pub use config::{CrawlConfig, DomainScope, LogFormat, SchemeScope, ScopeConfig};
pub use crawl::{crawl_site, CrawlOutcome, CrawlReport, Crawler, Hooks, Session};
pub use error::{FrontierError, SessionError};
pub use fetch::{FetchResponse, Fetcher, HttpFetcher, TransportError};
pub use frontier::{Frontier, MemoryFrontier, SqliteFrontier};
