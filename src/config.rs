// src/config.rs
// =============================================================================
// Per-session crawl configuration.
//
// `ScopeConfig` holds the rules the scope filter needs. `CrawlConfig` wraps it
// with everything else one traversal call takes: where the crawl starts,
// where output and logs go, how to talk HTTP.
//
// Both deserialize from JSON with every field optional, so a config file
// only has to mention what it changes.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::address::{split_host, UrlComponents};

/// Default cap on consecutive followed redirects.
pub const DEFAULT_MAX_REDIRECTS: u32 = 20;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Which link schemes may be crawled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SchemeScope {
    /// Any scheme is fine
    #[default]
    Any,
    /// Only links using the entry scheme
    MatchEntry,
}

/// How far across hosts of the seed's domain a crawl may wander.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DomainScope {
    /// Every host under the seed's registrable domain
    #[default]
    DomainOnly,
    /// Only hosts whose subdomain equals the allowed subdomain
    SubdomainOnly,
}

/// Line format of the named log streams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    Plain,
    Csv,
}

/// Rules consulted by the scope filter and the redirect handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub entry_scheme: String,
    pub scheme_scope: SchemeScope,
    pub domain_scope: DomainScope,
    pub allowed_subdomain: String,
    /// Maximum number of path segments a crawled URL may have.
    pub max_depth: Option<usize>,
    pub max_redirects: u32,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            entry_scheme: "https".to_string(),
            scheme_scope: SchemeScope::Any,
            domain_scope: DomainScope::DomainOnly,
            allowed_subdomain: String::new(),
            max_depth: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// Where successfully fetched URLs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Memory,
    File(PathBuf),
}

/// Everything one traversal call needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    #[serde(flatten)]
    pub scope: ScopeConfig,
    /// Path appended to a bare host to build the seed URL.
    pub entry_path: String,
    pub output_file: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_format: LogFormat,
    pub user_agent: String,
    pub request_delay_ms: Option<u64>,
    pub timeout_secs: u64,
    /// Keep the session storage here instead of a throwaway temp directory.
    pub work_dir: Option<PathBuf>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            scope: ScopeConfig::default(),
            entry_path: "/".to_string(),
            output_file: None,
            log_dir: None,
            log_format: LogFormat::Plain,
            user_agent: concat!("site-crawler/", env!("CARGO_PKG_VERSION")).to_string(),
            request_delay_ms: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            work_dir: None,
        }
    }
}

impl CrawlConfig {
    pub fn output_target(&self) -> OutputTarget {
        match &self.output_file {
            Some(path) => OutputTarget::File(path.clone()),
            None => OutputTarget::Memory,
        }
    }

    pub fn request_delay(&self) -> Option<Duration> {
        self.request_delay_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the seed URL for a crawl target.
    ///
    /// A target that already carries a scheme is used as is. A bare host
    /// ("example.com", "127.0.0.1:8080") gets the entry scheme and entry path,
    /// and the explicit subdomain when the host has none of its own.
    pub fn seed_url(&self, target: &str) -> String {
        let target = target.trim();
        if target.contains("://") {
            return target.to_string();
        }

        let host = target.trim_end_matches('/');
        let mut authority = host.to_string();
        if !self.scope.allowed_subdomain.is_empty() {
            let bare_host = host.split(':').next().unwrap_or(host);
            let (_, subdomain) = split_host(bare_host);
            if subdomain.is_empty() {
                authority = format!("{}.{}", self.scope.allowed_subdomain, host);
            }
        }

        let path = if self.entry_path.starts_with('/') {
            self.entry_path.clone()
        } else {
            format!("/{}", self.entry_path)
        };

        format!("{}://{}{}", self.scope.entry_scheme, authority, path)
    }

    /// Repairs settings that contradict each other or the seed.
    ///
    /// Nothing here is fatal: each inconsistency falls back to the wider,
    /// safe setting and is returned as a note for the general log.
    pub fn reconcile(&mut self, seed: &UrlComponents) -> Vec<String> {
        let mut notes = Vec::new();

        if self.scope.domain_scope == DomainScope::SubdomainOnly
            && self.scope.allowed_subdomain.is_empty()
        {
            self.scope.domain_scope = DomainScope::DomainOnly;
            notes.push(
                "subdomain-only scope without a subdomain; widened to domain-only".to_string(),
            );
        }

        if self.scope.entry_scheme.is_empty() {
            self.scope.entry_scheme = seed.scheme.clone();
            notes.push(format!("no entry scheme; using seed scheme '{}'", seed.scheme));
        } else if self.scope.scheme_scope == SchemeScope::MatchEntry
            && !seed.scheme.is_empty()
            && self.scope.entry_scheme != seed.scheme
        {
            notes.push(format!(
                "entry scheme '{}' conflicts with seed scheme '{}'; using the seed scheme",
                self.scope.entry_scheme, seed.scheme
            ));
            self.scope.entry_scheme = seed.scheme.clone();
        }

        for note in &notes {
            warn!(note = %note, "configuration adjusted");
        }

        notes
    }
}
