// src/scope.rs
// =============================================================================
// Decides whether a discovered link belongs to the crawl.
//
// This is a pure function of (candidate, base, config). The checks run in a
// fixed order and the first one that fails becomes the reason:
//   scheme -> domain -> subdomain -> depth
//
// An empty scheme or domain on the candidate counts as "same as the page",
// since resolution fills those in from the base anyway.
// =============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::UrlComponents;
use crate::config::{DomainScope, SchemeScope, ScopeConfig};

/// Why a link was kept out of the crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfScopeReason {
    Scheme,
    Domain,
    Subdomain,
    Depth,
}

impl fmt::Display for OutOfScopeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutOfScopeReason::Scheme => "scheme",
            OutOfScopeReason::Domain => "domain",
            OutOfScopeReason::Subdomain => "subdomain",
            OutOfScopeReason::Depth => "depth",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum ScopeDecision {
    InScope,
    OutOfScope(OutOfScopeReason),
}

impl ScopeDecision {
    pub fn is_in_scope(&self) -> bool {
        matches!(self, ScopeDecision::InScope)
    }
}

/// Checks `candidate` against the scope rules, relative to the crawl's `base`.
pub fn decide(candidate: &UrlComponents, base: &UrlComponents, cfg: &ScopeConfig) -> ScopeDecision {
    let scheme_ok = candidate.scheme.is_empty()
        || cfg.scheme_scope == SchemeScope::Any
        || candidate.scheme == cfg.entry_scheme;
    if !scheme_ok {
        return ScopeDecision::OutOfScope(OutOfScopeReason::Scheme);
    }

    if !candidate.domain.is_empty() && candidate.domain != base.domain {
        return ScopeDecision::OutOfScope(OutOfScopeReason::Domain);
    }

    if cfg.domain_scope == DomainScope::SubdomainOnly
        && candidate.subdomain != cfg.allowed_subdomain
    {
        return ScopeDecision::OutOfScope(OutOfScopeReason::Subdomain);
    }

    if let Some(max_depth) = cfg.max_depth {
        if candidate.path_segments.len() > max_depth {
            return ScopeDecision::OutOfScope(OutOfScopeReason::Depth);
        }
    }

    ScopeDecision::InScope
}
