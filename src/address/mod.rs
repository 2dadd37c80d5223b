// src/address/mod.rs
// =============================================================================
// This module turns raw href strings into structured URL components and back.
//
// We do not hand hrefs straight to `url::Url` because the crawler needs a
// parser with a fixed, predictable contract:
// - components are peeled off the front of the string in a fixed order
//   (scheme, userinfo, host, port, path, query, fragment)
// - anything not found is simply left empty
// - a small set of validity rules decides whether the result is a link
//
// Relative references ("/about", "../docs") parse fine with an empty host and
// are completed later by `resolve`.
// =============================================================================

mod resolve;

pub use resolve::{normalize, resolve, resolve_raw};

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// Ordered component patterns. Each one is anchored and consumes a prefix of
// whatever the previous step left behind.
static SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*)://").expect("valid scheme pattern"));
static USERINFO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^:@/?#\s]+)(?::([^@/?#\s]*))?@").expect("valid userinfo pattern")
});
static HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^:/?#@\s]+").expect("valid host pattern"));
static PORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:(\d+)").expect("valid port pattern"));
static PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^?#]*").expect("valid path pattern"));
static QUERY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\?([^#]*)").expect("valid query pattern"));
static FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^#(.*)").expect("valid fragment pattern"));
// `javascript:`, `tel:`, `data:` and friends: a scheme with no authority.
static OPAQUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("valid opaque pattern"));

/// A URL broken into the pieces the crawler reasons about.
///
/// `domain` and `subdomain` are derived from `host`; `path_segments` and
/// `query_params` are derived from `path` and `query`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlComponents {
    pub scheme: String,
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: String,
    pub path: String,
    pub query: String,
    pub fragment: String,
    pub domain: String,
    pub subdomain: String,
    pub path_segments: Vec<String>,
    pub query_params: Vec<(String, String)>,
}

impl UrlComponents {
    /// True for a relative reference that still needs a base to be fetched.
    pub fn is_relative(&self) -> bool {
        self.host.is_empty()
    }

    /// Re-derives `domain`/`subdomain` after `host` changed.
    pub(crate) fn set_host(&mut self, host: &str) {
        let (domain, subdomain) = split_host(host);
        self.host = host.to_string();
        self.domain = domain;
        self.subdomain = subdomain;
    }

    /// Re-derives `path_segments` after `path` changed.
    pub(crate) fn set_path(&mut self, path: String) {
        self.path_segments = split_path(&path);
        self.path = path;
    }
}

impl fmt::Display for UrlComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(self))
    }
}

/// Parses a raw URL or relative reference.
///
/// Returns `None` when the string is not a crawlable link:
/// - nothing could be extracted at all
/// - a scheme was found but no host followed it
/// - there is neither a host nor a path (query-only or fragment-only hrefs)
/// - the userinfo username is `mailto` (`mailto:someone@example.com`)
/// - a host-less path starts with an opaque scheme (`javascript:void(0)`)
pub fn parse(raw: &str) -> Option<UrlComponents> {
    let mut rest = raw.trim();
    let mut parts = UrlComponents::default();

    if let Some(caps) = SCHEME.captures(rest) {
        parts.scheme = caps[1].to_ascii_lowercase();
        rest = &rest[caps[0].len()..];
    }

    // Protocol-relative form: "//cdn.example.com/app.js"
    let mut has_authority = !parts.scheme.is_empty();
    if !has_authority {
        if let Some(stripped) = rest.strip_prefix("//") {
            rest = stripped;
            has_authority = true;
        }
    }

    if let Some(caps) = USERINFO.captures(rest) {
        parts.username = caps[1].to_string();
        parts.password = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
        rest = &rest[caps[0].len()..];
        has_authority = true;
    }

    if has_authority {
        if let Some(m) = HOST.find(rest) {
            let host = m.as_str().to_ascii_lowercase();
            rest = &rest[m.end()..];
            parts.set_host(&host);
        }
        if let Some(caps) = PORT.captures(rest) {
            parts.port = caps[1].to_string();
            rest = &rest[caps[0].len()..];
        }
    }

    if let Some(m) = PATH.find(rest) {
        parts.path = m.as_str().to_string();
        rest = &rest[m.end()..];
    }

    if let Some(caps) = QUERY.captures(rest) {
        parts.query = caps[1].to_string();
        rest = &rest[caps[0].len()..];
    }

    if let Some(caps) = FRAGMENT.captures(rest) {
        parts.fragment = caps[1].to_string();
    }

    if !is_valid(&parts) {
        return None;
    }

    parts.path_segments = split_path(&parts.path);
    parts.query_params = url::form_urlencoded::parse(parts.query.as_bytes())
        .into_owned()
        .collect();

    Some(parts)
}

fn is_valid(parts: &UrlComponents) -> bool {
    let nothing_extracted = parts.scheme.is_empty()
        && parts.username.is_empty()
        && parts.host.is_empty()
        && parts.port.is_empty()
        && parts.path.is_empty()
        && parts.query.is_empty()
        && parts.fragment.is_empty();
    if nothing_extracted {
        return false;
    }
    if !parts.scheme.is_empty() && parts.host.is_empty() {
        return false;
    }
    if parts.host.is_empty() && parts.path.is_empty() {
        return false;
    }
    if parts.username.eq_ignore_ascii_case("mailto") {
        return false;
    }
    if parts.host.is_empty() && OPAQUE.is_match(&parts.path) {
        return false;
    }
    true
}

/// Reconstructs a URL string from its components.
///
/// A host without a scheme is written protocol-relative (`//host/...`).
/// Userinfo, port, query and fragment are only written when non-empty.
pub fn serialize(parts: &UrlComponents) -> String {
    let mut out = String::new();

    if !parts.scheme.is_empty() {
        out.push_str(&parts.scheme);
        out.push_str("://");
    } else if !parts.host.is_empty() {
        out.push_str("//");
    }

    if !parts.username.is_empty() {
        out.push_str(&parts.username);
        if !parts.password.is_empty() {
            out.push(':');
            out.push_str(&parts.password);
        }
        out.push('@');
    }

    out.push_str(&parts.host);
    if !parts.port.is_empty() {
        out.push(':');
        out.push_str(&parts.port);
    }

    if parts.path.starts_with('.') {
        out.push('/');
    }
    out.push_str(&parts.path);

    if !parts.query.is_empty() {
        out.push('?');
        out.push_str(&parts.query);
    }
    if !parts.fragment.is_empty() {
        out.push('#');
        out.push_str(&parts.fragment);
    }

    out
}

/// Splits a host into (domain, subdomain).
///
/// "a.b.example.com" -> ("example.com", "a.b"); "example.com" -> ("example.com", "")
pub fn split_host(host: &str) -> (String, String) {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return (host.to_string(), String::new());
    }
    let cut = labels.len() - 2;
    (labels[cut..].join("."), labels[..cut].join("."))
}

// "/" and "" both give one root segment.
fn split_path(path: &str) -> Vec<String> {
    path.trim_matches('/').split('/').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absolute_url() {
        let parts = parse("https://user:pw@Docs.Example.com:8443/a/b?x=1&y=2&x=3#top").unwrap();
        assert_eq!(parts.scheme, "https");
        assert_eq!(parts.username, "user");
        assert_eq!(parts.password, "pw");
        assert_eq!(parts.host, "docs.example.com");
        assert_eq!(parts.port, "8443");
        assert_eq!(parts.path, "/a/b");
        assert_eq!(parts.query, "x=1&y=2&x=3");
        assert_eq!(parts.fragment, "top");
        assert_eq!(parts.domain, "example.com");
        assert_eq!(parts.subdomain, "docs");
        assert_eq!(parts.path_segments, vec!["a", "b"]);
        assert_eq!(
            parts.query_params,
            vec![
                ("x".to_string(), "1".to_string()),
                ("y".to_string(), "2".to_string()),
                ("x".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_round_trip() {
        let raw = "https://www.example.com/guide/intro?lang=en&page=2#setup";
        let parts = parse(raw).unwrap();
        assert_eq!(serialize(&parts), raw);
        assert_eq!(parse(&serialize(&parts)).unwrap(), parts);
    }

    #[test]
    fn test_protocol_relative_round_trip() {
        let parts = parse("//cdn.example.com/app.js").unwrap();
        assert_eq!(parts.scheme, "");
        assert_eq!(parts.host, "cdn.example.com");
        assert_eq!(parts.to_string(), "//cdn.example.com/app.js");
    }

    #[test]
    fn test_domain_split() {
        assert_eq!(
            split_host("a.b.example.com"),
            ("example.com".to_string(), "a.b".to_string())
        );
        assert_eq!(
            split_host("example.com"),
            ("example.com".to_string(), String::new())
        );
        assert_eq!(split_host("localhost"), ("localhost".to_string(), String::new()));
    }

    #[test]
    fn test_relative_path_has_no_host() {
        let parts = parse("/about").unwrap();
        assert!(parts.is_relative());
        assert_eq!(parts.path, "/about");
        assert_eq!(parts.path_segments, vec!["about"]);
    }

    #[test]
    fn test_root_path_is_one_segment() {
        let parts = parse("https://example.com").unwrap();
        assert_eq!(parts.path, "");
        assert_eq!(parts.path_segments, vec![""]);
        let parts = parse("https://example.com/").unwrap();
        assert_eq!(parts.path_segments, vec![""]);
    }

    #[test]
    fn test_reject_mailto() {
        assert_eq!(parse("mailto:test@example.com"), None);
        assert_eq!(parse("MAILTO:test@example.com"), None);
    }

    #[test]
    fn test_reject_scheme_without_host() {
        assert_eq!(parse("https://"), None);
        assert_eq!(parse("http:///path"), None);
    }

    #[test]
    fn test_reject_empty_and_partial() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   "), None);
        // Query-only and fragment-only hrefs carry neither host nor path
        assert_eq!(parse("?page=2"), None);
        assert_eq!(parse("#section"), None);
    }

    #[test]
    fn test_reject_opaque_schemes() {
        assert_eq!(parse("javascript:void(0)"), None);
        assert_eq!(parse("tel:+15551234"), None);
    }

    #[test]
    fn test_serialize_dot_path() {
        let parts = UrlComponents {
            scheme: "https".to_string(),
            host: "example.com".to_string(),
            path: "./docs".to_string(),
            ..Default::default()
        };
        assert_eq!(serialize(&parts), "https://example.com/./docs");
    }
}
