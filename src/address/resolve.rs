// src/address/resolve.rs
// =============================================================================
// Completes relative references against the page they were found on.
//
// Rules:
// - no host in the link -> borrow host, domain, subdomain and port from base
// - no scheme in the link -> borrow the base scheme
// - no path -> "/"
// - a host-less path without a leading "/" is merged with the directory of
//   the base path ("guide" on "/docs/intro" -> "/docs/guide")
// - "." and ".." segments are collapsed
// =============================================================================

use super::{parse, UrlComponents};

/// Fills in whatever `relative` is missing from `base`.
pub fn resolve(base: &UrlComponents, relative: &UrlComponents) -> UrlComponents {
    let mut out = relative.clone();

    if out.host.is_empty() {
        out.host = base.host.clone();
        out.domain = base.domain.clone();
        out.subdomain = base.subdomain.clone();
        if out.port.is_empty() {
            out.port = base.port.clone();
        }
        if !out.path.is_empty() && !out.path.starts_with('/') {
            out.path = merge(&base.path, &out.path);
        }
    }

    if out.scheme.is_empty() {
        out.scheme = base.scheme.clone();
    }

    let path = if out.path.is_empty() {
        "/".to_string()
    } else if out.path.starts_with('/') {
        remove_dot_segments(&out.path)
    } else {
        out.path.clone()
    };
    out.set_path(path);

    out
}

/// Parses `raw` and resolves it against `base`; `None` for malformed links.
pub fn resolve_raw(base: &UrlComponents, raw: &str) -> Option<UrlComponents> {
    parse(raw).map(|relative| resolve(base, &relative))
}

/// Parse, resolve and re-serialize in one step.
pub fn normalize(base: &UrlComponents, raw: &str) -> Option<String> {
    resolve_raw(base, raw).map(|parts| parts.to_string())
}

fn merge(base_path: &str, relative: &str) -> String {
    match base_path.rfind('/') {
        Some(idx) => format!("{}{}", &base_path[..=idx], relative),
        None => format!("/{}", relative),
    }
}

fn remove_dot_segments(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let last = segments.len() - 1;
    let mut out: Vec<&str> = Vec::with_capacity(segments.len());

    // segments[0] is the empty string before the leading '/'
    for (i, segment) in segments.iter().enumerate().skip(1) {
        match *segment {
            "." => {
                if i == last {
                    out.push("");
                }
            }
            ".." => {
                out.pop();
                if i == last {
                    out.push("");
                }
            }
            other => out.push(other),
        }
    }

    format!("/{}", out.join("/"))
}
