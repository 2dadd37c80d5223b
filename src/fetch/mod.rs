// src/fetch/mod.rs
// =============================================================================
// The crawler's two outside collaborators on the network side.
//
// Submodules:
// - http: one GET per URL with redirects disabled
// - html: raw anchor targets from a page body
// =============================================================================

mod html;
mod http;

pub use html::extract_anchor_targets;
pub use http::{FetchResponse, Fetcher, HttpFetcher, TransportError};
