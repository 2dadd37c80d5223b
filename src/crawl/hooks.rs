// src/crawl/hooks.rs
// =============================================================================
// Caller-supplied decision points inside the crawl loop.
//
// There are five points:
//   pre_fetch          before a URL is fetched
//   post_fetch_success after a 200, before links are extracted
//   unscoped_link      for each link the scope filter rejected
//   redirect           before a redirect is followed
//   transport_error    when a request failed without a response
//
// Each point holds an ordered list of closures. They run in registration
// order and the first one that returns something other than the point's
// default decision wins; the rest are not called. With no hooks attached the
// default decision applies.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::fetch::{FetchResponse, TransportError};
use crate::scope::OutOfScopeReason;

/// Decision before fetching. Default: `Proceed` with the same URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "url", rename_all = "snake_case")]
pub enum PreFetchDecision {
    /// Fetch this URL (possibly rewritten)
    Proceed(String),
    /// Mark the URL visited without fetching it
    Skip,
    Abort,
}

/// Decision after a 200. Default: `Proceed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostFetchDecision {
    Proceed,
    /// Keep the page in the output but do not follow its links
    SkipExtraction,
    Abort,
}

/// Decision for a link outside the scope. Default: `Drop`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "url", rename_all = "snake_case")]
pub enum UnscopedLinkDecision {
    Drop,
    /// Enqueue this URL instead
    Replace(String),
    Abort,
}

/// Decision before following a redirect. Default: `Follow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectDecision {
    Follow,
    /// Do not follow; also resets the redirect counter
    Cancel,
    Abort,
}

/// Decision after a transport failure. Default: `Continue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorDecision {
    Continue,
    Abort,
}

type PreFetchHook = Box<dyn FnMut(&str) -> PreFetchDecision + Send>;
type PostFetchHook = Box<dyn FnMut(&str, &FetchResponse) -> PostFetchDecision + Send>;
type UnscopedLinkHook = Box<dyn FnMut(&str, OutOfScopeReason) -> UnscopedLinkDecision + Send>;
type RedirectHook = Box<dyn FnMut(&str, &str, &FetchResponse) -> RedirectDecision + Send>;
type TransportErrorHook = Box<dyn FnMut(&str, &TransportError) -> TransportErrorDecision + Send>;

/// The hooks attached to one crawl.
#[derive(Default)]
pub struct Hooks {
    pre_fetch: Vec<PreFetchHook>,
    post_fetch_success: Vec<PostFetchHook>,
    unscoped_link: Vec<UnscopedLinkHook>,
    redirect: Vec<RedirectHook>,
    transport_error: Vec<TransportErrorHook>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("pre_fetch", &self.pre_fetch.len())
            .field("post_fetch_success", &self.post_fetch_success.len())
            .field("unscoped_link", &self.unscoped_link.len())
            .field("redirect", &self.redirect.len())
            .field("transport_error", &self.transport_error.len())
            .finish()
    }
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_pre_fetch(
        mut self,
        hook: impl FnMut(&str) -> PreFetchDecision + Send + 'static,
    ) -> Self {
        self.pre_fetch.push(Box::new(hook));
        self
    }

    pub fn on_post_fetch_success(
        mut self,
        hook: impl FnMut(&str, &FetchResponse) -> PostFetchDecision + Send + 'static,
    ) -> Self {
        self.post_fetch_success.push(Box::new(hook));
        self
    }

    pub fn on_unscoped_link(
        mut self,
        hook: impl FnMut(&str, OutOfScopeReason) -> UnscopedLinkDecision + Send + 'static,
    ) -> Self {
        self.unscoped_link.push(Box::new(hook));
        self
    }

    pub fn on_redirect(
        mut self,
        hook: impl FnMut(&str, &str, &FetchResponse) -> RedirectDecision + Send + 'static,
    ) -> Self {
        self.redirect.push(Box::new(hook));
        self
    }

    pub fn on_transport_error(
        mut self,
        hook: impl FnMut(&str, &TransportError) -> TransportErrorDecision + Send + 'static,
    ) -> Self {
        self.transport_error.push(Box::new(hook));
        self
    }

    pub(crate) fn pre_fetch(&mut self, url: &str) -> PreFetchDecision {
        for hook in &mut self.pre_fetch {
            match hook(url) {
                PreFetchDecision::Proceed(same) if same == url => continue,
                decision => return decision,
            }
        }
        PreFetchDecision::Proceed(url.to_string())
    }

    pub(crate) fn post_fetch_success(&mut self, url: &str, response: &FetchResponse) -> PostFetchDecision {
        self.post_fetch_success
            .iter_mut()
            .map(|hook| hook(url, response))
            .find(|decision| *decision != PostFetchDecision::Proceed)
            .unwrap_or(PostFetchDecision::Proceed)
    }

    pub(crate) fn unscoped_link(&mut self, url: &str, reason: OutOfScopeReason) -> UnscopedLinkDecision {
        self.unscoped_link
            .iter_mut()
            .map(|hook| hook(url, reason))
            .find(|decision| *decision != UnscopedLinkDecision::Drop)
            .unwrap_or(UnscopedLinkDecision::Drop)
    }

    pub(crate) fn redirect(&mut self, from: &str, to: &str, response: &FetchResponse) -> RedirectDecision {
        self.redirect
            .iter_mut()
            .map(|hook| hook(from, to, response))
            .find(|decision| *decision != RedirectDecision::Follow)
            .unwrap_or(RedirectDecision::Follow)
    }

    pub(crate) fn transport_error(&mut self, url: &str, error: &TransportError) -> TransportErrorDecision {
        self.transport_error
            .iter_mut()
            .map(|hook| hook(url, error))
            .find(|decision| *decision != TransportErrorDecision::Continue)
            .unwrap_or(TransportErrorDecision::Continue)
    }
}
