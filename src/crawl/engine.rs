// src/crawl/engine.rs
// =============================================================================
// This module drives a crawl session from its seed until nothing is left.
//
// How it works:
// 1. Pick the next URL: a "suggested next" target (the seed, or a redirect
//    we just decided to follow) beats whatever is waiting in the frontier
// 2. Fetch it with redirects disabled
// 3. On 200: record it, extract links, keep the in-scope ones
// 4. On 301/302/307: follow the target next, unless it is off-site, already
//    known, or the redirect chain is too long
// 5. Repeat until the frontier is empty or a hook aborts
//
// The whole thing is one loop over an explicit state value, so a crawl of a
// million pages uses the same stack as a crawl of one.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::hooks::{
    Hooks, PostFetchDecision, PreFetchDecision, RedirectDecision, TransportErrorDecision,
    UnscopedLinkDecision,
};
use super::session::Session;
use crate::address::{self, UrlComponents};
use crate::error::Result;
use crate::fetch::{extract_anchor_targets, FetchResponse, Fetcher, TransportError};
use crate::output::LogStream;
use crate::scope::{self, ScopeDecision};

/// How a crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlOutcome {
    /// Nothing left to fetch
    Exhausted,
    /// A hook asked to stop
    Aborted,
}

/// Summary of one finished crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub seed: String,
    pub outcome: CrawlOutcome,
    /// URLs that answered 200, in fetch order
    pub fetched: Vec<String>,
    pub requests: u64,
    pub redirects_followed: u64,
    pub transport_errors: u64,
    pub links_enqueued: u64,
    pub links_out_of_scope: u64,
    /// Frontier sizes when the crawl ended; `pending` is non-zero after an abort
    pub visited: u64,
    pub pending: u64,
}

impl CrawlReport {
    fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            outcome: CrawlOutcome::Exhausted,
            fetched: Vec::new(),
            requests: 0,
            redirects_followed: 0,
            transport_errors: 0,
            links_enqueued: 0,
            links_out_of_scope: 0,
            visited: 0,
            pending: 0,
        }
    }
}

// Where the loop is. Each state carries what the next step needs.
enum State {
    SelectingNext,
    Fetching(String),
    ProcessingSuccess(String, FetchResponse),
    ProcessingRedirect(String, FetchResponse),
    ProcessingError(String, TransportError),
    Done(CrawlOutcome),
}

/// Runs sessions against a fetcher, consulting hooks along the way.
pub struct Crawler<F> {
    fetcher: F,
    hooks: Hooks,
}

impl<F: Fetcher> Crawler<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            hooks: Hooks::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Crawls until done, then closes the session.
    ///
    /// The session is closed (and its storage released) whether the crawl
    /// finished, was aborted by a hook, or failed on the frontier store.
    #[instrument(skip_all, fields(seed = %session.seed_url()))]
    pub async fn run(&mut self, mut session: Session) -> Result<CrawlReport> {
        let result = self.drive(&mut session).await;
        let closed = session.close().await;

        let report = result?;
        closed?;

        info!(
            outcome = ?report.outcome,
            fetched = report.fetched.len(),
            requests = report.requests,
            "crawl finished"
        );
        Ok(report)
    }

    async fn drive(&mut self, session: &mut Session) -> Result<CrawlReport> {
        let mut report = CrawlReport::new(&session.seed_url);
        let mut state = State::SelectingNext;

        loop {
            state = match state {
                State::SelectingNext => self.select_next(session).await?,
                State::Fetching(url) => self.fetch(session, &mut report, url).await?,
                State::ProcessingSuccess(url, response) => {
                    self.process_success(session, &mut report, url, response)
                        .await?
                }
                State::ProcessingRedirect(url, response) => {
                    self.process_redirect(session, &mut report, url, response)
                        .await?
                }
                State::ProcessingError(url, error) => {
                    self.process_error(session, &mut report, url, error)
                }
                State::Done(outcome) => {
                    report.outcome = outcome;
                    report.visited = session.frontier.visited_count().await?;
                    report.pending = session.frontier.pending_count().await?;
                    return Ok(report);
                }
            };
        }
    }

    async fn select_next(&mut self, session: &mut Session) -> Result<State> {
        let candidate = match session.suggested_next.take() {
            Some(url) => Some(url),
            None => session.frontier.dequeue_next().await?,
        };

        let Some(url) = candidate else {
            return Ok(State::Done(CrawlOutcome::Exhausted));
        };

        // A resumed session may suggest a seed it already fetched
        if session.frontier.is_visited(&url).await? {
            return Ok(State::SelectingNext);
        }

        match self.hooks.pre_fetch(&url) {
            PreFetchDecision::Abort => {
                session.log.record(LogStream::General, &["abort", "pre_fetch", &url]);
                Ok(State::Done(CrawlOutcome::Aborted))
            }
            PreFetchDecision::Skip => {
                session.frontier.mark_visited(&url).await?;
                session.log.record(LogStream::General, &["skip", &url]);
                Ok(State::SelectingNext)
            }
            PreFetchDecision::Proceed(target) => {
                if target != url {
                    session.frontier.mark_visited(&url).await?;
                    debug!(from = %url, to = %target, "pre-fetch hook rewrote URL");
                }
                Ok(State::Fetching(target))
            }
        }
    }

    async fn fetch(&mut self, session: &mut Session, report: &mut CrawlReport, url: String) -> Result<State> {
        if report.requests > 0 {
            if let Some(delay) = session.config.request_delay() {
                tokio::time::sleep(delay).await;
            }
        }

        // Visited before the result is known, so nothing can queue it again
        session.frontier.mark_visited(&url).await?;
        report.requests += 1;

        match self.fetcher.fetch(&url).await {
            Ok(response) if response.status == 200 => Ok(State::ProcessingSuccess(url, response)),
            Ok(response) if response.is_followable_redirect() => {
                Ok(State::ProcessingRedirect(url, response))
            }
            Ok(response) => {
                let status = response.status.to_string();
                session.log.record(LogStream::General, &["status", &status, &url]);
                Ok(State::SelectingNext)
            }
            Err(error) => Ok(State::ProcessingError(url, error)),
        }
    }

    async fn process_success(
        &mut self,
        session: &mut Session,
        report: &mut CrawlReport,
        url: String,
        response: FetchResponse,
    ) -> Result<State> {
        session.output.append(&url)?;
        report.fetched.push(url.clone());
        session.redirect_count = 0;
        session.log.record(LogStream::General, &["fetched", &url]);

        match self.hooks.post_fetch_success(&url, &response) {
            PostFetchDecision::Abort => {
                session.log.record(LogStream::General, &["abort", "post_fetch_success", &url]);
                return Ok(State::Done(CrawlOutcome::Aborted));
            }
            PostFetchDecision::SkipExtraction => return Ok(State::SelectingNext),
            PostFetchDecision::Proceed => {}
        }

        let Some(page) = page_components(session, &url) else {
            return Ok(State::SelectingNext);
        };

        for href in extract_anchor_targets(&response.body) {
            // Malformed links are dropped without ceremony
            let Some(link) = address::resolve_raw(&page, &href) else {
                continue;
            };
            let link_url = link.to_string();

            match scope::decide(&link, &session.seed, &session.config.scope) {
                ScopeDecision::InScope => enqueue_new(session, report, &link_url).await?,
                ScopeDecision::OutOfScope(reason) => {
                    report.links_out_of_scope += 1;
                    match self.hooks.unscoped_link(&link_url, reason) {
                        UnscopedLinkDecision::Drop => {
                            debug!(url = %link_url, %reason, "link out of scope");
                        }
                        UnscopedLinkDecision::Replace(replacement) => {
                            if let Some(replacement) = address::normalize(&page, &replacement) {
                                enqueue_new(session, report, &replacement).await?;
                            }
                        }
                        UnscopedLinkDecision::Abort => {
                            session.log.record(LogStream::General, &["abort", "unscoped_link", &link_url]);
                            return Ok(State::Done(CrawlOutcome::Aborted));
                        }
                    }
                }
            }
        }

        Ok(State::SelectingNext)
    }

    async fn process_redirect(
        &mut self,
        session: &mut Session,
        report: &mut CrawlReport,
        url: String,
        response: FetchResponse,
    ) -> Result<State> {
        let Some(location) = response.location.as_deref() else {
            return Ok(State::SelectingNext);
        };
        let Some(page) = page_components(session, &url) else {
            return Ok(State::SelectingNext);
        };
        let Some(target_parts) = address::resolve_raw(&page, location) else {
            return Ok(State::SelectingNext);
        };
        let target = target_parts.to_string();

        // A redirect off-site is treated like an off-site link
        if let ScopeDecision::OutOfScope(reason) =
            scope::decide(&target_parts, &session.seed, &session.config.scope)
        {
            report.links_out_of_scope += 1;
            return match self.hooks.unscoped_link(&target, reason) {
                UnscopedLinkDecision::Drop => {
                    let reason = reason.to_string();
                    session
                        .log
                        .record(LogStream::Redirect, &["out_of_scope", &url, &target, &reason]);
                    Ok(State::SelectingNext)
                }
                UnscopedLinkDecision::Replace(replacement) => {
                    if let Some(replacement) = address::normalize(&page, &replacement) {
                        enqueue_new(session, report, &replacement).await?;
                    }
                    Ok(State::SelectingNext)
                }
                UnscopedLinkDecision::Abort => {
                    session.log.record(LogStream::General, &["abort", "unscoped_link", &target]);
                    Ok(State::Done(CrawlOutcome::Aborted))
                }
            };
        }

        if session.frontier.is_known(&target).await? {
            session.log.record(LogStream::Redirect, &["known", &url, &target]);
            return Ok(State::SelectingNext);
        }
        if session.redirect_count >= session.config.scope.max_redirects {
            session.log.record(LogStream::Redirect, &["limit", &url, &target]);
            return Ok(State::SelectingNext);
        }

        match self.hooks.redirect(&url, &target, &response) {
            RedirectDecision::Abort => {
                session.log.record(LogStream::General, &["abort", "redirect", &url]);
                Ok(State::Done(CrawlOutcome::Aborted))
            }
            RedirectDecision::Cancel => {
                session.redirect_count = 0;
                session.log.record(LogStream::Redirect, &["cancel", &url, &target]);
                Ok(State::SelectingNext)
            }
            RedirectDecision::Follow => {
                session.frontier.enqueue(&target).await?;
                session.redirect_count += 1;
                report.redirects_followed += 1;
                session.log.record(LogStream::Redirect, &["follow", &url, &target]);
                session.suggested_next = Some(target);
                Ok(State::SelectingNext)
            }
        }
    }

    fn process_error(
        &mut self,
        session: &mut Session,
        report: &mut CrawlReport,
        url: String,
        error: TransportError,
    ) -> State {
        report.transport_errors += 1;
        let message = error.to_string();
        session.log.record(LogStream::Error, &[&url, &message]);

        match self.hooks.transport_error(&url, &error) {
            TransportErrorDecision::Abort => State::Done(CrawlOutcome::Aborted),
            TransportErrorDecision::Continue => State::SelectingNext,
        }
    }
}

// The fetched URL as a resolution base
fn page_components(session: &Session, url: &str) -> Option<UrlComponents> {
    address::resolve_raw(&session.seed, url)
}

async fn enqueue_new(session: &mut Session, report: &mut CrawlReport, url: &str) -> Result<()> {
    if session.frontier.is_known(url).await? {
        return Ok(());
    }
    if session.frontier.enqueue(url).await? {
        report.links_enqueued += 1;
        debug!(url = %url, "enqueued");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfig;
    use async_trait::async_trait;
    use crate::scope::OutOfScopeReason;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    // Serves canned responses and remembers what was asked for
    #[derive(Default, Clone)]
    struct CannedFetcher {
        pages: HashMap<String, Result<FetchResponse, TransportError>>,
        requested: Arc<Mutex<Vec<String>>>,
    }

    impl CannedFetcher {
        fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), Ok(FetchResponse::ok(html)));
            self
        }

        fn redirect(mut self, url: &str, status: u16, location: &str) -> Self {
            self.pages
                .insert(url.to_string(), Ok(FetchResponse::redirect(status, location)));
            self
        }

        fn status(mut self, url: &str, status: u16) -> Self {
            self.pages.insert(url.to_string(), Ok(FetchResponse::status(status)));
            self
        }

        fn failure(mut self, url: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                Err(TransportError::Connect("refused".to_string())),
            );
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for CannedFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<FetchResponse, TransportError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .unwrap_or_else(|| Ok(FetchResponse::status(404)))
        }
    }

    fn session(config: CrawlConfig) -> Session {
        Session::in_memory("https://example.com/", config).unwrap()
    }

    async fn crawl(fetcher: CannedFetcher, hooks: Hooks, config: CrawlConfig) -> CrawlReport {
        Crawler::new(fetcher)
            .with_hooks(hooks)
            .run(session(config))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_follows_in_scope_links_only() {
        let fetcher = CannedFetcher::default()
            .page(
                "https://example.com/",
                r#"<a href="/about">About</a><a href="https://external.com/">Out</a>"#,
            )
            .page("https://example.com/about", r#"<a href="/">Home</a>"#);

        let report = crawl(fetcher.clone(), Hooks::new(), CrawlConfig::default()).await;

        assert_eq!(report.outcome, CrawlOutcome::Exhausted);
        assert_eq!(
            report.fetched,
            vec!["https://example.com/", "https://example.com/about"]
        );
        assert_eq!(report.links_out_of_scope, 1);
        assert!(!fetcher.requested().contains(&"https://external.com/".to_string()));
    }

    #[tokio::test]
    async fn test_redirect_loop_terminates() {
        let fetcher = CannedFetcher::default()
            .redirect("https://example.com/", 302, "/b")
            .redirect("https://example.com/b", 302, "/");

        let report = crawl(fetcher.clone(), Hooks::new(), CrawlConfig::default()).await;

        assert_eq!(report.outcome, CrawlOutcome::Exhausted);
        assert_eq!(report.redirects_followed, 1);
        assert_eq!(
            fetcher.requested(),
            vec!["https://example.com/", "https://example.com/b"]
        );
    }

    #[tokio::test]
    async fn test_redirect_chain_stops_at_limit() {
        let mut fetcher = CannedFetcher::default();
        for i in 0..10 {
            let from = if i == 0 {
                "https://example.com/".to_string()
            } else {
                format!("https://example.com/r{}", i)
            };
            fetcher = fetcher.redirect(&from, 301, &format!("/r{}", i + 1));
        }

        let mut config = CrawlConfig::default();
        config.scope.max_redirects = 3;
        let report = crawl(fetcher.clone(), Hooks::new(), config).await;

        assert_eq!(report.redirects_followed, 3);
        assert_eq!(fetcher.requested().len(), 4);
    }

    #[tokio::test]
    async fn test_redirect_counter_resets_on_success() {
        let fetcher = CannedFetcher::default()
            .page(
                "https://example.com/",
                r#"<a href="/a">A</a><a href="/b">B</a>"#,
            )
            .redirect("https://example.com/a", 302, "/a2")
            .page("https://example.com/a2", "")
            .redirect("https://example.com/b", 302, "/b2")
            .page("https://example.com/b2", "");

        let mut config = CrawlConfig::default();
        config.scope.max_redirects = 1;
        let report = crawl(fetcher, Hooks::new(), config).await;

        assert_eq!(report.redirects_followed, 2);
        assert!(report.fetched.contains(&"https://example.com/b2".to_string()));
    }

    #[tokio::test]
    async fn test_redirect_target_fetched_before_queue() {
        let fetcher = CannedFetcher::default()
            .page(
                "https://example.com/",
                r#"<a href="/old">Old</a><a href="/other">Other</a>"#,
            )
            .redirect("https://example.com/old", 301, "/new")
            .page("https://example.com/new", "")
            .page("https://example.com/other", "");

        let report = crawl(fetcher.clone(), Hooks::new(), CrawlConfig::default()).await;

        assert_eq!(
            fetcher.requested(),
            vec![
                "https://example.com/",
                "https://example.com/old",
                "https://example.com/new",
                "https://example.com/other",
            ]
        );
        assert_eq!(report.fetched.len(), 3);
    }

    #[tokio::test]
    async fn test_pre_fetch_abort_stops_crawl() {
        let fetcher = CannedFetcher::default().page("https://example.com/", "");
        let hooks = Hooks::new().on_pre_fetch(|_| PreFetchDecision::Abort);

        let report = crawl(fetcher.clone(), hooks, CrawlConfig::default()).await;

        assert_eq!(report.outcome, CrawlOutcome::Aborted);
        assert!(fetcher.requested().is_empty());
        assert_eq!(report.visited, 0);
    }

    #[tokio::test]
    async fn test_pre_fetch_skip_marks_visited() {
        let fetcher = CannedFetcher::default()
            .page(
                "https://example.com/",
                r#"<a href="/private">P</a><a href="/public">Q</a>"#,
            )
            .page("https://example.com/public", r#"<a href="/private">P</a>"#);
        let hooks = Hooks::new().on_pre_fetch(|url| {
            if url.ends_with("/private") {
                PreFetchDecision::Skip
            } else {
                PreFetchDecision::Proceed(url.to_string())
            }
        });

        let report = crawl(fetcher.clone(), hooks, CrawlConfig::default()).await;

        assert_eq!(
            report.fetched,
            vec!["https://example.com/", "https://example.com/public"]
        );
        assert!(!fetcher
            .requested()
            .contains(&"https://example.com/private".to_string()));
    }

    #[tokio::test]
    async fn test_skip_extraction_keeps_page() {
        let fetcher = CannedFetcher::default().page("https://example.com/", r#"<a href="/a">A</a>"#);
        let hooks = Hooks::new().on_post_fetch_success(|_, _| PostFetchDecision::SkipExtraction);

        let report = crawl(fetcher.clone(), hooks, CrawlConfig::default()).await;

        assert_eq!(report.fetched, vec!["https://example.com/"]);
        assert_eq!(fetcher.requested().len(), 1);
    }

    #[tokio::test]
    async fn test_unscoped_link_replacement() {
        let fetcher = CannedFetcher::default()
            .page("https://example.com/", r#"<a href="https://mirror.org/docs">Docs</a>"#)
            .page("https://example.com/docs", "");
        let hooks = Hooks::new().on_unscoped_link(|url, _| {
            UnscopedLinkDecision::Replace(url.replace("https://mirror.org", ""))
        });

        let report = crawl(fetcher, hooks, CrawlConfig::default()).await;

        assert_eq!(
            report.fetched,
            vec!["https://example.com/", "https://example.com/docs"]
        );
    }

    #[tokio::test]
    async fn test_transport_error_continues_by_default() {
        let fetcher = CannedFetcher::default()
            .page(
                "https://example.com/",
                r#"<a href="/down">Down</a><a href="/up">Up</a>"#,
            )
            .failure("https://example.com/down")
            .page("https://example.com/up", "");

        let report = crawl(fetcher, Hooks::new(), CrawlConfig::default()).await;

        assert_eq!(report.outcome, CrawlOutcome::Exhausted);
        assert_eq!(report.transport_errors, 1);
        assert_eq!(
            report.fetched,
            vec!["https://example.com/", "https://example.com/up"]
        );
    }

    #[tokio::test]
    async fn test_transport_error_abort() {
        let fetcher = CannedFetcher::default().failure("https://example.com/");
        let hooks = Hooks::new().on_transport_error(|_, _| TransportErrorDecision::Abort);

        let report = crawl(fetcher, hooks, CrawlConfig::default()).await;

        assert_eq!(report.outcome, CrawlOutcome::Aborted);
        assert!(report.fetched.is_empty());
    }

    #[tokio::test]
    async fn test_redirect_cancel_resets_counter() {
        let fetcher = CannedFetcher::default().redirect("https://example.com/", 302, "/next");
        let hooks = Hooks::new().on_redirect(|_, _, _| RedirectDecision::Cancel);

        let report = crawl(fetcher.clone(), hooks, CrawlConfig::default()).await;

        assert_eq!(report.redirects_followed, 0);
        assert_eq!(fetcher.requested(), vec!["https://example.com/"]);
    }

    #[tokio::test]
    async fn test_max_depth_limits_links() {
        let fetcher = CannedFetcher::default()
            .page(
                "https://example.com/",
                r#"<a href="/a">A</a><a href="/a/b">AB</a><a href="/a/b/c">ABC</a>"#,
            )
            .page("https://example.com/a", "")
            .page("https://example.com/a/b", "")
            .page("https://example.com/a/b/c", "");

        let mut config = CrawlConfig::default();
        config.scope.max_depth = Some(2);
        let report = crawl(fetcher, Hooks::new(), config).await;

        assert_eq!(
            report.fetched,
            vec![
                "https://example.com/",
                "https://example.com/a",
                "https://example.com/a/b",
            ]
        );
    }

    #[tokio::test]
    async fn test_off_site_redirect_is_not_followed() {
        let fetcher = CannedFetcher::default()
            .page("https://example.com/", r#"<a href="/login">Login</a>"#)
            .redirect("https://example.com/login", 302, "https://auth.other.org/sso")
            .page("https://auth.other.org/sso", "");

        let report = crawl(fetcher.clone(), Hooks::new(), CrawlConfig::default()).await;

        assert_eq!(report.outcome, CrawlOutcome::Exhausted);
        assert_eq!(report.fetched, vec!["https://example.com/"]);
        assert_eq!(report.redirects_followed, 0);
        assert_eq!(report.links_out_of_scope, 1);
        assert!(!fetcher
            .requested()
            .contains(&"https://auth.other.org/sso".to_string()));
    }

    #[tokio::test]
    async fn test_off_site_redirect_goes_through_unscoped_hook() {
        let fetcher = CannedFetcher::default()
            .redirect("https://example.com/", 301, "https://other.org/moved")
            .page("https://example.com/mirror", "");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_hook = Arc::clone(&seen);
        let hooks = Hooks::new().on_unscoped_link(move |url, reason| {
            seen_in_hook.lock().unwrap().push((url.to_string(), reason));
            UnscopedLinkDecision::Replace("/mirror".to_string())
        });

        let report = crawl(fetcher, hooks, CrawlConfig::default()).await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("https://other.org/moved".to_string(), OutOfScopeReason::Domain)]
        );
        assert_eq!(report.fetched, vec!["https://example.com/mirror"]);
    }

    #[tokio::test]
    async fn test_unscoped_link_abort_stops_crawl() {
        let fetcher = CannedFetcher::default()
            .page(
                "https://example.com/",
                r#"<a href="https://external.com/">Out</a><a href="/next">Next</a>"#,
            )
            .page("https://example.com/next", "");
        let hooks = Hooks::new().on_unscoped_link(|_, _| UnscopedLinkDecision::Abort);

        let report = crawl(fetcher.clone(), hooks, CrawlConfig::default()).await;

        assert_eq!(report.outcome, CrawlOutcome::Aborted);
        assert_eq!(report.fetched, vec!["https://example.com/"]);
        assert_eq!(fetcher.requested(), vec!["https://example.com/"]);
    }

    #[tokio::test]
    async fn test_redirect_abort_stops_crawl() {
        let fetcher = CannedFetcher::default()
            .redirect("https://example.com/", 302, "/moved")
            .page("https://example.com/moved", "");
        let hooks = Hooks::new().on_redirect(|_, _, _| RedirectDecision::Abort);

        let report = crawl(fetcher.clone(), hooks, CrawlConfig::default()).await;

        assert_eq!(report.outcome, CrawlOutcome::Aborted);
        assert_eq!(report.redirects_followed, 0);
        assert_eq!(fetcher.requested(), vec!["https://example.com/"]);
    }

    #[tokio::test]
    async fn test_redirect_without_location_moves_on() {
        let fetcher = CannedFetcher::default()
            .page("https://example.com/", r#"<a href="/nowhere">N</a><a href="/after">A</a>"#)
            .status("https://example.com/nowhere", 302)
            .page("https://example.com/after", "");

        let report = crawl(fetcher.clone(), Hooks::new(), CrawlConfig::default()).await;

        assert_eq!(report.outcome, CrawlOutcome::Exhausted);
        assert_eq!(report.redirects_followed, 0);
        assert_eq!(
            report.fetched,
            vec!["https://example.com/", "https://example.com/after"]
        );
    }

    #[tokio::test]
    async fn test_delay_applies_between_requests_only() {
        let fetcher = CannedFetcher::default()
            .page("https://example.com/", r#"<a href="/a">A</a><a href="/b">B</a>"#)
            .page("https://example.com/a", "")
            .page("https://example.com/b", "");

        let single = CannedFetcher::default().page("https://example.com/", "");
        let mut config = CrawlConfig::default();
        config.request_delay_ms = Some(200);

        // One page: no delay at all
        let started = Instant::now();
        crawl(single, Hooks::new(), config.clone()).await;
        assert!(started.elapsed() < Duration::from_millis(200));

        // Three pages: two gaps
        let started = Instant::now();
        let report = crawl(fetcher, Hooks::new(), config).await;
        assert_eq!(report.requests, 3);
        assert!(started.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_output() {
        let fetcher = CannedFetcher::default().page("https://example.com/", r#"<a href="/gone">G</a>"#);

        let report = crawl(fetcher.clone(), Hooks::new(), CrawlConfig::default()).await;

        assert_eq!(report.fetched, vec!["https://example.com/"]);
        assert_eq!(fetcher.requested().len(), 2);
        assert_eq!(report.visited, 2);
        assert_eq!(report.pending, 0);
    }
}
