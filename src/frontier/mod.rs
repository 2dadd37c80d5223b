// src/frontier/mod.rs
// =============================================================================
// The frontier: which URLs were already fetched (visited) and which are still
// waiting (pending).
//
// Invariants every store keeps:
// - a URL is never visited and pending at the same time
// - enqueueing a visited or already pending URL does nothing
// - each pending URL comes out of dequeue_next() exactly once
//
// Two stores ship with the crate:
// - MemoryFrontier: HashSet + VecDeque, gone when the session ends
// - SqliteFrontier: a SQLite file in the session directory, survives restarts
//   if that directory is kept
// =============================================================================

mod sqlite;

pub use sqlite::SqliteFrontier;

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;

use crate::error::FrontierError;

pub type Result<T> = std::result::Result<T, FrontierError>;

/// Visited/pending URL sets for one crawl session.
#[async_trait]
pub trait Frontier: Send + Sync {
    /// Records `url` as fetched and drops it from pending.
    async fn mark_visited(&mut self, url: &str) -> Result<()>;

    async fn is_visited(&self, url: &str) -> Result<bool>;

    /// Adds `url` to pending. Returns false (and changes nothing) when the URL
    /// is already visited or queued.
    async fn enqueue(&mut self, url: &str) -> Result<bool>;

    async fn is_queued(&self, url: &str) -> Result<bool>;

    /// Removes and returns the oldest pending URL.
    async fn dequeue_next(&mut self) -> Result<Option<String>>;

    async fn pending_count(&self) -> Result<u64>;

    async fn visited_count(&self) -> Result<u64>;

    /// True when the URL is visited or pending.
    async fn is_known(&self, url: &str) -> Result<bool> {
        Ok(self.is_visited(url).await? || self.is_queued(url).await?)
    }

    /// Releases any handles the store holds. Called once, when the session ends.
    async fn close(&self) {}
}

/// In-process frontier.
#[derive(Debug, Default)]
pub struct MemoryFrontier {
    visited: HashSet<String>,
    queued: HashSet<String>,
    // May hold URLs that were visited while pending; dequeue skips them.
    order: VecDeque<String>,
}

impl MemoryFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Frontier for MemoryFrontier {
    async fn mark_visited(&mut self, url: &str) -> Result<()> {
        self.queued.remove(url);
        self.visited.insert(url.to_string());
        Ok(())
    }

    async fn is_visited(&self, url: &str) -> Result<bool> {
        Ok(self.visited.contains(url))
    }

    async fn enqueue(&mut self, url: &str) -> Result<bool> {
        if self.visited.contains(url) || self.queued.contains(url) {
            return Ok(false);
        }
        self.queued.insert(url.to_string());
        self.order.push_back(url.to_string());
        Ok(true)
    }

    async fn is_queued(&self, url: &str) -> Result<bool> {
        Ok(self.queued.contains(url))
    }

    async fn dequeue_next(&mut self) -> Result<Option<String>> {
        while let Some(url) = self.order.pop_front() {
            if self.queued.remove(&url) {
                return Ok(Some(url));
            }
        }
        Ok(None)
    }

    async fn pending_count(&self) -> Result<u64> {
        Ok(self.queued.len() as u64)
    }

    async fn visited_count(&self) -> Result<u64> {
        Ok(self.visited.len() as u64)
    }
}
