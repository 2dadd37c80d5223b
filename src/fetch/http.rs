// src/fetch/http.rs
// =============================================================================
// This module performs the single HTTP GET the crawler needs per URL.
//
// Key functionality:
// - Makes HTTP GET requests with a custom User-Agent
// - Never follows redirects itself: the crawl engine has to see every 3xx
//   to keep its own redirect counter and loop checks
// - Sorts transport failures into a few categories (timeout, connect, ...)
//
// The `Fetcher` trait is the seam the engine talks to, so tests can swap in
// canned responses without a network.
// =============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::{redirect, Client};
use serde::{Deserialize, Serialize};
use tracing::debug;

// What the engine needs to know about one response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text (empty for redirects in practice)
    pub body: String,
    /// Raw `Location` header, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl FetchResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            location: None,
        }
    }

    pub fn redirect(status: u16, location: impl Into<String>) -> Self {
        Self {
            status,
            body: String::new(),
            location: Some(location.into()),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            location: None,
        }
    }

    /// 301, 302 and 307 are the redirects the crawler follows.
    pub fn is_followable_redirect(&self) -> bool {
        matches!(self.status, 301 | 302 | 307)
    }
}

/// Why a request produced no response at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum TransportError {
    /// Request timed out
    Timeout(String),
    /// Could not connect (DNS, refused, TLS handshake, ...)
    Connect(String),
    /// Headers arrived but the body could not be read
    Body(String),
    /// Anything else reqwest reports
    Other(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout(msg) => write!(f, "timeout: {}", msg),
            TransportError::Connect(msg) => write!(f, "connection failed: {}", msg),
            TransportError::Body(msg) => write!(f, "failed to read body: {}", msg),
            TransportError::Other(msg) => write!(f, "request failed: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

// Maps reqwest errors onto our categories
impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let message = error.to_string();
        if error.is_timeout() {
            TransportError::Timeout(message)
        } else if error.is_connect() {
            TransportError::Connect(message)
        } else if error.is_body() || error.is_decode() {
            TransportError::Body(message)
        } else {
            TransportError::Other(message)
        }
    }
}

/// Performs one GET without following redirects.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, TransportError>;
}

/// reqwest-backed fetcher used for real crawls.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds a client with redirects disabled
    //
    // Parameters:
    //   user_agent: sent with every request
    //   timeout: per-request timeout, the only timeout a crawl has
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, TransportError> {
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        debug!(url = %url, status, "fetched");

        // Only pages we extract links from need a body
        let body = if status == 200 {
            response.text().await?
        } else {
            String::new()
        };

        Ok(FetchResponse {
            status,
            body,
            location,
        })
    }
}
