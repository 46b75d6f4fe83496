//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests of a run, including:
//! - Building the HTTP client with a descriptive user agent string
//! - Bounding concurrent requests with one semaphore shared by pages,
//!   images, sitemaps and manifests
//! - Error classification (transport failure, timeout, non-2xx status)

use crate::config::{HttpConfig, UserAgentConfig};
use crate::{MirrorError, Result};
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the resource
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value (empty if absent)
        content_type: String,
        /// Raw body bytes
        body: Vec<u8>,
    },

    /// The server answered with a non-2xx status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, DNS failure, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
        /// The request ran out of time
        timed_out: bool,
    },
}

/// A successfully fetched resource
#[derive(Debug, Clone)]
pub struct Fetched {
    /// Final URL after redirects
    pub final_url: String,
    /// Content-Type header value (empty if absent)
    pub content_type: String,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl Fetched {
    /// Returns the body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns true if the body may be an HTML page
    ///
    /// A missing Content-Type header is given the benefit of the doubt.
    pub fn is_html(&self) -> bool {
        self.content_type.is_empty() || self.content_type.contains("html")
    }
}

impl FetchResult {
    /// Converts the result into the crate error taxonomy
    pub fn into_result(self, url: &str) -> Result<Fetched> {
        match self {
            Self::Success {
                final_url,
                content_type,
                body,
                ..
            } => Ok(Fetched {
                final_url,
                content_type,
                body,
            }),
            Self::HttpError { status_code } => Err(MirrorError::HttpStatus {
                url: url.to_string(),
                status: status_code,
            }),
            Self::NetworkError {
                timed_out: true, ..
            } => Err(MirrorError::Timeout {
                url: url.to_string(),
            }),
            Self::NetworkError { error, .. } => Err(MirrorError::Transport {
                url: url.to_string(),
                message: error,
            }),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `http` - Timeouts and redirect limit
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use docmirror::config::{HttpConfig, UserAgentConfig};
/// use docmirror::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    http: &HttpConfig,
) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(http.timeout_secs))
        .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
        .redirect(Policy::limited(http.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP capability shared by every task of a run
///
/// Cloning is cheap; all clones share the same client and the same permit pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    permits: Arc<Semaphore>,
}

impl HttpFetcher {
    /// Creates a fetcher allowing at most `max_in_flight` concurrent requests
    pub fn new(client: Client, max_in_flight: usize) -> Self {
        Self {
            client,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Fetches a URL, holding one permit for the request and the body download
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return FetchResult::NetworkError {
                    error: "fetcher shut down".to_string(),
                    timed_out: false,
                }
            }
        };

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return classify_error(e),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchResult::HttpError {
                status_code: status.as_u16(),
            };
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        match response.bytes().await {
            Ok(body) => FetchResult::Success {
                final_url,
                status_code: status.as_u16(),
                content_type,
                body: body.to_vec(),
            },
            Err(e) => classify_error(e),
        }
    }

    /// Fetches a URL and maps any failure into a [`MirrorError`]
    pub async fn get(&self, url: &str) -> Result<Fetched> {
        self.fetch(url).await.into_result(url)
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            timed_out: true,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
            timed_out: false,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            timed_out: false,
        }
    }
}
