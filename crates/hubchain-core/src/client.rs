//! HTTP client with browser identity and bounded retry
//!
//! Each resolution task owns its own `ChainClient`; the configuration is
//! immutable after construction so no referer or header state can leak
//! between concurrent chains.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, LOCATION, REFERER};

use crate::error::Result;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Redirect depth followed transparently by [`ChainClient::fetch`]
///
/// The redirect chaser does its own bounded hop accounting through
/// [`ChainClient::fetch_once`]; this limit only covers ordinary page
/// navigation.
const MAX_FOLLOWED_REDIRECTS: usize = 5;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 15)
    pub timeout_secs: u64,
    /// Maximum retry attempts for transient errors (default: 2)
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            max_retries: 2,
        }
    }
}

/// Coarse outcome classification of one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Success,
    HttpError,
    TransportError,
}

/// Result of a single fetch, returned instead of raised
///
/// Callers branch on `status`; the fetcher never propagates an error
/// across the component boundary.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: FetchStatus,
    pub status_code: Option<u16>,
    pub body: Option<String>,
    /// URL the response actually came from, after followed redirects
    pub final_url: String,
    pub error: Option<String>,
}

impl FetchResult {
    fn success(status_code: u16, body: String, final_url: String) -> Self {
        Self {
            status: FetchStatus::Success,
            status_code: Some(status_code),
            body: Some(body),
            final_url,
            error: None,
        }
    }

    fn http_error(status_code: u16, final_url: String) -> Self {
        Self {
            status: FetchStatus::HttpError,
            status_code: Some(status_code),
            body: None,
            final_url,
            error: None,
        }
    }

    fn transport(final_url: String, detail: impl Into<String>) -> Self {
        Self {
            status: FetchStatus::TransportError,
            status_code: None,
            body: None,
            final_url,
            error: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == FetchStatus::Success
    }

    /// Short human-readable status used in event messages
    pub fn describe(&self) -> String {
        match self.status {
            FetchStatus::Success => "OK".to_string(),
            FetchStatus::HttpError => match self.status_code {
                Some(code) => format!("HTTP {}", code),
                None => "HTTP error".to_string(),
            },
            FetchStatus::TransportError => self
                .error
                .clone()
                .unwrap_or_else(|| "transport error".to_string()),
        }
    }
}

/// Observable outcome of one redirect-chase hop
///
/// Produced by [`ChainClient::fetch_once`], which never follows
/// redirects itself.
#[derive(Debug)]
pub enum HopResponse {
    /// Response carried a redirect target (raw `Location` header value)
    Redirect { location: String },
    /// Terminal page: HTTP 200 with a normal body
    Page { body: String },
    /// Any other status or transport failure
    Failed { detail: String },
}

/// HTTP client wrapper with a consistent browser identity
///
/// Redirects are never followed by reqwest itself: ordinary navigation
/// goes through [`fetch`](Self::fetch) which follows them manually, and
/// the redirect chaser inspects each hop through
/// [`fetch_once`](Self::fetch_once).
pub struct ChainClient {
    client: reqwest::Client,
    max_retries: u32,
}

impl ChainClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.5"),
        );
        headers.insert(
            "Upgrade-Insecure-Requests",
            HeaderValue::from_static("1"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
        })
    }

    /// Fetch a page, following redirects and retrying transient failures
    ///
    /// A `referer` is scoped to this call only. Transport errors and 5xx
    /// responses are retried with exponential backoff up to the
    /// configured budget; 4xx responses are returned immediately.
    pub async fn fetch(&self, url: &str, referer: Option<&str>) -> FetchResult {
        let mut attempt = 0;
        loop {
            let result = self.fetch_following(url, referer).await;
            let retryable = result.status == FetchStatus::TransportError
                || result.status_code.is_some_and(|code| code >= 500);
            if retryable && attempt < self.max_retries {
                // 500ms, 1s, 2s, ...
                let backoff = Duration::from_millis(500u64 << attempt);
                tokio::time::sleep(backoff).await;
                attempt += 1;
                continue;
            }
            return result;
        }
    }

    /// One fetch attempt with manual redirect following
    async fn fetch_following(&self, url: &str, referer: Option<&str>) -> FetchResult {
        let mut current = url.to_string();

        for _ in 0..MAX_FOLLOWED_REDIRECTS {
            let response = match self.send(&current, referer).await {
                Ok(response) => response,
                Err(e) => return FetchResult::transport(current, describe_reqwest_error(&e)),
            };

            let status = response.status();

            if status.is_redirection() {
                if let Some(location) = header_str(response.headers().get(LOCATION)) {
                    current = crate::url::resolve_relative(&current, &location);
                    continue;
                }
                // Redirect without a usable Location header
                return FetchResult::http_error(status.as_u16(), current);
            }

            if status.is_success() {
                let code = status.as_u16();
                return match response.text().await {
                    Ok(body) => FetchResult::success(code, body, current),
                    Err(e) => FetchResult::transport(current, describe_reqwest_error(&e)),
                };
            }

            return FetchResult::http_error(status.as_u16(), current);
        }

        FetchResult::transport(current, "too many redirects")
    }

    /// Perform exactly one request without following its redirect
    ///
    /// Used by the redirect chaser, which needs to inspect the
    /// `Location` target of every hop itself.
    pub async fn fetch_once(&self, url: &str, referer: Option<&str>) -> HopResponse {
        let response = match self.send(url, referer).await {
            Ok(response) => response,
            Err(e) => {
                return HopResponse::Failed {
                    detail: describe_reqwest_error(&e),
                };
            }
        };

        let status = response.status();

        if status.is_redirection() {
            if let Some(location) = header_str(response.headers().get(LOCATION)) {
                return HopResponse::Redirect { location };
            }
            return HopResponse::Failed {
                detail: format!("HTTP {} without Location", status.as_u16()),
            };
        }

        if status.is_success() {
            return match response.text().await {
                Ok(body) => HopResponse::Page { body },
                Err(e) => HopResponse::Failed {
                    detail: describe_reqwest_error(&e),
                },
            };
        }

        HopResponse::Failed {
            detail: format!("HTTP {}", status.as_u16()),
        }
    }

    async fn send(&self, url: &str, referer: Option<&str>) -> reqwest::Result<reqwest::Response> {
        let mut request = self.client.get(url);
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }
        request.send().await
    }
}

fn header_str(value: Option<&HeaderValue>) -> Option<String> {
    value.and_then(|v| v.to_str().ok()).map(str::to_string)
}

fn describe_reqwest_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "timeout".to_string()
    } else if error.is_connect() {
        "connection failed".to_string()
    } else {
        error.to_string()
    }
}
