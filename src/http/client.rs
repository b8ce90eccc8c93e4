//! HTTP executor with rate limit handling
//!
//! Provides the request pipeline used by every endpoint:
//! - Composed `User-Agent` that callers cannot override
//! - Sleep-and-retry on HTTP 429, bounded by configuration
//! - Cooperative cancellation at every suspension point
//! - Chunked body reads with progress reporting

use super::rate_limit::RateLimitInfo;
use super::request::{Request, Response};
use crate::config::{ClientOptions, HttpVersion};
use crate::error::{Error, Result};
use chrono::Utc;
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Size of the slices progress is reported for
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Upper bound on the initial body buffer allocation
const MAX_PREALLOC: u64 = 4 * 1024 * 1024;

/// HTTP executor shared by all requests of a client
///
/// The inner connection pool is safe to use from many tasks at once.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    options: ClientOptions,
    api_root: String,
    user_agent: String,
}

impl HttpClient {
    /// Create an executor from validated options
    pub fn with_options(options: ClientOptions) -> Result<Self> {
        options.validate()?;

        let user_agent = options.user_agent();
        let builder = Client::builder()
            .timeout(options.timeout)
            .user_agent(&user_agent)
            .gzip(true)
            .deflate(true);

        let builder = match options.http_version {
            HttpVersion::Auto => builder,
            HttpVersion::Http1 => builder.http1_only(),
            HttpVersion::Http2 => builder.http2_prior_knowledge(),
        };

        Ok(Self {
            client: builder.build()?,
            api_root: options.api_root(),
            user_agent,
            options,
        })
    }

    /// Options this executor was built with
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Composed `User-Agent` value
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Execute a GET request
    ///
    /// Retries on 429 while rate limit handling is enabled, sleeping until
    /// the server's reset time before each retry.
    pub async fn execute(&self, request: &Request) -> Result<Response> {
        let url = self.build_url(&request.uri);
        let mut retries = 0u32;

        loop {
            request.ensure_active()?;

            debug!("GET {url}");
            let response = self.send(&url, request).await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                let info = RateLimitInfo::from_headers(response.headers(), Utc::now());

                if !self.options.handle_rate_limits {
                    return Err(Error::RateLimitExceeded { info });
                }

                if let Some(max) = self.options.max_rate_limit_retries {
                    if retries >= max {
                        warn!("Rate limited (429) on {url}, giving up after {retries} retries");
                        return Err(Error::RateLimitExceeded { info });
                    }
                }

                let delay = info.delay_until_reset(Utc::now());
                warn!(
                    "Rate limited (429) on {url}, retry {}, waiting {:?}",
                    retries + 1,
                    delay
                );
                self.sleep(delay, request.cancel.as_ref()).await?;
                retries += 1;
                continue;
            }

            request.ensure_active()?;
            return self.read_body(response, request).await;
        }
    }

    /// Execute a GET request for a path or URL with no extras
    pub async fn get(&self, uri: &str) -> Result<Response> {
        self.execute(&Request::get(uri)).await
    }

    /// Send the request and return once headers have arrived
    async fn send(&self, url: &str, request: &Request) -> Result<reqwest::Response> {
        let mut req = self.client.get(url);

        for (key, value) in &request.headers {
            if key.eq_ignore_ascii_case(USER_AGENT.as_str()) {
                continue;
            }
            req = req.header(key.as_str(), value.as_str());
        }

        let response = cancellable(request.cancel.as_ref(), req.send()).await??;
        debug!("{} {url}", response.status().as_u16());
        Ok(response)
    }

    /// Stream the body into memory, reporting progress per chunk
    async fn read_body(&self, mut response: reqwest::Response, request: &Request) -> Result<Response> {
        let status = response.status();
        let headers = response.headers().clone();
        let content_length = response.content_length();

        let mut body = Vec::with_capacity(content_length.unwrap_or(0).min(MAX_PREALLOC) as usize);
        let mut reported = 0usize;
        request.report(0.0);

        loop {
            request.ensure_active()?;
            let chunk = cancellable(request.cancel.as_ref(), response.chunk()).await??;
            request.ensure_active()?;

            let Some(chunk) = chunk else { break };
            body.extend_from_slice(&chunk);

            while body.len() - reported >= CHUNK_SIZE {
                reported += CHUNK_SIZE;
                report_fraction(request, reported, content_length);
            }
        }

        if reported < body.len() {
            reported = body.len();
            report_fraction(request, reported, content_length);
        }
        request.report(1.0);

        debug!("Read {reported} bytes");
        Ok(Response::new(status, headers, body.into()))
    }

    async fn sleep(&self, delay: Duration, cancel: Option<&CancellationToken>) -> Result<()> {
        if delay.is_zero() {
            return Ok(());
        }
        cancellable(cancel, tokio::time::sleep(delay)).await
    }

    /// Build full URL from path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        let path = path.trim_start_matches('/');
        format!("{}/{path}", self.api_root)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("options", &self.options)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

/// Race a future against an optional cancellation token
async fn cancellable<F: Future>(cancel: Option<&CancellationToken>, fut: F) -> Result<F::Output> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            () = token.cancelled() => Err(Error::Cancelled),
            out = fut => Ok(out),
        },
        None => Ok(fut.await),
    }
}

fn report_fraction(request: &Request, read: usize, content_length: Option<u64>) {
    if let Some(total) = content_length.filter(|&n| n > 0) {
        request.report((read as f64 / total as f64).min(1.0));
    }
}
