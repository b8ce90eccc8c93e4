//! Request and response values passed through the executor

use super::rate_limit::RateLimitInfo;
use crate::error::{Error, Result};
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Progress
// ============================================================================

/// Receives fractional transfer progress in `[0, 1]`
///
/// Sinks are invoked synchronously from the read loop and must not block.
#[derive(Clone)]
pub struct ProgressSink {
    report: Arc<dyn Fn(f64) + Send + Sync>,
}

impl ProgressSink {
    /// Wrap a callback
    pub fn new<F>(report: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        Self {
            report: Arc::new(report),
        }
    }

    /// Publish the latest value on a watch channel
    pub fn watch(sender: watch::Sender<f64>) -> Self {
        Self::new(move |value| {
            sender.send_replace(value);
        })
    }

    /// Forward every value over an unbounded channel
    pub fn channel(sender: mpsc::UnboundedSender<f64>) -> Self {
        Self::new(move |value| {
            // A dropped receiver just means nobody is listening anymore
            let _ = sender.send(value);
        })
    }

    /// Report a value
    pub fn report(&self, value: f64) {
        (self.report)(value);
    }
}

impl std::fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressSink").finish_non_exhaustive()
    }
}

// ============================================================================
// Request
// ============================================================================

/// A single GET request
///
/// `uri` is either a path relative to the API root (`maps/latest/0`) or an
/// absolute URL.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Target path or URL
    pub uri: String,
    /// Extra request headers
    pub headers: HashMap<String, String>,
    /// Aborts the request when cancelled
    pub cancel: Option<CancellationToken>,
    /// Receives body transfer progress
    pub progress: Option<ProgressSink>,
}

impl Request {
    /// Create a GET request for a path or URL
    pub fn get(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Attach a cancellation token
    #[must_use]
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Attach a progress sink
    #[must_use]
    pub fn progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Apply per-call fetch options
    #[must_use]
    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.cancel = options.cancel;
        self.progress = options.progress;
        self
    }

    /// Fail with [`Error::Cancelled`] if the token has fired
    pub fn ensure_active(&self) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }

    pub(crate) fn report(&self, value: f64) {
        if let Some(sink) = &self.progress {
            sink.report(value);
        }
    }
}

/// Per-call options for the high level fetch helpers
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Aborts the request when cancelled
    pub cancel: Option<CancellationToken>,
    /// Receives body transfer progress
    pub progress: Option<ProgressSink>,
}

impl FetchOptions {
    /// No cancellation, no progress
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a cancellation token
    #[must_use]
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Attach a progress sink
    #[must_use]
    pub fn progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }
}

// ============================================================================
// Response
// ============================================================================

/// A fully buffered response
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Response status
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body bytes
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Take the raw body
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Rate limit headers, if the server sent any
    pub fn rate_limit(&self) -> Option<RateLimitInfo> {
        RateLimitInfo::try_from_headers(&self.headers, chrono::Utc::now())
    }

    /// Turn a non-2xx status into [`Error::HttpStatus`]
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::http_status(self.status.as_u16(), self.text()))
        }
    }
}
