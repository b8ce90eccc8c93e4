//! Client configuration
//!
//! [`ClientOptions`] can be built in code through [`ClientOptions::builder`]
//! or loaded from a YAML/JSON file. Every field except the application name
//! and version has a default.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default service root
pub const DEFAULT_BASE_URL: &str = "https://beatsaver.com";

/// Library agent name used in the `User-Agent` header
pub const LIB_NAME: &str = env!("CARGO_PKG_NAME");

/// Library version used in the `User-Agent` header
pub const LIB_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// HTTP Version
// ============================================================================

/// HTTP protocol version to speak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpVersion {
    /// Negotiate with the server
    #[default]
    Auto,
    /// HTTP/1.1 only
    Http1,
    /// HTTP/2 with prior knowledge
    Http2,
}

// ============================================================================
// Agent
// ============================================================================

/// Extra product token appended to the `User-Agent` header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Product name
    pub name: String,
    /// Product version
    pub version: String,
}

impl Agent {
    /// Create a new agent
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

// ============================================================================
// Client Options
// ============================================================================

/// Configuration for [`crate::BeatSaver`] and [`crate::http::HttpClient`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Name of the application using this library
    pub application_name: String,

    /// Version of the application using this library
    pub version: String,

    /// Service root, without the `/api` suffix
    pub base_url: String,

    /// Request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,

    /// HTTP protocol version
    pub http_version: HttpVersion,

    /// Sleep and retry on HTTP 429 instead of failing
    pub handle_rate_limits: bool,

    /// Upper bound on consecutive 429 retries; `None` retries forever
    pub max_rate_limit_retries: Option<u32>,

    /// Extra agents appended to the `User-Agent` header
    pub agents: Vec<Agent>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            application_name: String::new(),
            version: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            http_version: HttpVersion::Auto,
            handle_rate_limits: true,
            max_rate_limit_retries: Some(5),
            agents: Vec::new(),
        }
    }
}

impl ClientOptions {
    /// Create options for an application with defaults everywhere else
    pub fn new(application_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Create a new options builder
    pub fn builder(
        application_name: impl Into<String>,
        version: impl Into<String>,
    ) -> ClientOptionsBuilder {
        ClientOptionsBuilder {
            options: Self::new(application_name, version),
        }
    }

    /// Load options from a YAML or JSON file, chosen by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        let options: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };

        options.validate()?;
        Ok(options)
    }

    /// Check that every required value is present
    pub fn validate(&self) -> Result<()> {
        if self.application_name.trim().is_empty() {
            return Err(Error::invalid_value("application_name", "must not be empty"));
        }
        if self.version.trim().is_empty() {
            return Err(Error::invalid_value("version", "must not be empty"));
        }
        for (i, agent) in self.agents.iter().enumerate() {
            if agent.name.trim().is_empty() {
                return Err(Error::invalid_value(
                    format!("agents[{i}].name"),
                    "must not be empty",
                ));
            }
            if agent.version.trim().is_empty() {
                return Err(Error::invalid_value(
                    format!("agents[{i}].version"),
                    "must not be empty",
                ));
            }
        }
        url::Url::parse(&self.base_url)?;
        Ok(())
    }

    /// Compose the `User-Agent` header value
    ///
    /// `{app}/{version} beatsaver-client/{lib version}` followed by one
    /// `{name}/{version}` token per extra agent.
    pub fn user_agent(&self) -> String {
        let mut agent = format!(
            "{}/{} {LIB_NAME}/{LIB_VERSION}",
            self.application_name, self.version
        );
        for extra in &self.agents {
            agent.push(' ');
            agent.push_str(&extra.name);
            agent.push('/');
            agent.push_str(&extra.version);
        }
        agent
    }

    /// Root that API paths are resolved against
    pub fn api_root(&self) -> String {
        format!("{}/api", self.base_url.trim_end_matches('/'))
    }
}

/// Builder for [`ClientOptions`]
#[derive(Debug, Clone)]
pub struct ClientOptionsBuilder {
    options: ClientOptions,
}

impl ClientOptionsBuilder {
    /// Set the service root
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.options.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Set the HTTP protocol version
    pub fn http_version(mut self, version: HttpVersion) -> Self {
        self.options.http_version = version;
        self
    }

    /// Enable or disable automatic 429 handling
    pub fn handle_rate_limits(mut self, enabled: bool) -> Self {
        self.options.handle_rate_limits = enabled;
        self
    }

    /// Bound consecutive 429 retries (`None` for unbounded)
    pub fn max_rate_limit_retries(mut self, retries: Option<u32>) -> Self {
        self.options.max_rate_limit_retries = retries;
        self
    }

    /// Append an extra agent
    pub fn agent(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.options.agents.push(Agent::new(name, version));
        self
    }

    /// Build the options
    pub fn build(self) -> ClientOptions {
        self.options
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(serde::de::Error::custom("timeout must be a non-negative number"));
        }
        Ok(Duration::from_secs_f64(secs))
    }
}
