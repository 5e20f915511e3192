//! Run configuration
//!
//! Settings are layered with increasing precedence:
//!
//! 1. Hardcoded defaults
//! 2. An optional TOML file passed with `--config`
//! 3. Command-line flags
//!
//! Validation reports every problem at once rather than stopping at the first.

pub mod loader;

pub use loader::{load_config, load_config_file};

use crate::error::{Error, Result};
use crate::remediate::{FailurePolicy, PipelineOptions, RunMode};
use crate::session::Credentials;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = concat!("fqdn-remediate/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemediationConfig {
    /// Base endpoint of the inventory service, e.g. `https://acme.alienvault.cloud`.
    pub base_url: String,
    /// Domain appended to asset names when synthesizing an FQDN.
    pub domain: String,
    /// Upper bound on concurrently running fetch or write tasks.
    pub max_concurrency: usize,
    pub request_timeout_secs: u64,
    /// Abort the whole run on the first per-asset failure.
    pub fail_fast: bool,
    pub credentials: Credentials,
    /// Write patched records back. Only settable from the command line.
    #[serde(skip)]
    pub update: bool,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            domain: String::new(),
            max_concurrency: 16,
            request_timeout_secs: 60,
            fail_fast: false,
            credentials: Credentials {
                user_agent: DEFAULT_USER_AGENT.to_string(),
                ..Credentials::default()
            },
            update: false,
        }
    }
}

/// Values supplied on the command line; `None` keeps the lower layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub domain: Option<String>,
    pub cookie: Option<String>,
    pub xsrf_token: Option<String>,
    pub user_agent: Option<String>,
    pub max_concurrency: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub fail_fast: bool,
    pub update: bool,
}

impl RemediationConfig {
    /// Layer command-line values over this configuration.
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(domain) = overrides.domain {
            self.domain = domain;
        }
        if let Some(cookie) = overrides.cookie {
            self.credentials.cookie = cookie;
        }
        if let Some(token) = overrides.xsrf_token {
            self.credentials.xsrf_token = token;
        }
        if let Some(user_agent) = overrides.user_agent {
            self.credentials.user_agent = user_agent;
        }
        if let Some(n) = overrides.max_concurrency {
            self.max_concurrency = n;
        }
        if let Some(secs) = overrides.request_timeout_secs {
            self.request_timeout_secs = secs;
        }
        self.fail_fast |= overrides.fail_fast;
        self.update = overrides.update;

        if self.credentials.user_agent.is_empty() {
            self.credentials.user_agent = DEFAULT_USER_AGENT.to_string();
        }
        self
    }

    /// Check the configuration, collecting every problem found.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.base_url.is_empty() {
            problems.push("base URL is required (--base-url or base_url)".to_string());
        } else {
            match Url::parse(&self.base_url) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => problems.push(format!(
                    "base URL must use http or https, got '{}'",
                    url.scheme()
                )),
                Err(e) => problems.push(format!("invalid base URL '{}': {}", self.base_url, e)),
            }
        }
        if self.credentials.cookie.is_empty() {
            problems.push("session cookie is required (-c)".to_string());
        }
        if self.credentials.xsrf_token.is_empty() {
            problems.push("XSRF token is required (-x)".to_string());
        }
        if self.update && self.domain.trim().is_empty() {
            problems.push("a domain is required when updating assets (-d)".to_string());
        }
        if self.max_concurrency == 0 {
            problems.push("max concurrency must be at least 1".to_string());
        }
        if self.request_timeout_secs == 0 {
            problems.push("request timeout must be at least 1 second".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(problems.join("; ")))
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            mode: if self.update {
                RunMode::Remediate
            } else {
                RunMode::DetectOnly
            },
            domain: self.domain.trim().to_string(),
            max_concurrency: self.max_concurrency,
            failure_policy: if self.fail_fast {
                FailurePolicy::AbortAll
            } else {
                FailurePolicy::Isolate
            },
        }
    }
}
