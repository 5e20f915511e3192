//! Transport session for the inventory API
//!
//! Every component that talks to the service receives a [`Session`] value
//! explicitly. The production implementation is [`HttpSession`]; tests drive
//! the pipeline through [`MockSession`].

pub mod http;
pub mod mock;

pub use http::HttpSession;
pub use mock::{MockResponse, MockSession, RecordedCall};

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

/// Marker the service embeds in a response payload when credentials are rejected.
pub const UNAUTHORIZED_MARKER: &str = r#""statusCode":401"#;

/// Name of the session cookie carrying the caller's login.
pub const SESSION_COOKIE_NAME: &str = "JSESSIONID";

/// Header carrying the anti-forgery token.
pub const XSRF_HEADER: &str = "X-XSRF-TOKEN";

/// Credentials attached to every request.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub cookie: String,
    pub xsrf_token: String,
    pub user_agent: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("cookie", &"[REDACTED]")
            .field("xsrf_token", &"[REDACTED]")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// A single "perform request" primitive against the inventory service.
///
/// Implementations resolve `path` against their base endpoint, attach the
/// session credentials, and return the raw response body on HTTP 200.
/// Implementations must be safe to share across concurrently running tasks.
#[async_trait]
pub trait Session: Send + Sync {
    async fn perform(&self, method: Method, path: &str, body: Option<&[u8]>) -> Result<Vec<u8>>;
}

/// Classify a completed HTTP exchange.
///
/// The unauthorized marker is checked before the status code: the service
/// reports rejected credentials inside the payload.
pub fn check_response(status: u16, body: Vec<u8>) -> Result<Vec<u8>> {
    let text = String::from_utf8_lossy(&body);
    if text.contains(UNAUTHORIZED_MARKER) {
        return Err(Error::Auth);
    }

    if status != 200 {
        return Err(Error::RequestFailed {
            status,
            body: text.into_owned(),
        });
    }

    Ok(body)
}
