//! In-memory session for tests

use super::{check_response, Session};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Method;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Canned reply for one mocked request.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// An HTTP exchange that completed with this status and body.
    Http {
        status: u16,
        body: String,
        delay: Option<Duration>,
    },
    /// The connection failed before a response arrived.
    TransportError(String),
}

impl MockResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        MockResponse::Http {
            status,
            body: body.into(),
            delay: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self::status(401, r#"{"statusCode":401,"message":"Unauthorized"}"#)
    }

    pub fn transport_error(message: impl Into<String>) -> Self {
        MockResponse::TransportError(message.into())
    }

    /// Hold the reply back for `delay` before completing.
    pub fn delayed(self, delay: Duration) -> Self {
        match self {
            MockResponse::Http { status, body, .. } => MockResponse::Http {
                status,
                body,
                delay: Some(delay),
            },
            other => other,
        }
    }
}

/// One request observed by a [`MockSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

/// Route-table session that records every call.
///
/// Replies queued on a route are consumed in order; the last one keeps being
/// returned once the queue is down to a single entry. Unrouted requests fail
/// with HTTP 404.
#[derive(Default)]
pub struct MockSession {
    routes: Mutex<HashMap<(Method, String), VecDeque<MockResponse>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `method path`.
    pub fn on(self, method: Method, path: impl Into<String>, response: MockResponse) -> Self {
        lock(&self.routes)
            .entry((method, path.into()))
            .or_default()
            .push_back(response);
        self
    }

    /// Every call observed so far, in arrival order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Number of calls made with `method`.
    pub fn count(&self, method: &Method) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| &c.method == method)
            .count()
    }

    fn next_response(&self, method: &Method, path: &str) -> Option<MockResponse> {
        let mut routes = lock(&self.routes);
        let queue = routes.get_mut(&(method.clone(), path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Session for MockSession {
    async fn perform(&self, method: Method, path: &str, body: Option<&[u8]>) -> Result<Vec<u8>> {
        lock(&self.calls).push(RecordedCall {
            method: method.clone(),
            path: path.to_string(),
            body: body.map(|b| String::from_utf8_lossy(b).into_owned()),
        });

        match self.next_response(&method, path) {
            Some(MockResponse::Http {
                status,
                body,
                delay,
            }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                check_response(status, body.into_bytes())
            }
            Some(MockResponse::TransportError(message)) => Err(Error::Transport(message)),
            None => check_response(404, format!("no mock route for {} {}", method, path).into_bytes()),
        }
    }
}
