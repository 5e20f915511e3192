//! reqwest-backed session

use super::{check_response, Credentials, Session, SESSION_COOKIE_NAME, XSRF_HEADER};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, USER_AGENT};
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Production session over a pooled `reqwest::Client`.
///
/// Holds only immutable state, so one instance is shared by every fetch and
/// write task of a run.
pub struct HttpSession {
    client: Client,
    base_url: Url,
    credentials: Credentials,
}

impl HttpSession {
    /// Create a session against `base_url`.
    pub fn new(base_url: &str, credentials: Credentials, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Resolve an absolute API path against the base endpoint.
    pub fn build_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Cannot resolve path '{}': {}", path, e)))
    }
}

impl std::fmt::Debug for HttpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSession")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .finish()
    }
}

#[async_trait]
impl Session for HttpSession {
    async fn perform(&self, method: Method, path: &str, body: Option<&[u8]>) -> Result<Vec<u8>> {
        let url = self.build_url(path)?;
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(
                COOKIE,
                format!("{}={}", SESSION_COOKIE_NAME, self.credentials.cookie),
            )
            .header(XSRF_HEADER, &self.credentials.xsrf_token)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, &self.credentials.user_agent);

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_vec());
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{} {} failed: {}", method, path, e)))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read response body: {}", e)))?;
        trace!("{} {} -> {} ({} bytes)", method, path, status, bytes.len());

        check_response(status, bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn session(base: &str) -> HttpSession {
        HttpSession::new(
            base,
            Credentials {
                cookie: "c".into(),
                xsrf_token: "x".into(),
                user_agent: "ua".into(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_build_url_resolves_absolute_paths() {
        let s = session("https://usm.example.com");
        assert_eq!(
            s.build_url("/api/1.0/assets/abc").unwrap().as_str(),
            "https://usm.example.com/api/1.0/assets/abc"
        );
    }

    #[test]
    fn test_build_url_replaces_base_path() {
        let s = session("https://usm.example.com/ui/");
        assert_eq!(
            s.build_url("/api/1.0/search/aql").unwrap().as_str(),
            "https://usm.example.com/api/1.0/search/aql"
        );
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let err = HttpSession::new("not a url", Credentials::default(), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_debug_hides_credentials() {
        let rendered = format!("{:?}", session("https://usm.example.com"));
        assert!(rendered.contains("usm.example.com"));
        assert!(rendered.contains("[REDACTED]"));
    }

    /// Session against a local listener, bypassing any proxy from the environment.
    fn local_session(base: &str) -> HttpSession {
        HttpSession {
            client: Client::builder()
                .no_proxy()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap(),
            base_url: Url::parse(base).unwrap(),
            credentials: Credentials {
                cookie: "cookie-value".into(),
                xsrf_token: "xsrf-value".into(),
                user_agent: "fqdn-test/1.0".into(),
            },
        }
    }

    /// Answer a single request with `status` and `body`, returning the raw
    /// request text once the exchange is done.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&raw) {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
            String::from_utf8(raw).unwrap()
        });

        (base, server)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = header(head, "content-length")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    fn header<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
        let head = raw.split("\r\n\r\n").next()?;
        head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    #[tokio::test]
    async fn test_get_sends_session_headers_without_content_type() {
        let (base, server) = serve_once("200 OK", r#"{"id":"a#b"}"#).await;

        let body = local_session(&base)
            .perform(Method::GET, "/api/1.0/assets/a%23b", None)
            .await
            .unwrap();
        let raw = server.await.unwrap();

        assert_eq!(body, br#"{"id":"a#b"}"#.to_vec());
        assert!(raw.starts_with("GET /api/1.0/assets/a%23b HTTP/1.1\r\n"), "{raw}");
        assert_eq!(header(&raw, "cookie"), Some("JSESSIONID=cookie-value"));
        assert_eq!(header(&raw, "x-xsrf-token"), Some("xsrf-value"));
        assert_eq!(header(&raw, "user-agent"), Some("fqdn-test/1.0"));
        assert_eq!(header(&raw, "accept"), Some("application/json"));
        assert_eq!(header(&raw, "content-type"), None);
    }

    #[tokio::test]
    async fn test_put_sends_json_body() {
        let (base, server) = serve_once("200 OK", "{}").await;
        let record = br#"{"id":"9","NetworkInterfaceHasHostname":[{"name":"mail01.corp","id":"h"}]}"#;

        local_session(&base)
            .perform(Method::PUT, "/api/1.0/assets/9", Some(&record[..]))
            .await
            .unwrap();
        let raw = server.await.unwrap();

        assert!(raw.starts_with("PUT /api/1.0/assets/9 HTTP/1.1\r\n"), "{raw}");
        assert_eq!(header(&raw, "content-type"), Some("application/json"));
        assert_eq!(header(&raw, "cookie"), Some("JSESSIONID=cookie-value"));
        assert_eq!(header(&raw, "x-xsrf-token"), Some("xsrf-value"));
        assert!(raw.ends_with(std::str::from_utf8(record).unwrap()));
    }

    #[tokio::test]
    async fn test_unauthorized_marker_in_ok_response_is_auth() {
        let (base, server) =
            serve_once("200 OK", r#"{"statusCode":401,"message":"Unauthorized"}"#).await;

        let err = local_session(&base)
            .perform(Method::POST, "/api/1.0/search/aql", Some(&b"{}"[..]))
            .await
            .unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, Error::Auth));
    }

    #[tokio::test]
    async fn test_non_200_status_is_request_failed() {
        let (base, server) = serve_once("500 Internal Server Error", "boom").await;

        let err = local_session(&base)
            .perform(Method::GET, "/api/1.0/assets/1", None)
            .await
            .unwrap_err();
        server.await.unwrap();

        match err {
            Error::RequestFailed { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected RequestFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = local_session(&base)
            .perform(Method::GET, "/api/1.0/assets/1", None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
    }
}
