// ABOUTME: HTTP client for the operator's provision status endpoint.
// ABOUTME: Speaks HTTP/1.1 over a fresh TCP connection per request via hyper.

use super::error::{
    ConnectSnafu, DecodeSnafu, HttpSnafu, InvalidUrlSnafu, ProvisionApiError, RequestSnafu,
    StatusSnafu, TimeoutSnafu, UnsupportedSchemeSnafu,
};
use super::status::ProvisionStatus;
use crate::types::CallId;
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::{StatusCode, Uri};
use hyper_util::rt::TokioIo;
use snafu::{OptionExt, ResultExt};
use std::time::Duration;
use tokio::net::TcpStream;

/// Path of the status collection, relative to the operator API base.
pub const PROVISIONS_PATH: &str = "/api/provisions";

/// Longest error body kept in an error message.
const MAX_ERROR_BODY: usize = 256;

/// Source of provision status by call id.
#[async_trait]
pub trait ProvisionApi: Send + Sync {
    /// Fetch the latest status.
    ///
    /// Returns `Ok(None)` when the operator is not tracking the call yet.
    async fn fetch_status(
        &self,
        call: CallId,
    ) -> Result<Option<ProvisionStatus>, ProvisionApiError>;
}

/// Talks to `GET {base}/api/provisions/{callId}`.
#[derive(Debug, Clone)]
pub struct HttpProvisionClient {
    base_url: String,
    authority: String,
    host: String,
    port: u16,
    base_path: String,
    request_timeout: Duration,
}

impl HttpProvisionClient {
    /// Create a client for an operator API base URL such as `http://op:9090`.
    pub fn new(base_url: &str) -> Result<Self, ProvisionApiError> {
        let uri = base_url.parse::<Uri>().map_err(|e| {
            InvalidUrlSnafu {
                url: base_url,
                reason: e.to_string(),
            }
            .build()
        })?;

        let scheme = uri.scheme_str().context(InvalidUrlSnafu {
            url: base_url,
            reason: "missing scheme",
        })?;
        if scheme != "http" {
            return UnsupportedSchemeSnafu { scheme }.fail();
        }

        let authority = uri.authority().context(InvalidUrlSnafu {
            url: base_url,
            reason: "missing host",
        })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            authority: authority.as_str().to_string(),
            // IPv6 literals keep their brackets in the authority only.
            host: authority
                .host()
                .trim_start_matches('[')
                .trim_end_matches(']')
                .to_string(),
            port: authority.port_u16().unwrap_or(80),
            base_path: uri.path().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(10),
        })
    }

    /// Bound each request. Defaults to 10 seconds.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request path for a call's status.
    pub fn status_path(&self, call: CallId) -> String {
        format!("{}{}/{}", self.base_path, PROVISIONS_PATH, call)
    }

    async fn get(&self, path: &str) -> Result<(StatusCode, Bytes), ProvisionApiError> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .context(ConnectSnafu {
                authority: self.authority.clone(),
            })?;

        let io = TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .context(HttpSnafu)?;

        // Spawn connection handler
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!("Operator API connection error: {}", e);
            }
        });

        let req = hyper::Request::builder()
            .method("GET")
            .uri(path)
            .header("Host", self.authority.as_str())
            .header("Accept", "application/json")
            .body(Empty::<Bytes>::new())
            .map_err(|e| {
                RequestSnafu {
                    reason: e.to_string(),
                }
                .build()
            })?;

        let resp = sender.send_request(req).await.context(HttpSnafu)?;
        let status = resp.status();
        let body = resp.into_body().collect().await.context(HttpSnafu)?;

        Ok((status, body.to_bytes()))
    }
}

#[async_trait]
impl ProvisionApi for HttpProvisionClient {
    async fn fetch_status(
        &self,
        call: CallId,
    ) -> Result<Option<ProvisionStatus>, ProvisionApiError> {
        let path = self.status_path(call);
        tracing::debug!("GET {}{}", self.authority, path);

        let (status, body) = tokio::time::timeout(self.request_timeout, self.get(&path))
            .await
            .map_err(|_| {
                TimeoutSnafu {
                    after: self.request_timeout,
                }
                .build()
            })??;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            let body: String = text.chars().take(MAX_ERROR_BODY).collect();
            return StatusSnafu {
                status: status.as_u16(),
                body,
            }
            .fail();
        }

        serde_json::from_slice(&body).context(DecodeSnafu).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::ProvisionApiErrorKind;

    #[test]
    fn parses_base_url_with_prefix() {
        let client = HttpProvisionClient::new("http://operator.local:9090/v1/").unwrap();
        assert_eq!(client.port, 9090);
        assert_eq!(client.host, "operator.local");
        assert_eq!(client.status_path(CallId::new(42)), "/v1/api/provisions/42");
    }

    #[test]
    fn default_port_is_80() {
        let client = HttpProvisionClient::new("http://operator.local").unwrap();
        assert_eq!(client.port, 80);
        assert_eq!(client.status_path(CallId::new(1)), "/api/provisions/1");
    }

    #[test]
    fn ipv6_literal_connects_without_brackets() {
        let client = HttpProvisionClient::new("http://[::1]:9090").unwrap();
        assert_eq!(client.host, "::1");
        assert_eq!(client.port, 9090);
        assert_eq!(client.authority, "[::1]:9090");
    }

    #[test]
    fn https_is_rejected() {
        let err = HttpProvisionClient::new("https://operator.local").unwrap_err();
        assert_eq!(err.kind(), ProvisionApiErrorKind::Configuration);
    }

    #[test]
    fn relative_url_is_rejected() {
        assert!(HttpProvisionClient::new("/api").is_err());
    }
}
