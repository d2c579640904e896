//! HTTP transport used to dispatch units.
//!
//! The runner talks to the network only through [`Transport`]. The default
//! implementation is backed by reqwest and decodes responses as JSON.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Url};
use reqwest::header::{COOKIE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;

/// HTTP connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest response body kept in a status error.
const MAX_ERROR_BODY: usize = 512;

/// One fully built request.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitRequest {
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl UnitRequest {
    /// Cookies rendered as a single `Cookie` header value.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Performs exactly one HTTP call per request.
#[async_trait]
pub trait Transport<R>: Send + Sync {
    /// Send the request. Network failures and non-2xx responses are errors.
    async fn send(&self, request: UnitRequest) -> Result<R, TransportError>;
}

/// reqwest-backed transport producing JSON values.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with a default client.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Request {
                url: String::new(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    /// Use an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn headers(request: &UnitRequest) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| TransportError::InvalidHeader(name.clone()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| TransportError::InvalidHeader(name.clone()))?;
            headers.insert(header_name, header_value);
        }
        if let Some(cookie) = request.cookie_header() {
            let value = HeaderValue::from_str(&cookie)
                .map_err(|_| TransportError::InvalidHeader(COOKIE.to_string()))?;
            headers.insert(COOKIE, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Transport<Value> for ReqwestTransport {
    async fn send(&self, request: UnitRequest) -> Result<Value, TransportError> {
        let method = Method::from_bytes(request.method.to_uppercase().as_bytes())
            .map_err(|_| TransportError::InvalidMethod(request.method.clone()))?;
        let headers = Self::headers(&request)?;

        let mut url = Url::parse(&request.url).map_err(|e| TransportError::Request {
            url: request.url.clone(),
            message: format!("Invalid URL: {}", e),
        })?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        let mut builder = self
            .client
            .request(method, url)
            .headers(headers)
            .timeout(request.timeout);
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        debug!("{} {}", request.method, request.url);

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    url: request.url.clone(),
                    timeout_ms: request.timeout.as_millis(),
                }
            } else {
                TransportError::Request {
                    url: request.url.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| TransportError::Decode {
            url: request.url.clone(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            let mut body = String::from_utf8_lossy(&bytes).into_owned();
            if body.len() > MAX_ERROR_BODY {
                let mut end = MAX_ERROR_BODY;
                while !body.is_char_boundary(end) {
                    end -= 1;
                }
                body.truncate(end);
            }
            return Err(TransportError::Status {
                url: request.url,
                status: status.as_u16(),
                body,
            });
        }

        decode_body(&request.url, &bytes)
    }
}

/// Decode a response body: JSON when possible, text otherwise, `null` when empty.
pub fn decode_body(url: &str, bytes: &[u8]) -> Result<Value, TransportError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    if let Ok(value) = serde_json::from_slice(bytes) {
        return Ok(value);
    }
    String::from_utf8(bytes.to_vec())
        .map(Value::String)
        .map_err(|e| TransportError::Decode {
            url: url.to_string(),
            message: format!("Response is neither JSON nor UTF-8 text: {}", e),
        })
}
