//! HTTP transport capability
//!
//! Code that talks to remote services takes an [`HttpClient`] instead of a
//! concrete client, so the live reqwest-backed implementation and test
//! doubles are interchangeable at the call site.

use reqwest::blocking::{Body, Client};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

/// Transport errors surfaced by [`HttpClient::execute`]
///
/// Cloneable so a fixed error value can be handed out more than once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Connection to '{url}' failed: {reason}")]
    Connection { url: String, reason: String },

    #[error("Request to '{url}' timed out")]
    Timeout { url: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Body transfer failed: {reason}")]
    Body { reason: String },

    #[error("HTTP transport error: {reason}")]
    Unexpected { reason: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(Url::to_string).unwrap_or_default();

        if err.is_timeout() {
            TransportError::Timeout { url }
        } else if err.is_connect() {
            TransportError::Connection {
                url,
                reason: err.to_string(),
            }
        } else if err.is_builder() {
            TransportError::InvalidRequest {
                reason: err.to_string(),
            }
        } else if err.is_body() || err.is_decode() {
            TransportError::Body {
                reason: err.to_string(),
            }
        } else {
            TransportError::Unexpected {
                reason: err.to_string(),
            }
        }
    }
}

/// Request body as a readable byte stream
///
/// Consumed at most once, either by the transport or by whoever drains it.
pub struct RequestBody {
    reader: Box<dyn Read + Send>,
    len: Option<u64>,
}

impl RequestBody {
    pub fn empty() -> Self {
        Self::from_bytes(Vec::new())
    }

    /// Body backed by an in-memory buffer of known length
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let len = bytes.len() as u64;
        Self {
            reader: Box::new(io::Cursor::new(bytes)),
            len: Some(len),
        }
    }

    /// Body streamed from an arbitrary reader; length is unknown up front
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Self {
            reader: Box::new(reader),
            len: None,
        }
    }

    /// Length in bytes, when known before reading
    pub fn len_hint(&self) -> Option<u64> {
        self.len
    }

    /// Read the remaining stream into memory
    pub fn drain(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Read for RequestBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBody").field("len", &self.len).finish()
    }
}

impl Default for RequestBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::from_bytes(text.into_bytes())
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::from_bytes(text.as_bytes().to_vec())
    }
}

/// Outgoing request: method, URL, headers and a streamed body
#[derive(Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: RequestBody::empty(),
        }
    }

    /// Build a request from a method and an unparsed URL
    pub fn parse(method: Method, url: &str) -> Result<Self, TransportError> {
        let url = Url::parse(url).map_err(|e| TransportError::InvalidRequest {
            reason: format!("invalid URL '{}': {}", url, e),
        })?;
        Ok(Self::new(method, url))
    }

    pub fn get(url: &str) -> Result<Self, TransportError> {
        Self::parse(Method::GET, url)
    }

    pub fn post(url: &str, body: impl Into<RequestBody>) -> Result<Self, TransportError> {
        Ok(Self::parse(Method::POST, url)?.with_body(body))
    }

    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Fully-read response: status, headers and body bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_slice(&self.body).map_err(|e| TransportError::Body {
            reason: format!("invalid JSON response body: {}", e),
        })
    }
}

/// Send a request, receive a response
pub trait HttpClient: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: HttpClient + ?Sized> HttpClient for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Live client configuration
#[derive(Debug, Clone)]
pub struct NetworkingConfig {
    /// HTTP client timeout in seconds
    pub timeout_seconds: u64,
    /// Enable request/response tracing
    pub trace_requests: bool,
}

impl Default for NetworkingConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            trace_requests: false,
        }
    }
}

/// [`HttpClient`] backed by a blocking reqwest client
#[derive(Debug, Clone)]
pub struct LiveHttpClient {
    client: Client,
    config: NetworkingConfig,
}

impl LiveHttpClient {
    pub fn new(config: NetworkingConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        trace!(
            timeout_seconds = config.timeout_seconds,
            "Live HTTP client initialized"
        );

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &NetworkingConfig {
        &self.config
    }
}

impl HttpClient for LiveHttpClient {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        if self.config.trace_requests {
            trace!(%method, %url, "Sending request");
        }

        let body = match body.len_hint() {
            Some(len) => Body::sized(body, len),
            None => Body::new(body),
        };

        let response = self
            .client
            .request(method, url)
            .headers(headers)
            .body(body)
            .send()?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes()?.to_vec();

        if self.config.trace_requests {
            trace!(%status, bytes = body.len(), "Received response");
        }

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
