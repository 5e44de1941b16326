//! HTTP delivery for upload sinks
//!
//! Delivery is fire-and-forget: the response status and body are never
//! inspected. An `Err` only means the request could not be written.

use crate::error::{EltError, Result};
use hyper::client::HttpConnector;
use hyper::header::{HeaderValue, CONNECTION};
use hyper::{Body, Client, Request};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    fn as_hyper(&self) -> hyper::Method {
        match self {
            Method::Get => hyper::Method::GET,
            Method::Post => hyper::Method::POST,
        }
    }
}

/// A fully formed request for one sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub method: Method,
    pub host: String,
    pub port: u16,
    /// Path including any query string
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl UploadRequest {
    pub fn get(host: &str, port: u16, path: String) -> Self {
        Self {
            method: Method::Get,
            host: host.to_string(),
            port,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(host: &str, port: u16, path: String, body: String) -> Self {
        Self {
            method: Method::Post,
            host: host.to_string(),
            port,
            path,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn uri(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }
}

/// Sends one request and forgets about it
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    /// # Errors
    ///
    /// Returns `EltError::Transport` if the connection or request write fails.
    async fn send(&self, request: &UploadRequest) -> Result<()>;
}

/// Plain HTTP/1.1 client, one short-lived connection per request
pub struct HyperTransport {
    client: Client<HttpConnector>,
    timeout: Duration,
}

impl HyperTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }
}

impl HttpTransport for HyperTransport {
    async fn send(&self, request: &UploadRequest) -> Result<()> {
        let mut builder = Request::builder()
            .method(request.method.as_hyper())
            .uri(request.uri())
            .header(CONNECTION, HeaderValue::from_static("close"));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = request
            .body
            .clone()
            .map(Body::from)
            .unwrap_or_else(Body::empty);
        let http_request = builder.body(body)?;

        let response = tokio::time::timeout(self.timeout, self.client.request(http_request))
            .await
            .map_err(|_| {
                EltError::Transport(format!(
                    "{} did not answer within {:?}",
                    request.host, self.timeout
                ))
            })??;

        // Status and body are dropped unread
        debug!("{} answered {}", request.host, response.status());
        Ok(())
    }
}

/// Records requests instead of sending them
///
/// Hosts added with `fail_host` produce a transport failure, but the request
/// is still recorded as attempted.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportState>>,
}

#[derive(Debug, Default)]
struct MockTransportState {
    attempts: Vec<UploadRequest>,
    failing_hosts: HashSet<String>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_host(&self, host: &str) {
        self.inner.lock().failing_hosts.insert(host.to_string());
    }

    pub fn attempts(&self) -> Vec<UploadRequest> {
        self.inner.lock().attempts.clone()
    }

    pub fn attempts_to(&self, host: &str) -> usize {
        self.inner
            .lock()
            .attempts
            .iter()
            .filter(|r| r.host == host)
            .count()
    }
}

impl HttpTransport for MockTransport {
    async fn send(&self, request: &UploadRequest) -> Result<()> {
        let mut state = self.inner.lock();
        state.attempts.push(request.clone());
        if state.failing_hosts.contains(&request.host) {
            return Err(EltError::Transport(format!(
                "{} connect failed",
                request.host
            )));
        }
        Ok(())
    }
}
