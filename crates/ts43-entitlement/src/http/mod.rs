//! HTTP layer
//!
//! [`HttpTransport`] is the seam to the network; [`ReqwestTransport`] is the
//! default implementation. [`HttpClient`] applies the entitlement server's
//! response rules on top of any transport: only `200 OK` and `302 Found` are
//! accepted, cookies and redirect targets are captured, and request/response
//! pairs are optionally kept in memory.

mod transport;

pub use transport::ReqwestTransport;

use crate::errors::{ErrorCode, ServiceEntitlementError};
use crate::types::ContentType;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Header names
pub mod header {
    pub const ACCEPT: &str = "Accept";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const COOKIE: &str = "Cookie";
    pub const SET_COOKIE: &str = "Set-Cookie";
    pub const LOCATION: &str = "Location";
    pub const RETRY_AFTER: &str = "Retry-After";
    pub const USER_AGENT: &str = "User-Agent";
}

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_EAP_RELAY_JSON: &str = "application/vnd.gsma.eap-relay.v1.0+json";

pub(crate) const STATUS_OK: u16 = 200;
pub(crate) const STATUS_FOUND: u16 = 302;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Outgoing request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    /// JSON body, POST only
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Post,
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Add a header; empty values are dropped
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.headers.push((name.to_string(), value));
        }
        self
    }

    /// First value of a header, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Raw response as returned by a transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn header_values(&self, name: &str) -> Vec<String> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
            .collect()
    }
}

/// Network seam. Implementations report connection failures as
/// `SERVER_NOT_CONNECTABLE` and must not follow redirects.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<TransportResponse, ServiceEntitlementError>;
}

/// Accepted entitlement server response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub response_code: u16,
    pub response_message: String,
    pub content_type: ContentType,
    /// Empty for redirects
    pub body: String,
    /// Raw `Set-Cookie` values
    pub cookies: Vec<String>,
    /// `Location` header of a redirect
    pub location: Option<String>,
}

/// Entitlement HTTP client
pub struct HttpClient {
    transport: Arc<dyn HttpTransport>,
    save_history: bool,
    history: Mutex<Vec<String>>,
}

impl HttpClient {
    pub fn new(transport: Arc<dyn HttpTransport>, save_history: bool) -> Self {
        Self {
            transport,
            save_history,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Send `request` and validate the response
    #[instrument(skip(self, request), fields(method = ?request.method))]
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, ServiceEntitlementError> {
        debug!(url = %request.url, "Sending entitlement request");
        self.record(|| format!("{request:?}"));

        let raw = self.transport.send(&request).await?;
        let response = accept_response(raw)?;

        debug!(
            status = response.response_code,
            content_type = ?response.content_type,
            "Received entitlement response"
        );
        self.record(|| format!("{response:?}"));
        Ok(response)
    }

    /// Recorded request/response pairs, oldest first
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    fn record(&self, entry: impl FnOnce() -> String) {
        if self.save_history {
            self.history.lock().push(entry());
        }
    }
}

fn accept_response(raw: TransportResponse) -> Result<HttpResponse, ServiceEntitlementError> {
    if raw.status != STATUS_OK && raw.status != STATUS_FOUND {
        let retry_after = raw.header(header::RETRY_AFTER).map(str::to_string);
        warn!(status = raw.status, retry_after = ?retry_after, "Entitlement server rejected request");
        return Err(ServiceEntitlementError::new(
            ErrorCode::HttpStatusNotSuccess,
            format!("Invalid connection response: {}", raw.status),
        )
        .with_http_status(raw.status, retry_after));
    }

    let content_type = raw
        .header(header::CONTENT_TYPE)
        .map(ContentType::from_header)
        .unwrap_or_default();

    Ok(HttpResponse {
        response_code: raw.status,
        response_message: raw.reason.clone(),
        content_type,
        cookies: raw.header_values(header::SET_COOKIE),
        location: raw.header(header::LOCATION).map(str::to_string),
        body: if raw.status == STATUS_FOUND { String::new() } else { raw.body },
    })
}

/// Build a `Cookie` header from `Set-Cookie` values, keeping only each
/// cookie's `name=value` pair
pub fn cookie_header(set_cookies: &[String]) -> String {
    set_cookies
        .iter()
        .filter_map(|cookie| cookie.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .collect::<Vec<_>>()
        .join("; ")
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
