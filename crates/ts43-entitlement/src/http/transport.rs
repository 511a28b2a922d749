//! reqwest-backed transport

use super::{HttpMethod, HttpRequest, HttpTransport, TransportResponse, STATUS_OK};
use crate::config::CarrierConfig;
use crate::errors::{ErrorCode, ServiceEntitlementError};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use tracing::debug;

/// Default [`HttpTransport`] built on a `reqwest` client. Redirects are not
/// followed; a `302` reaches the caller with its `Location` header.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &CarrierConfig) -> Result<Self, ServiceEntitlementError> {
        let mut builder = Client::builder()
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .redirect(Policy::none());
        if let Some(local_address) = config.network {
            builder = builder.local_address(local_address);
        }

        let client = builder.build().map_err(|e| {
            ServiceEntitlementError::new(ErrorCode::ServerNotConnectable, "Configure connection failed")
                .with_source(e)
        })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<TransportResponse, ServiceEntitlementError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() || e.is_builder() {
                ServiceEntitlementError::new(ErrorCode::ServerNotConnectable, "Connection error")
                    .with_source(e)
            } else {
                ServiceEntitlementError::new(ErrorCode::HttpStatusNotSuccess, "Connection error")
                    .with_source(e)
            }
        })?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        debug!(status = status.as_u16(), "HTTP response received");

        let body = if status.as_u16() == STATUS_OK {
            response.text().await.map_err(|e| {
                ServiceEntitlementError::new(
                    ErrorCode::MalformedHttpResponse,
                    "Read response body/message failed",
                )
                .with_source(e)
            })?
        } else {
            String::new()
        };

        Ok(TransportResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}
