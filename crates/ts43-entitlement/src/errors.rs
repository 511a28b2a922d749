//! Error types for the entitlement client

use std::fmt;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Ts43Error>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level client error
#[derive(Debug, Error)]
pub enum Ts43Error {
    #[error("Entitlement error: {0}")]
    Entitlement(#[from] ServiceEntitlementError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl Ts43Error {
    /// Entitlement error code, if this is an entitlement failure
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Entitlement(e) => Some(e.code()),
            _ => None,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Entitlement(e) => e.http_status(),
            _ => None,
        }
    }

    pub fn retry_after(&self) -> Option<&str> {
        match self {
            Self::Entitlement(e) => e.retry_after(),
            _ => None,
        }
    }
}

/// Entitlement failure codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Unknown,
    /// Request body could not be composed
    JsonComposeFailure,
    /// Telephony identity (IMSI, MCC-MNC) unavailable
    PhoneNotAvailable,
    /// SIM did not produce an authentication result
    IccAuthenticationNotAvailable,
    EapAkaSynchronizationFailure,
    EapAkaFailure,
    ServerNotConnectable,
    HttpStatusNotSuccess,
    MalformedHttpResponse,
    TokenNotAvailable,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::JsonComposeFailure => "JSON_COMPOSE_FAILURE",
            Self::PhoneNotAvailable => "PHONE_NOT_AVAILABLE",
            Self::IccAuthenticationNotAvailable => "ICC_AUTHENTICATION_NOT_AVAILABLE",
            Self::EapAkaSynchronizationFailure => "EAP_AKA_SYNCHRONIZATION_FAILURE",
            Self::EapAkaFailure => "EAP_AKA_FAILURE",
            Self::ServerNotConnectable => "SERVER_NOT_CONNECTABLE",
            Self::HttpStatusNotSuccess => "HTTP_STATUS_NOT_SUCCESS",
            Self::MalformedHttpResponse => "MALFORMED_HTTP_RESPONSE",
            Self::TokenNotAvailable => "TOKEN_NOT_AVAILABLE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of an entitlement exchange.
///
/// Carries the HTTP status and `Retry-After` value when the server rejected
/// the request, so callers can implement backoff.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct ServiceEntitlementError {
    code: ErrorCode,
    message: String,
    http_status: Option<u16>,
    retry_after: Option<String>,
    #[source]
    source: Option<BoxError>,
}

impl ServiceEntitlementError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            http_status: None,
            retry_after: None,
            source: None,
        }
    }

    /// Attach the underlying cause
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Attach the HTTP status and optional `Retry-After` header value
    pub fn with_http_status(mut self, status: u16, retry_after: Option<String>) -> Self {
        self.http_status = Some(status);
        self.retry_after = retry_after;
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    pub fn retry_after(&self) -> Option<&str> {
        self.retry_after.as_deref()
    }
}

/// Errors reported by the telephony collaborator
#[derive(Debug, Error)]
pub enum TelephonyError {
    #[error("Operation not supported: {0}")]
    Unsupported(String),

    #[error("Telephony unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_carried() {
        let err = ServiceEntitlementError::new(ErrorCode::HttpStatusNotSuccess, "busy")
            .with_http_status(503, Some("120".to_string()));
        let err: Ts43Error = err.into();

        assert_eq!(err.code(), Some(ErrorCode::HttpStatusNotSuccess));
        assert_eq!(err.http_status(), Some(503));
        assert_eq!(err.retry_after(), Some("120"));
        assert_eq!(
            err.to_string(),
            "Entitlement error: HTTP_STATUS_NOT_SUCCESS: busy"
        );
    }

    #[test]
    fn test_invalid_argument_has_no_code() {
        let err = Ts43Error::InvalidArgument("slot".to_string());
        assert_eq!(err.code(), None);
        assert_eq!(err.http_status(), None);
    }
}
