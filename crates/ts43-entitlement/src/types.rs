//! Common types used across the entitlement client

use serde::{Deserialize, Serialize};

/// Value of the `Accept` header on entitlement requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AcceptContentType {
    Xml,
    Json,
    #[default]
    JsonAndXml,
}

impl AcceptContentType {
    pub fn as_header(&self) -> &'static str {
        match self {
            Self::Xml => "text/vnd.wap.connectivity-xml",
            Self::Json => "application/json",
            Self::JsonAndXml => "application/json, text/vnd.wap.connectivity-xml",
        }
    }
}

/// Content type of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContentType {
    #[default]
    Unknown,
    Json,
    Xml,
}

impl ContentType {
    /// Classify a `Content-Type` header value
    pub fn from_header(value: &str) -> Self {
        let value = value.to_ascii_lowercase();
        if value.contains("xml") || value == "text/vnd.wap.connectivity" {
            Self::Xml
        } else if value.contains("json") {
            Self::Json
        } else {
            Self::Unknown
        }
    }

    /// Parse the bare "xml" / "json" tokens used inside TS.43 documents
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "xml" => Self::Xml,
            "json" => Self::Json,
            _ => Self::Unknown,
        }
    }
}

/// How the entitlement server should notify the device (TS.43 `notif_action`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum NotificationAction {
    Disabled = 0,
    EnableSms = 1,
    #[default]
    EnableFcm = 2,
    EnableSmsAndFcm = 3,
    EnableApns = 4,
}

impl NotificationAction {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

/// Device identity reported in `terminal_*` parameters and the User-Agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub vendor: String,
    pub model: String,
    pub software_version: String,
}

/// Truncate to at most `max` characters
pub(crate) fn trim_to(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_header() {
        assert_eq!(
            ContentType::from_header("text/vnd.wap.connectivity-xml; charset=utf-8"),
            ContentType::Xml
        );
        assert_eq!(ContentType::from_header("text/vnd.wap.connectivity"), ContentType::Xml);
        assert_eq!(
            ContentType::from_header("application/vnd.gsma.eap-relay.v1.0+json"),
            ContentType::Json
        );
        assert_eq!(ContentType::from_header("text/html"), ContentType::Unknown);
    }

    #[test]
    fn test_notification_action_codes() {
        assert_eq!(NotificationAction::default().code(), 2);
        assert_eq!(NotificationAction::EnableApns.code(), 4);
    }

    #[test]
    fn test_trim_to() {
        assert_eq!(trim_to("Samsung", 4), "Sams");
        assert_eq!(trim_to("abc", 10), "abc");
    }
}
